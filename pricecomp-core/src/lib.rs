//! Mutation engine for telecom price component documents
//!
//! A [`PriceComponent`] owns one price row's configuration document. Change
//! batches are applied with [`PriceComponent::apply`], which routes each
//! edit to the scalar writer or to one of the collection engines (counters,
//! discounts, special prices, threshold ladders). Product-specific rules
//! come from a [`ProgramVariant`] looked up in a [`VariantRegistry`].
//!
//! # Example
//!
//! ```
//! use pricecomp_core::{ChangeBatch, PriceComponent, VariantRegistry};
//! use serde_json::json;
//!
//! let registry = VariantRegistry::with_defaults();
//! let mut component = PriceComponent::parse(
//!     "ItemCharging",
//!     r#"{"Tab1": {"Counters": {"Counters": [], "SpecialDays": []}}}"#,
//!     &registry,
//! )?;
//!
//! let batch = ChangeBatch::from_value(json!({
//!     "Tab1.Counters.Counters": {"Position": -1, "Counter": {"CounterCode": "C1"}}
//! }))?;
//! component.apply(&batch);
//!
//! assert_eq!(component.value()["Tab1"]["Counters"]["Counters"][0]["CounterCode"], "C1");
//! # Ok::<(), pricecomp_core::EditError>(())
//! ```

pub mod changes;
pub mod collections;
pub mod counters;
pub mod errors;
pub mod models;
pub mod path;
pub mod router;
pub mod thresholds;
pub mod variant;
pub mod writer;

pub use changes::{ChangeBatch, ChangeEntry, CounterAdd, DiscountAdd, Payload, Position, SpecialPriceAdd};
pub use errors::EditError;
pub use models::{Node, NodeMap, PriceComponent};
pub use path::{parse_path, ParsedPath};
pub use variant::{ProgramId, ProgramVariant, StandardVariant, VariantRegistry};

pub type EditResult<T> = Result<T, EditError>;
