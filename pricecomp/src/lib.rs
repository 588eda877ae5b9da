//! Pricecomp - batch editing of telecom price component configurations
//!
//! This crate provides a unified API over the mutation engine and the batch
//! editor.
//!
//! # Example
//!
//! ```
//! use pricecomp::{BatchProcessor, ChangeBatch, EditorConfig, PriceRow, VariantRegistry};
//! use serde_json::json;
//!
//! let processor = BatchProcessor::new(VariantRegistry::with_defaults(), EditorConfig::default());
//! let mut row = PriceRow {
//!     price_id: 1,
//!     component_parameters_id: 10,
//!     program_id: "ItemCharging".into(),
//!     component_parameters: r#"{"Tab1": {"Fee": 1}}"#.into(),
//!     component_unparsed: None,
//!     end_date: None,
//! };
//! let batch = ChangeBatch::from_value(json!({"Tab1.Fee": 2}))?;
//!
//! let outcome = processor.update_price(&mut row, None, &batch)?;
//! assert!(outcome.changed);
//! assert_eq!(row.component_parameters, r#"{"Tab1":{"Fee":2}}"#);
//! # Ok::<(), pricecomp::EditorError>(())
//! ```

// Re-export engine types
pub use pricecomp_core::{
    parse_path, ChangeBatch, ChangeEntry, EditError, EditResult, ParsedPath, PriceComponent, ProgramId,
    ProgramVariant, StandardVariant, VariantRegistry,
};

// Re-export batch editor types
pub use pricecomp_editor::{
    BatchProcessor, BatchReport, ComponentSerializer, EditorConfig, EditorError, EditorResult, JsonSerializer,
    PriceOutcome, PriceRow,
};
