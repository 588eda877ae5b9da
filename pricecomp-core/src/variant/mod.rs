//! Per-product decoding, validation and scaffolding rules
//!
//! Every product (rating program) stores its price components in a slightly
//! different shape. A [`ProgramVariant`] answers the product-specific
//! questions the engine asks while applying a change batch. Variants are
//! stateless and shared between documents through an `Arc`.

pub mod decode;
pub mod programs;
pub mod registry;

use std::fmt;

use serde_json::Value;

use crate::models::NodeMap;
use crate::path::ParsedPath;

pub use programs::{ItemChargingVariant, PriceTypeExtensionVariant, PriorityRulesVariant};
pub use registry::{ProgramId, VariantRegistry};

/// Product-specific hooks consulted by the mutation engine.
///
/// The provided methods implement the shared rules; a product overrides
/// only what differs. Decode hooks veto a structured add by returning
/// `None`, in which case the whole entry is skipped.
pub trait ProgramVariant: fmt::Debug + Send + Sync {
    fn decode_counter(&self, counter: &Value) -> Option<Value> {
        decode::counter(counter)
    }

    fn decode_special_price(&self, price: &Value) -> Option<Value> {
        decode::keyed(price, crate::models::SERVICE_CODE)
    }

    fn decode_discount(&self, discount: &Value) -> Option<Value> {
        decode::keyed(discount, crate::models::SERVICE_CODE)
    }

    fn decode_dynamic_threshold(&self, _path: &ParsedPath, payload: &Value) -> Option<Value> {
        decode::threshold(payload)
    }

    fn decode_step_threshold(&self, _path: &ParsedPath, payload: &Value) -> Option<Value> {
        decode::threshold(payload)
    }

    /// Set the time window of a freshly generated special-day entry
    fn fill_special_time(&self, special_day: &mut NodeMap) {
        decode::full_day(special_day);
    }

    /// An existing object that must be re-materialised before a write
    fn is_incomplete(&self, _path: &ParsedPath, _node: &NodeMap) -> bool {
        false
    }

    fn is_default_threshold_exists(&self, _thresholds: &[Value]) -> bool {
        true
    }

    fn create_default_threshold(&self) -> Value {
        Value::Object(NodeMap::new())
    }

    /// Whether the well-known top-level `slot` already carries its defaults
    fn has_default_scaffold(&self, _root: &NodeMap, _slot: &str) -> bool {
        true
    }

    /// Materialise the defaults of `slot`. Must be idempotent.
    fn ensure_default_scaffold(&self, _root: &mut NodeMap, _slot: &str) {}

    /// Scaffold installed when an element has no Discounts collection yet
    fn default_discounts(&self, _element: &ParsedPath) -> Option<Value> {
        Some(decode::default_discounts())
    }
}

/// Shared rules only, for products without special handling
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardVariant;

impl ProgramVariant for StandardVariant {}
