use pricecomp_core::PriceComponent;

use crate::EditorResult;

/// Renders a component into the stored ("unparsed") form of a price row.
///
/// Two renderings of the same document must be byte-identical; change
/// detection compares the output before and after a batch.
pub trait ComponentSerializer: Send + Sync {
    fn serialize(&self, component: &PriceComponent) -> EditorResult<String>;
}

/// Compact JSON in document key order
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ComponentSerializer for JsonSerializer {
    fn serialize(&self, component: &PriceComponent) -> EditorResult<String> {
        Ok(serde_json::to_string(component.value())?)
    }
}
