//! Built-in product variants

use serde_json::{json, Value};

use super::{decode, ProgramVariant};
use crate::models::{NodeMap, THRESHOLD};
use crate::path::ParsedPath;

/// Extension price types: threshold ladders hold dependent prices and the
/// two non-call service slots carry a small default block.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriceTypeExtensionVariant;

const SLOT_DEFAULTS: [(&str, fn() -> Value); 2] = [
    ("UseQuantity", || Value::Bool(false)),
    ("Param39", || Value::String(String::new())),
];

impl PriceTypeExtensionVariant {
    fn decode_ladder_entry(payload: &Value) -> Option<Value> {
        let object = payload.as_object()?;
        let Some(price_per_unit) = object.get("PricePerUnit") else {
            return decode::threshold(payload);
        };
        let threshold = object.get(THRESHOLD).filter(|t| !t.is_null())?;
        Some(json!({
            "Threshold": threshold,
            "Price": decode::dependent_price(price_per_unit.clone(), object.get("Unit").cloned()),
        }))
    }
}

impl ProgramVariant for PriceTypeExtensionVariant {
    fn decode_dynamic_threshold(&self, _path: &ParsedPath, payload: &Value) -> Option<Value> {
        Self::decode_ladder_entry(payload)
    }

    fn decode_step_threshold(&self, _path: &ParsedPath, payload: &Value) -> Option<Value> {
        Self::decode_ladder_entry(payload)
    }

    fn has_default_scaffold(&self, root: &NodeMap, slot: &str) -> bool {
        root.get(slot)
            .and_then(Value::as_object)
            .is_some_and(|block| SLOT_DEFAULTS.iter().all(|(key, _)| block.contains_key(*key)))
    }

    fn ensure_default_scaffold(&self, root: &mut NodeMap, slot: &str) {
        let block = root
            .entry(slot)
            .or_insert_with(|| Value::Object(NodeMap::new()));
        if !block.is_object() {
            *block = Value::Object(NodeMap::new());
        }
        if let Value::Object(block) = block {
            for (key, default) in SLOT_DEFAULTS {
                block.entry(key).or_insert_with(default);
            }
        }
    }
}

/// Item charging: a top-level FirstEvent block wraps the first-event record
/// together with its setup-fee switches.
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemChargingVariant;

impl ProgramVariant for ItemChargingVariant {
    fn is_incomplete(&self, path: &ParsedPath, node: &NodeMap) -> bool {
        // Older documents stored the bare record at the top level
        path.len() == 1 && path.name() == Some("FirstEvent") && !node.contains_key("UseFirstEvent")
    }
}

/// Advanced priority rules: every threshold ladder starts at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityRulesVariant;

fn is_zero_threshold(entry: &Value) -> bool {
    match entry.get(THRESHOLD) {
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s == decode::DAY_START,
        Some(Value::Object(o)) => o.get("Value").and_then(Value::as_f64) == Some(0.0),
        _ => false,
    }
}

impl ProgramVariant for PriorityRulesVariant {
    fn is_default_threshold_exists(&self, thresholds: &[Value]) -> bool {
        thresholds.iter().any(is_zero_threshold)
    }

    fn create_default_threshold(&self) -> Value {
        json!({"Threshold": 0, "Price": 0})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_threshold_builds_dependent_price() {
        let variant = PriceTypeExtensionVariant;
        let path = ParsedPath::root();
        let decoded = variant
            .decode_dynamic_threshold(&path, &json!({"Threshold": 100, "PricePerUnit": 0.5, "Unit": 60}))
            .unwrap();
        assert_eq!(
            decoded,
            json!({
                "Threshold": 100,
                "Price": {"PositionFNF": 0, "NumberFNF": 0, "PricePerUnit": 0.5, "Unit": 60}
            })
        );

        // Already shaped entries pass through
        let raw = json!({"Threshold": 5, "Price": {"PricePerUnit": 1}});
        assert_eq!(variant.decode_step_threshold(&path, &raw), Some(raw.clone()));
        assert!(variant
            .decode_step_threshold(&path, &json!({"PricePerUnit": 1}))
            .is_none());
    }

    #[test]
    fn test_extension_scaffold_is_idempotent() {
        let variant = PriceTypeExtensionVariant;
        let mut root = NodeMap::new();
        root.insert("FF:Non Call Services".into(), json!({"Param39": "X"}));

        assert!(!variant.has_default_scaffold(&root, "FF:Non Call Services"));
        variant.ensure_default_scaffold(&mut root, "FF:Non Call Services");
        variant.ensure_default_scaffold(&mut root, "FF:Non Call Services");
        assert!(variant.has_default_scaffold(&root, "FF:Non Call Services"));
        assert_eq!(
            root["FF:Non Call Services"],
            json!({"Param39": "X", "UseQuantity": false})
        );

        variant.ensure_default_scaffold(&mut root, "Basic:Non Call Services");
        assert_eq!(
            root["Basic:Non Call Services"],
            json!({"UseQuantity": false, "Param39": ""})
        );
    }

    #[test]
    fn test_item_charging_incomplete_first_event() {
        let variant = ItemChargingVariant;
        let top = "FirstEvent".parse::<ParsedPath>().unwrap();
        let nested = "FirstEvent.FirstEvent".parse::<ParsedPath>().unwrap();
        let bare = json!({"CounterCode": ""});
        let wrapped = json!({"UseFirstEvent": false});

        assert!(variant.is_incomplete(&top, bare.as_object().unwrap()));
        assert!(!variant.is_incomplete(&top, wrapped.as_object().unwrap()));
        assert!(!variant.is_incomplete(&nested, bare.as_object().unwrap()));
    }

    #[test]
    fn test_priority_rules_default_threshold() {
        let variant = PriorityRulesVariant;
        assert!(!variant.is_default_threshold_exists(&[]));
        assert!(!variant.is_default_threshold_exists(&[json!({"Threshold": 10})]));
        assert!(variant.is_default_threshold_exists(&[json!({"Threshold": 0})]));
        assert!(variant.is_default_threshold_exists(&[json!({"Threshold": "00:00:00"})]));
        assert!(variant.is_default_threshold_exists(&[json!({"Threshold": {"Value": 0}})]));
        // Nested ladders are unwrapped by the caller, not here
        assert!(!variant.is_default_threshold_exists(&[json!([{"Threshold": 0}])]));
        assert_eq!(variant.create_default_threshold()["Threshold"], json!(0));
    }
}
