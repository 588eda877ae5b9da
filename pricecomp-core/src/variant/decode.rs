//! Decode rules shared by all program variants

use serde_json::{json, Value};

use crate::models::{NodeMap, COUNTER_CODE, COUNTER_MONEY, THRESHOLD};

pub const DAY_START: &str = "00:00:00";
pub const DAY_END: &str = "23:59:59";

/// Accept an object carrying a non-empty string under `key_field`
pub fn keyed(payload: &Value, key_field: &str) -> Option<Value> {
    match payload.as_object()?.get(key_field) {
        Some(Value::String(code)) if !code.is_empty() => Some(payload.clone()),
        _ => None,
    }
}

/// Counters additionally get an explicit `CounterMoney` flag
pub fn counter(payload: &Value) -> Option<Value> {
    let mut counter = keyed(payload, COUNTER_CODE)?;
    if let Some(object) = counter.as_object_mut() {
        object
            .entry(COUNTER_MONEY)
            .or_insert(Value::Bool(false));
    }
    Some(counter)
}

pub fn threshold(payload: &Value) -> Option<Value> {
    match payload.as_object()?.get(THRESHOLD) {
        None | Some(Value::Null) => None,
        Some(_) => Some(payload.clone()),
    }
}

pub fn full_day(special_day: &mut NodeMap) {
    special_day.insert("StartTime".to_string(), json!(DAY_START));
    special_day.insert("EndTime".to_string(), json!(DAY_END));
}

/// Price record used by threshold ladders of the extension products
pub fn dependent_price(price_per_unit: Value, unit: Option<Value>) -> Value {
    let mut price = NodeMap::new();
    price.insert("PositionFNF".to_string(), json!(0));
    price.insert("NumberFNF".to_string(), json!(0));
    price.insert("PricePerUnit".to_string(), price_per_unit);
    if let Some(unit) = unit {
        price.insert("Unit".to_string(), unit);
    }
    Value::Object(price)
}

pub fn default_discounts() -> Value {
    json!({
        "CalculationType": 0,
        "Discounts": [],
        "SpecialDays": []
    })
}
