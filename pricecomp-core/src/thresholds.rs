//! Threshold ordering engine
//!
//! Threshold ladders are kept sorted ascending by each entry's `Threshold`
//! key. A key is a number, a `HH:MM:SS` time of day, or an object carrying
//! a numeric `Value`.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::debug;

use crate::models::{PriceComponent, THRESHOLD};
use crate::path::{self, ParsedPath};

/// Sort key of unparseable time strings; they always go last
pub const MALFORMED_TIME: i64 = i64::MAX;

/// Seconds since midnight of a `HH:MM:SS` string
pub fn time_to_seconds(value: &str) -> i64 {
    let mut parts = value.split(':').map(|part| part.trim().parse::<i64>());
    let seconds = match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(h)), Some(Ok(m)), Some(Ok(s))) => h
            .checked_mul(3600)
            .zip(m.checked_mul(60))
            .and_then(|(h, m)| h.checked_add(m))
            .and_then(|hm| hm.checked_add(s)),
        _ => None,
    };
    seconds.unwrap_or(MALFORMED_TIME)
}

/// Compare two threshold keys by the shape of `new`.
///
/// Keys of a different shape than `new` are incomparable.
pub fn compare_keys(new: &Value, existing: &Value) -> Option<Ordering> {
    match new {
        Value::Number(n) => n.as_f64()?.partial_cmp(&existing.as_f64()?),
        Value::String(s) => Some(time_to_seconds(s).cmp(&time_to_seconds(existing.as_str()?))),
        Value::Object(o) => {
            let new_value = o.get("Value")?.as_f64()?;
            new_value.partial_cmp(&existing.get("Value")?.as_f64()?)
        }
        _ => None,
    }
}

/// Insert `entry` before the first entry whose key is strictly greater
pub fn add_threshold(thresholds: &mut Vec<Value>, entry: Value) {
    let position = entry.get(THRESHOLD).and_then(|key| {
        thresholds.iter().position(|existing| {
            existing
                .get(THRESHOLD)
                .and_then(|existing_key| compare_keys(key, existing_key))
                == Some(Ordering::Less)
        })
    });
    match position {
        Some(index) => thresholds.insert(index, entry),
        None => thresholds.push(entry),
    }
}

/// Remove every entry whose key equals `key`
pub fn remove_threshold(thresholds: &mut Vec<Value>, key: &Value) {
    thresholds.retain(|entry| entry.get(THRESHOLD) != Some(key));
}

impl PriceComponent {
    pub fn add_dynamic_threshold(&mut self, path: &ParsedPath, payload: &Value) {
        match self.variant.decode_dynamic_threshold(path, payload) {
            Some(entry) => self.insert_threshold(path, entry),
            None => debug!(%path, "Dynamic threshold rejected by program variant"),
        }
    }

    pub fn add_step_threshold(&mut self, path: &ParsedPath, payload: &Value) {
        match self.variant.decode_step_threshold(path, payload) {
            Some(entry) => self.insert_threshold(path, entry),
            None => debug!(%path, "Step threshold rejected by program variant"),
        }
    }

    fn insert_threshold(&mut self, path: &ParsedPath, entry: Value) {
        if path::get_array(&self.root, path).is_none()
            && (!self.initialize(path) || path::get_array(&self.root, path).is_none())
        {
            debug!(%path, "Threshold list not found and cannot be materialised");
            return;
        }

        let variant = &self.variant;
        let Some(thresholds) = path::get_array_mut(&mut self.root, path) else {
            return;
        };
        // Extended prices keep their ladder one array deeper
        let ladder = if path.mentions("ExtendedPrice") && matches!(thresholds.first(), Some(Value::Array(_))) {
            match thresholds.first_mut() {
                Some(Value::Array(inner)) => inner,
                _ => return,
            }
        } else {
            thresholds
        };

        if !variant.is_default_threshold_exists(ladder) {
            add_threshold(ladder, variant.create_default_threshold());
        }
        if let Some(key) = entry.get(THRESHOLD).cloned() {
            remove_threshold(ladder, &key);
        }
        add_threshold(ladder, entry);
    }
}
