//! Keyed collections with correlated special-day schedules
//!
//! Discounts and special prices are delete-then-append collections keyed by
//! `ServiceCode`. Entries added with special days enabled get seven mirrored
//! entries in the owning element's `SpecialDays` array, one per weekday.

use serde_json::Value;
use tracing::debug;

use crate::changes::{DiscountAdd, SpecialPriceAdd};
use crate::models::{NodeMap, PriceComponent, SERVICE_CODE, SPECIAL_DAYS, WEEK_DAY};
use crate::path::{self, ParsedPath};
use crate::variant::ProgramVariant;

const DISCOUNTS: &str = "Discounts";
const PRICE: &str = "Price";

/// Remove every entry of `element[primary]` and `element.SpecialDays` whose
/// `key_field` equals `code`. Missing arrays are skipped.
pub fn remove_correlated(element: &mut NodeMap, primary: &str, key_field: &str, code: &str) {
    for field in [primary, SPECIAL_DAYS] {
        if let Some(Value::Array(items)) = element.get_mut(field) {
            items.retain(|item| item.get(key_field).and_then(Value::as_str) != Some(code));
        }
    }
}

/// Append one special-day entry per weekday (0 through 6) tagged with `code`
pub fn append_special_days(
    special_days: &mut Vec<Value>,
    key_field: &str,
    code: &str,
    variant: &dyn ProgramVariant,
) {
    for week_day in 0..7 {
        let mut special_day = NodeMap::new();
        special_day.insert(key_field.to_string(), Value::from(code));
        special_day.insert(WEEK_DAY.to_string(), Value::from(week_day));
        variant.fill_special_time(&mut special_day);
        special_days.push(Value::Object(special_day));
    }
}

fn service_code(entry: &Value) -> Option<String> {
    entry.get(SERVICE_CODE).and_then(Value::as_str).map(str::to_string)
}

impl PriceComponent {
    pub fn add_special_price(&mut self, path: &ParsedPath, add: SpecialPriceAdd) {
        let Some(price) = self.variant.decode_special_price(&add.price) else {
            debug!(%path, "Special price rejected by program variant");
            return;
        };
        let Some(code) = service_code(&price) else {
            debug!(%path, "Special price has no service code");
            return;
        };

        let variant = &self.variant;
        let Some(element) = path::get_mut(&mut self.root, &path.parent()) else {
            debug!(%path, "Special price element not found");
            return;
        };
        if !matches!(element.get(PRICE), Some(Value::Array(_))) {
            debug!(%path, "Element has no Price list");
            return;
        }
        append_keyed(element, PRICE, &code, price, add.special_days, variant.as_ref());
    }

    pub fn delete_special_price(&mut self, path: &ParsedPath, code: &str) {
        match path::get_mut(&mut self.root, &path.parent()) {
            Some(element) => remove_correlated(element, PRICE, SERVICE_CODE, code),
            None => debug!(%path, "Special price element not found"),
        }
    }

    /// Add a discount, installing the program's default Discounts scaffold
    /// first when the element has no Discounts collection at all.
    pub fn add_discount(&mut self, path: &ParsedPath, add: DiscountAdd) {
        let element_path = path.parent();
        if path::get(&self.root, &element_path).is_none() {
            debug!(%path, "Discount element not found");
            return;
        }
        let Some(discount) = self.variant.decode_discount(&add.discount) else {
            debug!(%path, "Discount rejected by program variant");
            return;
        };
        let Some(code) = service_code(&discount) else {
            debug!(%path, "Discount has no service code");
            return;
        };

        if !self.ensure_discounts(&element_path) {
            return;
        }

        let variant = &self.variant;
        let Some(element) = path::get_mut(&mut self.root, &element_path) else {
            return;
        };
        if !matches!(element.get(DISCOUNTS), Some(Value::Array(_))) {
            debug!(%path, "Discounts collection is not a list");
            return;
        }
        append_keyed(element, DISCOUNTS, &code, discount, add.special_days, variant.as_ref());
    }

    pub fn delete_discount(&mut self, path: &ParsedPath, code: &str) {
        match path::get_mut(&mut self.root, &path.parent()) {
            Some(element) => remove_correlated(element, DISCOUNTS, SERVICE_CODE, code),
            None => debug!(%path, "Discount element not found"),
        }
    }

    /// Give an element lacking a Discounts collection the default scaffold.
    ///
    /// A `Discounts` wrapper element is replaced by the scaffold; any other
    /// owner only gains the scaffold keys it is missing. Returns false when
    /// no scaffold could be installed.
    fn ensure_discounts(&mut self, element_path: &ParsedPath) -> bool {
        let has_discounts =
            path::get(&self.root, element_path).is_some_and(|element| element.contains_key(DISCOUNTS));
        if has_discounts {
            return true;
        }

        let Some(scaffold) = self.variant.default_discounts(element_path) else {
            debug!(%element_path, "No default Discounts scaffold for program");
            return false;
        };
        debug!(%element_path, "Installing default Discounts scaffold");

        if element_path.name() == Some(DISCOUNTS) {
            return match path::get_mut(&mut self.root, &element_path.parent()) {
                Some(owner) => {
                    owner.insert(DISCOUNTS.to_string(), scaffold);
                    true
                }
                None => false,
            };
        }

        let Value::Object(defaults) = scaffold else {
            debug!(%element_path, "Discounts scaffold is not an object");
            return false;
        };
        match path::get_mut(&mut self.root, element_path) {
            Some(element) => {
                for (key, value) in defaults {
                    element.entry(key).or_insert(value);
                }
                true
            }
            None => false,
        }
    }
}

/// Delete-then-append by `code`, then mirror into SpecialDays when requested
fn append_keyed(
    element: &mut NodeMap,
    primary: &str,
    code: &str,
    entry: Value,
    special_days: bool,
    variant: &dyn ProgramVariant,
) {
    remove_correlated(element, primary, SERVICE_CODE, code);
    if let Some(Value::Array(items)) = element.get_mut(primary) {
        items.push(entry);
    }
    if special_days {
        if let Some(Value::Array(days)) = element.get_mut(SPECIAL_DAYS) {
            append_special_days(days, SERVICE_CODE, code, variant);
        }
    }
}
