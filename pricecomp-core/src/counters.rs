//! Counter merge engine
//!
//! An element's `Counters` array is kept in two partitions, monetary and
//! non-monetary counters, ordered relative to each other by the element's
//! `Priorities` hint. New counters are placed inside their own partition.

use serde_json::Value;
use tracing::{debug, warn};

use crate::changes::{CounterAdd, Position};
use crate::collections::{append_special_days, remove_correlated};
use crate::models::{is_true, PriceComponent, COUNTER_CODE, COUNTER_MONEY, SPECIAL_DAYS};
use crate::path::{self, ParsedPath};

const COUNTERS: &str = "Counters";
const PRIORITIES: &str = "Priorities";

fn is_money(counter: &Value) -> bool {
    is_true(counter.get(COUNTER_MONEY))
}

fn counter_code(counter: &Value) -> Option<&str> {
    counter.get(COUNTER_CODE).and_then(Value::as_str)
}

/// Partition order when rebuilding the Counters array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionOrder {
    NonMoneyFirst,
    MoneyFirst,
}

impl PartitionOrder {
    /// Read the order from the first `Priorities` entry; an absent hint means
    /// non-money first. Unknown priorities yield `None`.
    pub fn from_priority(priority: Option<&Value>) -> Option<Self> {
        match priority {
            None => Some(PartitionOrder::NonMoneyFirst),
            // Integral floats such as 1.0 count as their integer value
            Some(value) => match value.as_f64() {
                Some(p) if p == 0.0 => Some(PartitionOrder::NonMoneyFirst),
                Some(p) if p == 1.0 => Some(PartitionOrder::MoneyFirst),
                _ => None,
            },
        }
    }
}

/// Insert `counter` into `counters` at `position` within its partition and
/// rebuild the array in partition order.
///
/// Returns `false` and leaves `counters` untouched when the priority hint is
/// not understood.
pub fn merge_counter(
    counters: &mut Vec<Value>,
    priority: Option<&Value>,
    position: Position,
    before_counter: Option<&str>,
    counter: Value,
) -> bool {
    let Some(order) = PartitionOrder::from_priority(priority) else {
        warn!(?priority, "Unsupported counter priority, counters left unchanged");
        return false;
    };

    let (mut money, mut non_money): (Vec<Value>, Vec<Value>) =
        counters.drain(..).partition(is_money);

    let partition = if is_money(&counter) {
        &mut money
    } else {
        &mut non_money
    };
    match position {
        Position::Append => partition.push(counter),
        Position::Head => partition.insert(0, counter),
        Position::Before => {
            let index = before_counter
                .filter(|code| !code.is_empty())
                .and_then(|code| partition.iter().position(|c| counter_code(c) == Some(code)));
            match index {
                Some(index) => partition.insert(index, counter),
                None => partition.push(counter),
            }
        }
    }

    match order {
        PartitionOrder::NonMoneyFirst => {
            counters.extend(non_money);
            counters.extend(money);
        }
        PartitionOrder::MoneyFirst => {
            counters.extend(money);
            counters.extend(non_money);
        }
    }
    true
}

impl PriceComponent {
    /// Add a counter to the element owning the Counters array at `path`,
    /// replacing any counter with the same code.
    pub fn add_counter(&mut self, path: &ParsedPath, add: CounterAdd) {
        let Some(counter) = self.variant.decode_counter(&add.counter) else {
            debug!(%path, "Counter rejected by program variant");
            return;
        };
        let Some(code) = counter_code(&counter).map(str::to_string) else {
            debug!(%path, "Counter has no code");
            return;
        };

        let variant = &self.variant;
        let Some(element) = path::get_mut(&mut self.root, &path.parent()) else {
            debug!(%path, "Counter element not found");
            return;
        };
        if !matches!(element.get(COUNTERS), Some(Value::Array(_))) {
            debug!(%path, "Element has no Counters array");
            return;
        }

        let priority = element
            .get(PRIORITIES)
            .and_then(Value::as_array)
            .and_then(|p| p.first())
            .cloned();
        if PartitionOrder::from_priority(priority.as_ref()).is_none() {
            warn!(%path, ?priority, "Unsupported counter priority, counters left unchanged");
            return;
        }

        remove_correlated(element, COUNTERS, COUNTER_CODE, &code);
        if let Some(Value::Array(counters)) = element.get_mut(COUNTERS) {
            merge_counter(
                counters,
                priority.as_ref(),
                add.position,
                add.before_counter.as_deref(),
                counter,
            );
        }

        if add.special_days {
            if let Some(Value::Array(days)) = element.get_mut(SPECIAL_DAYS) {
                append_special_days(days, COUNTER_CODE, &code, variant.as_ref());
            }
        }
    }

    /// Remove the counter `code` and its special days from the element at `path`
    pub fn delete_counter(&mut self, path: &ParsedPath, code: &str) {
        match path::get_mut(&mut self.root, &path.parent()) {
            Some(element) => remove_correlated(element, COUNTERS, COUNTER_CODE, code),
            None => debug!(%path, "Counter element not found"),
        }
    }
}
