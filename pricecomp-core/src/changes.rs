//! Change batches and their classification into typed entries

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::errors::EditError;
use crate::models::{kind_name, NodeMap, DELETE_MARKER};
use crate::path::{parse_path, ParsedPath};
use crate::EditResult;

/// Structured additions recognised from the path suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AddKind {
    Counter,
    SpecialPrice,
    Discount,
    DynamicThreshold,
    StepThreshold,
    StepActivation,
}

/// Collections that support delete-by-key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeleteKind {
    Counter,
    Discount,
    SpecialPrice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Scalar(Value),
    Add {
        kind: AddKind,
        fields: Value,
    },
    /// `kind` is `None` when the marked path names no known collection
    Delete {
        kind: Option<DeleteKind>,
        correlation: Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEntry {
    pub path: ParsedPath,
    pub payload: Payload,
}

impl ChangeEntry {
    /// Classify one `(path, value)` edit by the structure of its path.
    ///
    /// Precedence: delete marker, counters, special prices, discounts,
    /// dynamic thresholds, step thresholds, step activation service, scalar.
    pub fn classify(raw_path: &str, value: Value) -> EditResult<Self> {
        if let Some(target) = raw_path.strip_suffix(DELETE_MARKER) {
            let path = parse_path(target)?;
            let kind = if path.contains(&["Counters", "Counters"]) {
                Some(DeleteKind::Counter)
            } else if path.contains(&["Discounts", "Discounts"]) {
                Some(DeleteKind::Discount)
            } else if path.contains(&["SpecialPrice", "Price"]) {
                Some(DeleteKind::SpecialPrice)
            } else {
                None
            };
            return Ok(Self {
                path,
                payload: Payload::Delete {
                    kind,
                    correlation: value,
                },
            });
        }

        let path = parse_path(raw_path)?;
        let kind = if path.ends_with(&["Counters", "Counters"]) || path.ends_with_child("Counters") {
            Some(AddKind::Counter)
        } else if path.ends_with(&["SpecialPrice", "Price"]) || path.ends_with_child("SpecialPrice") {
            Some(AddKind::SpecialPrice)
        } else if path.ends_with(&["Discounts", "Discounts"])
            || path.ends_with(&["Discounts", "NormalDiscount", "Discounts"])
            || path.ends_with_child("Discounts")
        {
            Some(AddKind::Discount)
        } else if path.ends_with(&["DynamicPrice", "Thresholds"])
            || path.ends_with(&["DynamicPrice", "Price", "Thresholds"])
        {
            Some(AddKind::DynamicThreshold)
        } else if path.ends_with(&["StepPrice", "Thresholds"])
            || path.ends_with(&["StepPrice", "Price", "Thresholds"])
        {
            Some(AddKind::StepThreshold)
        } else if path.ends_with(&["StepPrice", "ActivationService"])
            || path.ends_with(&["StepPrice", "Price", "ActivationService"])
        {
            Some(AddKind::StepActivation)
        } else {
            None
        };

        let payload = match kind {
            Some(kind) => Payload::Add {
                kind,
                fields: value,
            },
            None => Payload::Scalar(value),
        };
        Ok(Self { path, payload })
    }
}

/// Where a new counter goes inside its money/non-money partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Position {
    /// `-1`: after the last entry
    Append,
    /// `0`: before the first entry
    Head,
    /// `1`: before the entry named by `BeforeCounter`, else appended
    Before,
}

impl TryFrom<i64> for Position {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Position::Append),
            0 => Ok(Position::Head),
            1 => Ok(Position::Before),
            other => Err(format!("unsupported counter position {}", other)),
        }
    }
}

impl From<Position> for i64 {
    fn from(position: Position) -> Self {
        match position {
            Position::Append => -1,
            Position::Head => 0,
            Position::Before => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CounterAdd {
    pub position: Position,
    #[serde(default)]
    pub before_counter: Option<String>,
    pub counter: Value,
    #[serde(default)]
    pub special_days: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecialPriceAdd {
    pub price: Value,
    #[serde(default)]
    pub special_days: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiscountAdd {
    pub discount: Value,
    #[serde(default)]
    pub special_days: bool,
}

/// Decode a structured payload, reporting failures against `path`
pub(crate) fn decode_payload<T: serde::de::DeserializeOwned>(
    path: &ParsedPath,
    fields: Value,
) -> EditResult<T> {
    serde_json::from_value(fields).map_err(|e| EditError::invalid_payload(path.to_string(), e.to_string()))
}

/// Ordered mapping of path to payload, applied front to back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    entries: Vec<(String, Value)>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(source: &str) -> EditResult<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    pub fn from_value(value: Value) -> EditResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(EditError::NotAnObject(kind_name(&other))),
        }
    }

    /// Add an entry, replacing an earlier one for the same path in place
    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        let path = path.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((path, value)),
        }
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.entries.retain(|(path, value)| keep(path, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.iter().cloned().collect())
    }
}

impl From<NodeMap> for ChangeBatch {
    fn from(map: NodeMap) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ChangeBatch {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut batch = Self::new();
        for (path, value) in iter {
            batch.insert(path, value);
        }
        batch
    }
}
