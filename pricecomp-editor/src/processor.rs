//! Drives change batches over stored price rows
//!
//! Each row is parsed with its program variant, serialized, edited and
//! serialized again. The outcome records whether anything changed, a JSON
//! patch of the edit and a checksum of the new stored form. A row either
//! gets its parameters replaced in place or, when a start date is given,
//! is closed one second before that date so the caller can open a new
//! version with the returned parameters.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use json_patch::Patch;
use pricecomp_core::models::BASIC_NON_CALL_SERVICES;
use pricecomp_core::{ChangeBatch, PriceComponent, ProgramId, VariantRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::serializer::{ComponentSerializer, JsonSerializer};
use crate::EditorResult;

const CURRENT_LAYOUT_VERSION: &str = "VER:01";
const DYNAMIC_PRICE: &str = "DynamicPrice";

/// One stored price and its component parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub price_id: i64,
    pub component_parameters_id: i64,
    pub program_id: String,
    /// Component document as JSON text
    pub component_parameters: String,
    /// Serializer output for the document
    pub component_unparsed: Option<String>,
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceOutcome {
    pub price_id: i64,
    pub component_parameters_id: i64,
    pub description: String,
    pub date_start: Option<NaiveDateTime>,
    pub changed: bool,
    pub patch: Patch,
    /// sha256 of `serialized`, lowercase hex
    pub checksum: String,
    pub parameters: Value,
    pub serialized: String,
    /// Batch actually applied to this row, as a path to payload object
    pub change: Value,
}

#[derive(Debug)]
pub struct RowFailure {
    pub price_id: i64,
    pub component_parameters_id: i64,
    pub error: EditorError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<PriceOutcome>,
    /// Component parameter ids whose stored form did not change
    pub unchanged: Vec<i64>,
    pub failures: Vec<RowFailure>,
}

impl BatchReport {
    fn record(&mut self, row: &PriceRow, result: EditorResult<PriceOutcome>) {
        match result {
            Ok(outcome) => {
                if !outcome.changed {
                    self.unchanged.push(outcome.component_parameters_id);
                }
                self.outcomes.push(outcome);
            }
            Err(error) => {
                warn!(price_id = row.price_id, %error, "Price update failed");
                self.failures.push(RowFailure {
                    price_id: row.price_id,
                    component_parameters_id: row.component_parameters_id,
                    error,
                });
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    /// Operator-facing notes keyed by component parameters id
    pub fn messages(&self) -> Vec<(String, String)> {
        self.unchanged
            .iter()
            .map(|id| (format!("component parameters = {}", id), "price was not changed".to_string()))
            .chain(self.failures.iter().map(|failure| {
                (
                    format!("component parameters = {}", failure.component_parameters_id),
                    failure.error.to_string(),
                )
            }))
            .collect()
    }
}

pub fn calculate_checksum(serialized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Extension rows predating the current price layout cannot take
/// DynamicPrice edits.
pub fn is_legacy_extension(component: &PriceComponent) -> bool {
    if component.program_id() != Some(ProgramId::PriceTypeExtension) {
        return false;
    }
    let Some(slot) = component.value().get(BASIC_NON_CALL_SERVICES) else {
        return false;
    };
    let old_version = slot.get("Version").is_some_and(|v| v != CURRENT_LAYOUT_VERSION);
    let per_fact = slot.get("PricePerFact").is_some_and(|v| !v.is_null() && v != "");
    old_version || per_fact
}

pub struct BatchProcessor {
    registry: Arc<VariantRegistry>,
    serializer: Arc<dyn ComponentSerializer>,
    config: EditorConfig,
}

impl BatchProcessor {
    pub fn new(registry: VariantRegistry, config: EditorConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            serializer: Arc::new(JsonSerializer),
            config,
        }
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn ComponentSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Apply `batch` to a single row
    pub fn update_price(
        &self,
        row: &mut PriceRow,
        date_start: Option<NaiveDateTime>,
        batch: &ChangeBatch,
    ) -> EditorResult<PriceOutcome> {
        let mut component = PriceComponent::parse(&row.program_id, &row.component_parameters, &self.registry)?;
        let batch = self.row_batch(&component, batch);

        let original = component.value().clone();
        let before = self.serializer.serialize(&component)?;
        component.apply(&batch);
        let after = self.serializer.serialize(&component)?;

        let changed = before != after;
        if !changed {
            info!(
                component_parameters_id = row.component_parameters_id,
                "Price was not changed"
            );
        }
        let patch = json_patch::diff(&original, component.value());
        let checksum = calculate_checksum(&after);

        match date_start {
            None => {
                row.component_parameters = component.to_string();
                row.component_unparsed = Some(after.clone());
            }
            Some(start) => {
                row.end_date = Some(start - Duration::seconds(1));
            }
        }

        Ok(PriceOutcome {
            price_id: row.price_id,
            component_parameters_id: row.component_parameters_id,
            description: self.config.description.clone(),
            date_start,
            changed,
            patch,
            checksum,
            parameters: component.into_value(),
            serialized: after,
            change: batch.to_value(),
        })
    }

    /// The batch as seen by one row; the caller's batch is never modified
    fn row_batch<'a>(&self, component: &PriceComponent, batch: &'a ChangeBatch) -> Cow<'a, ChangeBatch> {
        if !self.config.filter_legacy_dynamic_price || !is_legacy_extension(component) {
            return Cow::Borrowed(batch);
        }
        let mut filtered = batch.clone();
        filtered.retain(|path, _| !path.contains(DYNAMIC_PRICE));
        if filtered.len() != batch.len() {
            debug!(
                dropped = batch.len() - filtered.len(),
                "Dropping DynamicPrice edits for legacy extension row"
            );
        }
        Cow::Owned(filtered)
    }

    /// Apply `batch` to every row in order, reporting `progress(done, total)`
    /// after each one.
    pub fn update_prices<F>(
        &self,
        rows: &mut [PriceRow],
        date_start: Option<NaiveDateTime>,
        batch: &ChangeBatch,
        mut progress: F,
    ) -> BatchReport
    where
        F: FnMut(usize, usize),
    {
        let total = rows.len();
        let mut report = BatchReport::default();
        info!(total, description = %self.config.description, "Updating prices");

        for (done, row) in rows.iter_mut().enumerate() {
            let result = self.update_price(row, date_start, batch);
            report.record(row, result);
            progress(done + 1, total);
        }

        info!(
            changed = report.outcomes.len() - report.unchanged.len(),
            unchanged = report.unchanged.len(),
            failed = report.failures.len(),
            "Price update finished"
        );
        report
    }

    /// Concurrent variant of [`update_prices`](Self::update_prices).
    ///
    /// Rows are edited on the blocking pool, at most `max_concurrency` at a
    /// time. Rows come back in their original order; the report lists
    /// outcomes in that order too.
    pub async fn update_prices_concurrent<F>(
        self: &Arc<Self>,
        rows: Vec<PriceRow>,
        date_start: Option<NaiveDateTime>,
        batch: ChangeBatch,
        mut progress: F,
    ) -> (Vec<PriceRow>, BatchReport)
    where
        F: FnMut(usize, usize),
    {
        let total = rows.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let batch = Arc::new(batch);
        let mut tasks = JoinSet::new();
        info!(total, max_concurrency = self.config.max_concurrency, "Updating prices concurrently");

        for (index, row) in rows.into_iter().enumerate() {
            let processor = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let batch = Arc::clone(&batch);

            tasks.spawn(async move {
                // The semaphore is never closed
                let permit = semaphore.acquire_owned().await.ok();
                let fallback = row.clone();
                let mut row = row;
                let joined = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let result = processor.update_price(&mut row, date_start, &batch);
                    (row, result)
                })
                .await;
                match joined {
                    Ok((row, result)) => (index, row, result),
                    Err(e) => (index, fallback, Err(EditorError::from(e))),
                }
            });
        }

        let mut finished = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => {
                    finished.push(entry);
                    progress(finished.len(), total);
                }
                Err(e) => error!(%e, "Price update task aborted"),
            }
        }
        finished.sort_by_key(|(index, _, _)| *index);

        let mut report = BatchReport::default();
        let mut rows = Vec::with_capacity(finished.len());
        for (_, row, result) in finished {
            report.record(&row, result);
            rows.push(row);
        }
        info!(
            changed = report.outcomes.len() - report.unchanged.len(),
            unchanged = report.unchanged.len(),
            failed = report.failures.len(),
            "Concurrent price update finished"
        );
        (rows, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_is_sha256_hex() {
        assert_eq!(
            calculate_checksum(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_legacy_extension_detection() {
        let registry = VariantRegistry::with_defaults();
        let legacy = |program: &str, slot: Value| {
            let doc = json!({"Basic:Non Call Services": slot});
            is_legacy_extension(&PriceComponent::from_value(program, doc, registry.get(program).unwrap()).unwrap())
        };

        assert!(legacy("PriceTypeExtension", json!({"Version": "VER:00"})));
        assert!(legacy("PriceTypeExtension", json!({"PricePerFact": 1.5})));
        assert!(!legacy("PriceTypeExtension", json!({"Version": "VER:01", "PricePerFact": ""})));
        assert!(!legacy("PriceTypeExtension", json!({"PricePerFact": null})));
        assert!(!legacy("ItemCharging", json!({"Version": "VER:00"})));
    }

    #[test]
    fn test_report_messages() {
        let mut report = BatchReport::default();
        report.unchanged.push(7);
        report.failures.push(RowFailure {
            price_id: 1,
            component_parameters_id: 8,
            error: EditorError::Join("cancelled".into()),
        });
        assert_eq!(
            report.messages(),
            vec![
                ("component parameters = 7".to_string(), "price was not changed".to_string()),
                ("component parameters = 8".to_string(), "Worker task failed: cancelled".to_string()),
            ]
        );
    }
}
