//! Applies change batches to a price component
//!
//! Every entry is classified by its path and dispatched to the matching
//! engine. A failing entry is logged and skipped; it never aborts the batch.

use serde_json::Value;
use tracing::{debug, warn};

use crate::changes::{decode_payload, AddKind, ChangeBatch, ChangeEntry, DeleteKind, Payload};
use crate::errors::EditError;
use crate::models::{PriceComponent, DEFAULT_SCAFFOLD_SLOTS};
use crate::path::{ParsedPath, Segment};
use crate::EditResult;

/// Slot mirrored from the step activation service in both non-call blocks
const ACTIVATION_MIRROR: &str = "Param39";

impl PriceComponent {
    /// Apply every entry of `batch` in order, then make sure the default
    /// scaffolds of the well-known slots exist.
    pub fn apply(&mut self, batch: &ChangeBatch) {
        for (path, value) in batch.iter() {
            self.apply_entry(path, value.clone());
        }
        self.ensure_default_scaffolds();
    }

    /// Apply a single edit. Errors are reported and the entry is skipped.
    pub fn apply_entry(&mut self, path: &str, value: Value) {
        let result = ChangeEntry::classify(path, value).and_then(|entry| self.dispatch(entry));
        if let Err(e) = result {
            warn!(%e, path, "Skipping change entry");
        }
    }

    pub fn dispatch(&mut self, entry: ChangeEntry) -> EditResult<()> {
        let ChangeEntry { path, payload } = entry;
        match payload {
            Payload::Scalar(value) => self.update_simple(&path, value),
            Payload::Delete {
                kind: Some(kind),
                correlation,
            } => {
                let Value::String(code) = correlation else {
                    return Err(EditError::invalid_payload(
                        path.to_string(),
                        "delete marker expects a string key",
                    ));
                };
                match kind {
                    DeleteKind::Counter => self.delete_counter(&path, &code),
                    DeleteKind::Discount => self.delete_discount(&path, &code),
                    DeleteKind::SpecialPrice => self.delete_special_price(&path, &code),
                }
            }
            Payload::Delete { kind: None, .. } => {
                debug!(%path, "Delete marker on unknown collection ignored");
            }
            Payload::Add { kind, fields } => match kind {
                AddKind::Counter => {
                    let add = decode_payload(&path, fields)?;
                    self.add_counter(&path, add);
                }
                AddKind::SpecialPrice => {
                    let add = decode_payload(&path, fields)?;
                    self.add_special_price(&path, add);
                }
                AddKind::Discount => {
                    let add = decode_payload(&path, fields)?;
                    self.add_discount(&path, add);
                }
                AddKind::DynamicThreshold => self.add_dynamic_threshold(&path, &fields),
                AddKind::StepThreshold => self.add_step_threshold(&path, &fields),
                AddKind::StepActivation => {
                    self.update_simple(&path, fields.clone());
                    for slot in DEFAULT_SCAFFOLD_SLOTS {
                        self.update_simple(&mirror_path(slot), fields.clone());
                    }
                }
            },
        }
        Ok(())
    }

    /// Post-pass run after every batch; a no-op once the scaffolds exist
    pub fn ensure_default_scaffolds(&mut self) {
        let variant = &self.variant;
        let Some(root) = self.root.as_object_mut() else {
            return;
        };
        for slot in DEFAULT_SCAFFOLD_SLOTS {
            if !variant.has_default_scaffold(root, slot) {
                debug!(slot, "Adding default scaffold");
                variant.ensure_default_scaffold(root, slot);
            }
        }
    }
}

fn mirror_path(slot: &str) -> ParsedPath {
    ParsedPath {
        segments: vec![
            Segment {
                key: slot.to_string(),
                quoted: true,
            },
            Segment::bare(ACTIVATION_MIRROR),
        ],
    }
}
