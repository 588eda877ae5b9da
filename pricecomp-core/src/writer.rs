//! Scalar writes and default sub-structure materialisation

use serde_json::{json, Value};
use tracing::debug;

use crate::models::{is_true, PriceComponent, BASIC_NON_CALL_SERVICES};
use crate::path::{self, ParsedPath, Segment};
use crate::variant::ProgramId;

const FIRST_EVENT: &str = "FirstEvent";
const COMPANION_SLOT: &str = "Tab14";

fn new_first_event() -> Value {
    json!({
        "CounterCode": "",
        "CounterType": 0,
        "ActivationService": "",
        "SetupFee": 0.0
    })
}

fn first_event_block() -> Value {
    json!({
        "SetupFeeOnStepCounter": false,
        "SetupFeeOnZeroPrice": false,
        "UseFirstEvent": false,
        "FirstEvent": new_first_event()
    })
}

impl PriceComponent {
    /// Set the leaf at `path` to `value`.
    ///
    /// A missing or incomplete parent is materialised when a default exists
    /// for it; otherwise the write is dropped.
    pub fn update_simple(&mut self, path: &ParsedPath, value: Value) {
        let path = self.rewrite_path(path);
        let Some(name) = path.name() else {
            debug!("Ignoring write to the document root");
            return;
        };
        if !self.set_in_parent(&path.parent(), name, value) {
            debug!(%path, "No target for scalar write, dropped");
        }
    }

    /// Whether the extension price is quantity based
    pub fn use_quantity(&self) -> bool {
        let flag = ParsedPath {
            segments: vec![
                Segment {
                    key: BASIC_NON_CALL_SERVICES.to_string(),
                    quoted: true,
                },
                Segment::bare("UseQuantity"),
            ],
        };
        is_true(path::resolve(&self.root, &flag))
    }

    /// Redirect extension price fields to their canonical nested location
    fn rewrite_path(&self, path: &ParsedPath) -> ParsedPath {
        if !self.is_program(ProgramId::PriceTypeExtension) {
            return path.clone();
        }
        match path.name() {
            Some("PricePerUnit") if self.use_quantity() => {
                path.with_name_replaced(&["Price", "PricePerUnit", "Price"])
            }
            Some("PricePerUnit") => path.with_name_replaced(&["Price", "PricePerFact"]),
            Some("Unit") if path.parent_is_quoted() && self.use_quantity() => {
                path.with_name_replaced(&["Price", "PricePerUnit", "Unit"])
            }
            _ => path.clone(),
        }
    }

    pub(crate) fn set_in_parent(&mut self, parent: &ParsedPath, name: &str, value: Value) -> bool {
        let ready = path::get(&self.root, parent)
            .is_some_and(|node| !self.variant.is_incomplete(parent, node));
        if !ready && !self.initialize(parent) {
            return false;
        }
        match path::get_mut(&mut self.root, parent) {
            Some(node) => {
                node.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Materialise the well-known default structure addressed by `path`.
    ///
    /// Returns false when no rule exists for the path's name.
    pub(crate) fn initialize(&mut self, path: &ParsedPath) -> bool {
        let Some(name) = path.name() else {
            return false;
        };
        let parent = path.parent();
        let item_charging = self.is_program(ProgramId::ItemCharging);

        let created = match name {
            FIRST_EVENT if item_charging && parent.is_root() => first_event_block(),
            FIRST_EVENT => new_first_event(),
            _ => return false,
        };
        debug!(%path, "Materialising default structure");
        if !self.set_in_parent(&parent, name, created) {
            return false;
        }

        if item_charging && path.keys_eq(&[FIRST_EVENT, FIRST_EVENT]) {
            if let Some(root) = self.root.as_object_mut() {
                root.entry(COMPANION_SLOT)
                    .or_insert_with(|| Value::String(String::new()));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::VariantRegistry;

    fn component(program: &str, doc: Value) -> PriceComponent {
        let registry = VariantRegistry::with_defaults();
        PriceComponent::from_value(program, doc, registry.get(program).unwrap()).unwrap()
    }

    fn p(path: &str) -> ParsedPath {
        path.parse().unwrap()
    }

    #[test]
    fn test_overwrites_existing_leaf() {
        let mut c = component("FFWithPriorityRulesAdvanced", json!({"Tab": {"Fee": 1}}));
        c.update_simple(&p("Tab.Fee"), json!(2));
        c.update_simple(&p("Tab.New"), json!("x"));
        assert_eq!(c.value(), &json!({"Tab": {"Fee": 2, "New": "x"}}));
    }

    #[test]
    fn test_unmaterialisable_write_is_dropped() {
        let doc = json!({"Tab": {"Fee": 1}});
        let mut c = component("FFWithPriorityRulesAdvanced", doc.clone());
        c.update_simple(&p("Missing.Branch.Fee"), json!(2));
        c.update_simple(&p("Tab.Fee.Deeper"), json!(2));
        assert_eq!(c.value(), &doc);
    }

    #[test]
    fn test_first_event_materialised() {
        let mut c = component("FFWithPriorityRulesAdvanced", json!({"Tab": {}}));
        c.update_simple(&p("Tab.FirstEvent.SetupFee"), json!(5.5));
        assert_eq!(
            c.value()["Tab"]["FirstEvent"],
            json!({"CounterCode": "", "CounterType": 0, "ActivationService": "", "SetupFee": 5.5})
        );
    }

    #[test]
    fn test_item_charging_first_event_block_and_companion() {
        let mut c = component("ItemCharging", json!({"Tab1": {}}));
        c.update_simple(&p("FirstEvent.FirstEvent.CounterCode"), json!("C7"));

        let block = &c.value()["FirstEvent"];
        assert_eq!(block["UseFirstEvent"], json!(false));
        assert_eq!(block["SetupFeeOnStepCounter"], json!(false));
        assert_eq!(block["FirstEvent"]["CounterCode"], json!("C7"));
        assert_eq!(c.value()["Tab14"], json!(""));
    }

    #[test]
    fn test_item_charging_keeps_existing_companion() {
        let mut c = component("ItemCharging", json!({"Tab14": "kept"}));
        c.update_simple(&p("FirstEvent.FirstEvent.SetupFee"), json!(1.0));
        assert_eq!(c.value()["Tab14"], json!("kept"));
    }

    #[test]
    fn test_item_charging_incomplete_block_rebuilt() {
        let mut c = component("ItemCharging", json!({"FirstEvent": {"CounterCode": "legacy"}}));
        c.update_simple(&p("FirstEvent.UseFirstEvent"), json!(true));
        let block = &c.value()["FirstEvent"];
        assert_eq!(block["UseFirstEvent"], json!(true));
        assert!(block.get("CounterCode").is_none());
        assert!(block["FirstEvent"].is_object());
    }

    #[test]
    fn test_extension_price_per_unit_rewrite() {
        let doc = json!({
            "Basic:Non Call Services": {"UseQuantity": true, "Price": {"PricePerUnit": {}}}
        });
        let mut c = component("PriceTypeExtension", doc);
        c.update_simple(&p("['Basic:Non Call Services'].PricePerUnit"), json!(3.5));
        c.update_simple(&p("['Basic:Non Call Services'].Unit"), json!(60));
        assert_eq!(
            c.value()["Basic:Non Call Services"]["Price"]["PricePerUnit"],
            json!({"Price": 3.5, "Unit": 60})
        );
    }

    #[test]
    fn test_extension_price_per_fact_rewrite() {
        let doc = json!({
            "Basic:Non Call Services": {"UseQuantity": false, "Price": {}, "Unit": 1}
        });
        let mut c = component("PriceTypeExtension", doc);
        c.update_simple(&p("['Basic:Non Call Services'].PricePerUnit"), json!(9));
        c.update_simple(&p("['Basic:Non Call Services'].Unit"), json!(2));
        let slot = &c.value()["Basic:Non Call Services"];
        assert_eq!(slot["Price"]["PricePerFact"], json!(9));
        assert_eq!(slot["Unit"], json!(2));
    }

    #[test]
    fn test_rewrite_only_for_extension_program() {
        let doc = json!({"Basic:Non Call Services": {"UseQuantity": true}});
        let mut c = component("ItemCharging", doc);
        c.update_simple(&p("['Basic:Non Call Services'].PricePerUnit"), json!(1));
        assert_eq!(c.value()["Basic:Non Call Services"]["PricePerUnit"], json!(1));
    }
}
