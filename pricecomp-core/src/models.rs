use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::EditError;
use crate::variant::{ProgramId, ProgramVariant, VariantRegistry};
use crate::EditResult;

/// A document node. Objects keep key insertion order (`preserve_order`).
pub type Node = Value;
pub type NodeMap = Map<String, Value>;

/// Suffix appended to a collection path to delete an entry by correlation key
pub const DELETE_MARKER: &str = "#DELETE";

pub const BASIC_NON_CALL_SERVICES: &str = "Basic:Non Call Services";
pub const FF_NON_CALL_SERVICES: &str = "FF:Non Call Services";

/// Top-level slots whose default scaffold is checked after every batch
pub const DEFAULT_SCAFFOLD_SLOTS: [&str; 2] = [BASIC_NON_CALL_SERVICES, FF_NON_CALL_SERVICES];

// Field names shared by the collection engines
pub const COUNTER_CODE: &str = "CounterCode";
pub const COUNTER_MONEY: &str = "CounterMoney";
pub const SERVICE_CODE: &str = "ServiceCode";
pub const THRESHOLD: &str = "Threshold";
pub const SPECIAL_DAYS: &str = "SpecialDays";
pub const WEEK_DAY: &str = "WeekDay";

/// Strict boolean check: only JSON `true` counts
pub fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One price row's component configuration together with the program
/// variant that knows how to edit it.
///
/// The component exclusively owns its document for the length of an edit
/// session; nothing in the engine keeps references across calls.
#[derive(Clone)]
pub struct PriceComponent {
    pub(crate) program: String,
    pub(crate) program_id: Option<ProgramId>,
    pub(crate) variant: Arc<dyn ProgramVariant>,
    pub(crate) root: Value,
}

impl PriceComponent {
    /// Parse an encoded document for `program`, looking its variant up in `registry`
    pub fn parse(program: &str, source: &str, registry: &VariantRegistry) -> EditResult<Self> {
        let variant = registry.get(program)?;
        let root: Value = serde_json::from_str(source)?;
        Self::from_value(program, root, variant)
    }

    pub fn from_value(
        program: &str,
        root: Value,
        variant: Arc<dyn ProgramVariant>,
    ) -> EditResult<Self> {
        if !root.is_object() {
            return Err(EditError::NotAnObject(kind_name(&root)));
        }
        Ok(Self {
            program: program.to_string(),
            program_id: ProgramId::from_str(program).ok(),
            variant,
            root,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn program_id(&self) -> Option<ProgramId> {
        self.program_id
    }

    pub fn variant(&self) -> &Arc<dyn ProgramVariant> {
        &self.variant
    }

    pub fn value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub(crate) fn is_program(&self, id: ProgramId) -> bool {
        self.program_id == Some(id)
    }
}

impl fmt::Debug for PriceComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceComponent")
            .field("program", &self.program)
            .field("variant", &self.variant)
            .field("root", &self.root)
            .finish()
    }
}

impl fmt::Display for PriceComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_key_order() {
        let registry = VariantRegistry::with_defaults();
        let component =
            PriceComponent::parse("ItemCharging", r#"{"z": 1, "a": 2, "m": 3}"#, &registry).unwrap();
        let keys: Vec<_> = component.value().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(component.to_string(), r#"{"z":1,"a":2,"m":3}"#);
        assert_eq!(component.program_id(), Some(ProgramId::ItemCharging));
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let registry = VariantRegistry::with_defaults();
        let err = PriceComponent::parse("ItemCharging", "[1, 2]", &registry).unwrap_err();
        assert!(matches!(err, EditError::NotAnObject("array")));
        assert!(PriceComponent::parse("ItemCharging", "{oops", &registry).is_err());
    }

    #[test]
    fn test_parse_unknown_program() {
        let registry = VariantRegistry::with_defaults();
        let err = PriceComponent::parse("NoSuchProgram", "{}", &registry).unwrap_err();
        assert!(matches!(err, EditError::UnknownProgram(p) if p == "NoSuchProgram"));
    }

    #[test]
    fn test_is_true_is_strict() {
        assert!(is_true(Some(&json!(true))));
        assert!(!is_true(Some(&json!("true"))));
        assert!(!is_true(Some(&json!(1))));
        assert!(!is_true(None));
    }
}
