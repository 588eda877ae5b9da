use std::collections::HashMap;
use std::sync::Arc;

use strum::{Display, EnumString};

use super::{ItemChargingVariant, PriceTypeExtensionVariant, PriorityRulesVariant, ProgramVariant};
use crate::errors::EditError;
use crate::EditResult;

/// Products with built-in handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ProgramId {
    PriceTypeExtension,
    ItemCharging,
    #[strum(serialize = "FFWithPriorityRulesAdvanced")]
    FfWithPriorityRulesAdvanced,
}

/// Maps a product identifier to its shared variant
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    variants: HashMap<String, Arc<dyn ProgramVariant>>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in product
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            ProgramId::PriceTypeExtension.to_string(),
            Arc::new(PriceTypeExtensionVariant),
        );
        registry.register(ProgramId::ItemCharging.to_string(), Arc::new(ItemChargingVariant));
        registry.register(
            ProgramId::FfWithPriorityRulesAdvanced.to_string(),
            Arc::new(PriorityRulesVariant),
        );
        registry
    }

    /// Add or replace the variant for `program`
    pub fn register(&mut self, program: impl Into<String>, variant: Arc<dyn ProgramVariant>) {
        self.variants.insert(program.into(), variant);
    }

    pub fn get(&self, program: &str) -> EditResult<Arc<dyn ProgramVariant>> {
        self.variants
            .get(program)
            .cloned()
            .ok_or_else(|| EditError::UnknownProgram(program.to_string()))
    }

    pub fn contains(&self, program: &str) -> bool {
        self.variants.contains_key(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::StandardVariant;
    use std::str::FromStr;

    #[test]
    fn test_program_id_names() {
        assert_eq!(
            ProgramId::FfWithPriorityRulesAdvanced.to_string(),
            "FFWithPriorityRulesAdvanced"
        );
        assert_eq!(
            ProgramId::from_str("PriceTypeExtension").unwrap(),
            ProgramId::PriceTypeExtension
        );
        assert!(ProgramId::from_str("Unknown").is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = VariantRegistry::with_defaults();
        assert!(registry.contains("ItemCharging"));
        assert!(registry.get("ItemCharging").is_ok());
        assert!(matches!(
            registry.get("Custom"),
            Err(EditError::UnknownProgram(name)) if name == "Custom"
        ));

        registry.register("Custom", Arc::new(StandardVariant));
        assert!(registry.get("Custom").is_ok());
    }
}
