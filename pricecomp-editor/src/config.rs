//! Editor settings with environment overrides

use crate::errors::EditorError;
use crate::EditorResult;

/// Operation description recorded with every price update
pub const DEFAULT_DESCRIPTION: &str = "RD-MultiEditor";
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

pub const ENV_DESCRIPTION: &str = "PRICECOMP_DESCRIPTION";
pub const ENV_MAX_CONCURRENCY: &str = "PRICECOMP_MAX_CONCURRENCY";
pub const ENV_FILTER_LEGACY_DYNAMIC_PRICE: &str = "PRICECOMP_FILTER_LEGACY_DYNAMIC_PRICE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub description: String,
    /// Upper bound on rows processed at once by the concurrent driver
    pub max_concurrency: usize,
    /// Drop DynamicPrice edits for extension rows still on the legacy layout
    pub filter_legacy_dynamic_price: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            filter_legacy_dynamic_price: true,
        }
    }
}

impl EditorConfig {
    pub fn from_env() -> EditorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> EditorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(description) = lookup(ENV_DESCRIPTION) {
            config.description = description;
        }

        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            let max = raw.trim().parse::<usize>().map_err(|e| {
                EditorError::Config(format!("{} must be a positive integer: {}", ENV_MAX_CONCURRENCY, e))
            })?;
            if max == 0 {
                return Err(EditorError::Config(format!("{} must be at least 1", ENV_MAX_CONCURRENCY)));
            }
            config.max_concurrency = max;
        }

        if let Some(raw) = lookup(ENV_FILTER_LEGACY_DYNAMIC_PRICE) {
            config.filter_legacy_dynamic_price = match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(EditorError::Config(format!(
                        "{} expects a boolean, got '{}'",
                        ENV_FILTER_LEGACY_DYNAMIC_PRICE, other
                    )))
                }
            };
        }

        Ok(config)
    }
}
