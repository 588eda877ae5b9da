use std::sync::Once;

use pricecomp_core::VariantRegistry;
use pricecomp_editor::{BatchProcessor, EditorConfig, PriceRow};
use serde_json::Value;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Processor with the default registry and config
#[allow(dead_code)]
pub fn processor() -> BatchProcessor {
    init_tracing();
    BatchProcessor::new(VariantRegistry::with_defaults(), EditorConfig::default())
}

/// Builds a row for `program` holding `document`; ids derive from `id`.
#[allow(dead_code)]
pub fn make_row(id: i64, program: &str, document: Value) -> PriceRow {
    PriceRow {
        price_id: id,
        component_parameters_id: id * 10,
        program_id: program.to_string(),
        component_parameters: document.to_string(),
        component_unparsed: None,
        end_date: None,
    }
}

/// Parameters of a row as JSON
#[allow(dead_code)]
pub fn parameters(row: &PriceRow) -> Value {
    serde_json::from_str(&row.component_parameters).unwrap()
}
