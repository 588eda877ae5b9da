use std::sync::Once;

use pricecomp_core::{PriceComponent, VariantRegistry};
use serde_json::Value;

static TRACING: Once = Once::new();

/// Install a test subscriber honouring RUST_LOG, once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn component(program: &str, document: Value) -> PriceComponent {
    init_tracing();
    let registry = VariantRegistry::with_defaults();
    PriceComponent::from_value(program, document, registry.get(program).unwrap()).unwrap()
}

pub fn codes<'a>(entries: &'a Value, field: &str) -> Vec<&'a str> {
    entries
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e.get(field).and_then(Value::as_str))
        .collect()
}
