//! Batch editing of stored price rows on top of `pricecomp-core`

pub mod config;
pub mod errors;
pub mod processor;
pub mod serializer;

pub use config::EditorConfig;
pub use errors::EditorError;
pub use processor::{BatchProcessor, BatchReport, PriceOutcome, PriceRow, RowFailure};
pub use serializer::{ComponentSerializer, JsonSerializer};

pub type EditorResult<T> = Result<T, EditorError>;
