use pricecomp_core::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Worker task failed: {0}")]
    Join(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<tokio::task::JoinError> for EditorError {
    fn from(err: tokio::task::JoinError) -> Self {
        EditorError::Join(err.to_string())
    }
}
