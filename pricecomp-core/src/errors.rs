use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document root must be an object, found {0}")]
    NotAnObject(&'static str),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Unknown program: {0}")]
    UnknownProgram(String),

    #[error("Invalid payload at '{path}': {reason}")]
    InvalidPayload { path: String, reason: String },
}

impl EditError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        EditError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_payload(path: impl Into<String>, reason: impl Into<String>) -> Self {
        EditError::InvalidPayload {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
