use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },

    #[error("{kind} '{name}' is not configured")]
    NotConfigured { kind: &'static str, name: String },

    #[error("Monthly sales set for unknown branch '{0}'")]
    UnknownBranch(String),
}
