use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Document store error: {0}")]
    Store(String),
    #[error("Notifier error: {0}")]
    Notifier(String),
    #[error("Flag store error: {0}")]
    FlagStore(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
