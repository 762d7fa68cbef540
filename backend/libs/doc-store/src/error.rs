use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transaction conflict on {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
