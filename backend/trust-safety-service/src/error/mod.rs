use doc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustSafetyError {
    #[error("A reason for the report is required")]
    MissingReason,

    #[error("Failed to save report: {0}")]
    PersistenceFailed(String),

    #[error("Report {0} not found")]
    ReportNotFound(String),

    #[error("Invalid report status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TrustSafetyError>;
