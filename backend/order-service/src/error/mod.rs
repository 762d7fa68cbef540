use doc_store::StoreError;
use thiserror::Error;

use crate::models::{StockLevel, StockShortage};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("You must be signed in to place an order")]
    NotAuthenticated,

    #[error("{}", describe_shortages(.0))]
    StockValidationFailed(Vec<StockShortage>),

    #[error("Failed to save order: {0}")]
    PersistenceFailed(String),

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Human-readable summary of every offending line item, suitable for direct
/// display at checkout.
fn describe_shortages(shortages: &[StockShortage]) -> String {
    let parts: Vec<String> = shortages
        .iter()
        .map(|shortage| match shortage.level {
            StockLevel::OutOfStock => format!("{} is out of stock", shortage.product_name),
            StockLevel::Insufficient { available } => format!(
                "{} has only {} of {} requested",
                shortage.product_name, available, shortage.requested
            ),
            StockLevel::Sufficient => shortage.product_name.clone(),
        })
        .collect();
    format!("Insufficient stock: {}", parts.join("; "))
}

pub type Result<T> = std::result::Result<T, OrderError>;
