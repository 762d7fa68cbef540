use serde::{Deserialize, Serialize};

/// The stock slice of a product document.
///
/// Product documents carry more fields (price, seller, description); this
/// engine only reads the name and mutates the two counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub sold: u32,
}

impl ProductStockRecord {
    /// Classify availability against a requested quantity.
    pub fn level_for(&self, requested: u32) -> StockLevel {
        if self.stock == 0 {
            StockLevel::OutOfStock
        } else if self.stock < requested {
            StockLevel::Insufficient {
                available: self.stock,
            }
        } else {
            StockLevel::Sufficient
        }
    }
}

/// Availability classification for one requested line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    OutOfStock,
    Insufficient { available: u32 },
    Sufficient,
}

/// A line item that failed the stock validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortage {
    pub product_name: String,
    pub requested: u32,
    pub level: StockLevel,
}

/// Result of the single-product pre-checkout availability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCheck {
    pub product_name: String,
    pub sufficient: bool,
    pub available: u32,
}
