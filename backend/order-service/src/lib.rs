pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use error::{OrderError, Result};
pub use models::{
    NewOrder, OrderLineItem, OrderPlacement, OrderRecord, ProductStockRecord, StockCheck,
    StockLevel, StockShortage,
};
pub use services::OrderService;
