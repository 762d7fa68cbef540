use serde::{Deserialize, Serialize};

pub const DEFAULT_PAYMENT_METHOD: &str = "COD";
pub const DEFAULT_ORDER_STATUS: &str = "Pending";

/// One purchased line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub image_url: String,
}

/// A placed order as persisted under `orders/{order_id}`.
///
/// `order_id` and `buyer_id` are assigned at placement time and never
/// change afterwards. Dates are caller-supplied display strings and are not
/// parsed or validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub buyer_id: String,
    pub items: Vec<OrderLineItem>,
    pub total_price: f64,
    pub payment_method: String,
    pub status: String,
    pub order_date: String,
    pub delivery_date: String,
}

/// Input for placing a new order. `order_id` and `buyer_id` are assigned by
/// the engine, never caller-supplied.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<OrderLineItem>,
    pub total_price: f64,
    pub payment_method: String,
    pub status: String,
    pub order_date: String,
    pub delivery_date: String,
}

impl NewOrder {
    /// New order with the default payment method and status.
    pub fn new(
        items: Vec<OrderLineItem>,
        total_price: f64,
        order_date: impl Into<String>,
        delivery_date: impl Into<String>,
    ) -> Self {
        Self {
            items,
            total_price,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            status: DEFAULT_ORDER_STATUS.to_string(),
            order_date: order_date.into(),
            delivery_date: delivery_date.into(),
        }
    }
}

/// Outcome of a successful order placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPlacement {
    /// Order persisted and every stock counter updated.
    Placed { order_id: String },
    /// Order persisted but one or more stock updates did not commit. The
    /// order is deliberately not rolled back; the named products' counters
    /// need reconciliation.
    PlacedStockIncomplete {
        order_id: String,
        failed_products: Vec<String>,
    },
}

impl OrderPlacement {
    pub fn order_id(&self) -> &str {
        match self {
            Self::Placed { order_id } => order_id,
            Self::PlacedStockIncomplete { order_id, .. } => order_id,
        }
    }
}
