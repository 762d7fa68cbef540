//! Store operations for order records

use doc_store::{DocumentStore, StoreError};
use std::sync::Arc;

use crate::error::{OrderError, Result};
use crate::models::{NewOrder, OrderRecord};

const ORDERS_PATH: &str = "orders";

/// Store operations for order records.
pub struct OrdersDb {
    store: Arc<dyn DocumentStore>,
}

impl OrdersDb {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn order_path(order_id: &str) -> String {
        format!("{}/{}", ORDERS_PATH, order_id)
    }

    /// Persist a new order under a store-generated id, stamping the buyer.
    ///
    /// Any store failure here surfaces as `PersistenceFailed`; the caller
    /// must not have touched stock yet.
    pub async fn create_order(&self, input: NewOrder, buyer_id: &str) -> Result<OrderRecord> {
        let order_id = self
            .store
            .generate_id(ORDERS_PATH)
            .await
            .map_err(|e| OrderError::PersistenceFailed(e.to_string()))?;

        let record = OrderRecord {
            order_id: order_id.clone(),
            buyer_id: buyer_id.to_string(),
            items: input.items,
            total_price: input.total_price,
            payment_method: input.payment_method,
            status: input.status,
            order_date: input.order_date,
            delivery_date: input.delivery_date,
        };

        let value = serde_json::to_value(&record)
            .map_err(|e| OrderError::PersistenceFailed(e.to_string()))?;
        self.store
            .set(&Self::order_path(&order_id), value)
            .await
            .map_err(|e| OrderError::PersistenceFailed(e.to_string()))?;

        tracing::info!(
            order_id = %record.order_id,
            buyer_id = %record.buyer_id,
            items = record.items.len(),
            total_price = record.total_price,
            "Order persisted"
        );

        Ok(record)
    }

    /// Get order by ID
    pub async fn get_order(&self, order_id: &str) -> Result<Option<OrderRecord>> {
        match self.store.get(&Self::order_path(order_id)).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    /// Orders placed by a buyer, most useful for the order-history screen.
    pub async fn orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<OrderRecord>> {
        let children = self.store.get_children(ORDERS_PATH).await?;
        let mut orders = Vec::new();
        for (_, value) in children {
            let order: OrderRecord = serde_json::from_value(value).map_err(StoreError::from)?;
            if order.buyer_id == buyer_id {
                orders.push(order);
            }
        }
        Ok(orders)
    }
}
