use doc_store::{AuthProvider, DocumentStore};
use futures::future::join_all;
use std::sync::Arc;

use crate::db::{OrdersDb, StockDb};
use crate::error::{OrderError, Result};
use crate::models::{NewOrder, OrderPlacement, OrderRecord, StockCheck, StockLevel, StockShortage};

/// Order placement and stock reservation flow.
///
/// Placement runs in three passes: an advisory stock-validation pass over
/// all line items, the order commit, and one independent stock transaction
/// per line item. Validation and decrement are deliberately separate; a
/// concurrent order can still win the race, which surfaces as clamped
/// counters or a `PlacedStockIncomplete` outcome rather than a rollback.
pub struct OrderService {
    auth: Arc<dyn AuthProvider>,
    orders: OrdersDb,
    stock: StockDb,
}

impl OrderService {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            orders: OrdersDb::new(store.clone()),
            stock: StockDb::new(store),
        }
    }

    /// Place an order for the signed-in buyer.
    ///
    /// Fails with `NotAuthenticated` before any store access when no user is
    /// signed in, and with `StockValidationFailed` (nothing persisted) when
    /// any line item is out of stock or short. After the order record is
    /// persisted, per-item stock failures do not roll it back; they are
    /// reported through `OrderPlacement::PlacedStockIncomplete`.
    pub async fn place_order(&self, order: NewOrder) -> Result<OrderPlacement> {
        let buyer_id = self
            .auth
            .current_user_id()
            .ok_or(OrderError::NotAuthenticated)?;

        let shortages = self.validate_stock(&order).await?;
        if !shortages.is_empty() {
            return Err(OrderError::StockValidationFailed(shortages));
        }

        let record = self.orders.create_order(order, &buyer_id).await?;

        let updates = join_all(record.items.iter().map(|item| async {
            let committed = match self.stock.apply_sale(&item.product_id, item.quantity).await {
                Ok(committed) => committed,
                Err(error) => {
                    tracing::error!(
                        product_id = %item.product_id,
                        %error,
                        "Stock update errored"
                    );
                    false
                }
            };
            (item.product_name.clone(), committed)
        }))
        .await;

        let failed_products: Vec<String> = updates
            .into_iter()
            .filter_map(|(product_name, committed)| (!committed).then_some(product_name))
            .collect();

        if failed_products.is_empty() {
            tracing::info!(order_id = %record.order_id, "Order placed");
            Ok(OrderPlacement::Placed {
                order_id: record.order_id,
            })
        } else {
            tracing::warn!(
                order_id = %record.order_id,
                failed_products = ?failed_products,
                "Order placed but some stock updates did not commit"
            );
            Ok(OrderPlacement::PlacedStockIncomplete {
                order_id: record.order_id,
                failed_products,
            })
        }
    }

    /// Availability check for a single product, used before checkout for
    /// early feedback. Same classification rules as the validation pass.
    pub async fn check_product_stock(
        &self,
        product_id: &str,
        requested: u32,
    ) -> Result<StockCheck> {
        let record = self
            .stock
            .get_stock(product_id)
            .await?
            .ok_or_else(|| OrderError::ProductNotFound(product_id.to_string()))?;

        Ok(StockCheck {
            sufficient: record.level_for(requested) == StockLevel::Sufficient,
            available: record.stock,
            product_name: record.name,
        })
    }

    /// Order history for the signed-in buyer.
    pub async fn my_orders(&self) -> Result<Vec<OrderRecord>> {
        let buyer_id = self
            .auth
            .current_user_id()
            .ok_or(OrderError::NotAuthenticated)?;
        self.orders.orders_for_buyer(&buyer_id).await
    }

    /// Advisory validation pass: concurrent stock reads over every line
    /// item, collecting all shortages. A missing product document fails
    /// closed as out of stock.
    async fn validate_stock(&self, order: &NewOrder) -> Result<Vec<StockShortage>> {
        let product_ids: Vec<String> = order
            .items
            .iter()
            .map(|item| item.product_id.clone())
            .collect();
        let records = self.stock.get_stock_many(&product_ids).await?;

        let mut shortages = Vec::new();
        for (item, record) in order.items.iter().zip(records) {
            let level = match record {
                Some(record) => record.level_for(item.quantity),
                None => StockLevel::OutOfStock,
            };
            if level != StockLevel::Sufficient {
                shortages.push(StockShortage {
                    product_name: item.product_name.clone(),
                    requested: item.quantity,
                    level,
                });
            }
        }
        Ok(shortages)
    }
}
