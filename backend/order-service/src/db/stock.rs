//! Store operations against product stock counters

use doc_store::{DocumentStore, StoreError};
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::models::ProductStockRecord;

const PRODUCTS_PATH: &str = "products";

/// Store operations against product stock counters.
///
/// The product catalog owns the documents; this engine only reads the stock
/// slice and mutates the `stock`/`sold` counters.
pub struct StockDb {
    store: Arc<dyn DocumentStore>,
}

impl StockDb {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn product_path(product_id: &str) -> String {
        format!("{}/{}", PRODUCTS_PATH, product_id)
    }

    /// Current stock slice for one product, `None` if the document is gone.
    pub async fn get_stock(&self, product_id: &str) -> Result<Option<ProductStockRecord>> {
        match self.store.get(&Self::product_path(product_id)).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    /// Stock slices for several products, read concurrently. Results come
    /// back in the order of `product_ids`.
    pub async fn get_stock_many(
        &self,
        product_ids: &[String],
    ) -> Result<Vec<Option<ProductStockRecord>>> {
        let paths: Vec<String> = product_ids
            .iter()
            .map(|product_id| Self::product_path(product_id))
            .collect();
        let values = self.store.get_many(&paths).await?;
        values
            .into_iter()
            .map(|value| match value {
                Some(value) => Ok(Some(
                    serde_json::from_value(value).map_err(StoreError::from)?,
                )),
                None => Ok(None),
            })
            .collect()
    }

    /// Atomically record one sale: `stock = max(0, stock - quantity)` and
    /// `sold += quantity`, leaving every other product field untouched.
    ///
    /// Returns whether the transaction committed; it aborts when the product
    /// document no longer exists.
    pub async fn apply_sale(&self, product_id: &str, quantity: u32) -> Result<bool> {
        let committed = self
            .store
            .run_transaction(
                &Self::product_path(product_id),
                Box::new(move |current| {
                    let mut doc = match current {
                        Some(Value::Object(doc)) => doc,
                        _ => return None,
                    };
                    let stock = doc.get("stock").and_then(Value::as_u64).unwrap_or(0);
                    let sold = doc.get("sold").and_then(Value::as_u64).unwrap_or(0);
                    doc.insert(
                        "stock".to_string(),
                        Value::from(stock.saturating_sub(u64::from(quantity))),
                    );
                    doc.insert("sold".to_string(), Value::from(sold + u64::from(quantity)));
                    Some(Value::Object(doc))
                }),
            )
            .await?;

        if committed {
            tracing::debug!(product_id = %product_id, quantity, "Stock counters updated");
        } else {
            tracing::warn!(
                product_id = %product_id,
                quantity,
                "Stock transaction did not commit"
            );
        }

        Ok(committed)
    }
}
