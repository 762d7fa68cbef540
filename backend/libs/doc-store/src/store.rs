use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::error::Result;

/// Change notification for a record under a listened path.
///
/// `value` is `None` when the record was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub path: String,
    pub value: Option<Value>,
}

/// Read-modify-write closure for [`DocumentStore::run_transaction`].
///
/// Receives the current record (`None` if absent) and returns the value to
/// commit, or `None` to abort without writing.
pub type TransactionUpdate = Box<dyn Fn(Option<Value>) -> Option<Value> + Send + Sync>;

/// Document store interface
///
/// Records are JSON values addressable by `/`-separated paths
/// (e.g. `orders/abc123`). Any backing technology satisfying these
/// primitives can sit behind the services.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a single record.
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Read several records, issuing the individual reads concurrently.
    /// Results come back in the order of `paths`.
    async fn get_many(&self, paths: &[String]) -> Result<Vec<Option<Value>>> {
        let reads = join_all(paths.iter().map(|path| self.get(path))).await;
        reads.into_iter().collect()
    }

    /// Create or overwrite a record.
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Merge `fields` into the record's top-level object, creating the
    /// record if it does not exist.
    async fn update_fields(&self, path: &str, fields: Map<String, Value>) -> Result<()>;

    /// Delete a record. Deleting an absent record is not an error.
    async fn remove(&self, path: &str) -> Result<()>;

    /// Generate a collision-free child key under `parent_path`.
    async fn generate_id(&self, parent_path: &str) -> Result<String>;

    /// Atomic read-modify-write on a single record. Returns `true` if the
    /// closure's value committed, `false` if the closure aborted.
    ///
    /// Atomic only with respect to other writers of the same path; there is
    /// no multi-record atomicity.
    async fn run_transaction(&self, path: &str, update: TransactionUpdate) -> Result<bool>;

    /// Direct children of a collection path as `(child_key, value)` pairs,
    /// sorted by key.
    async fn get_children(&self, path: &str) -> Result<Vec<(String, Value)>>;

    /// Subscribe to change events for `path_prefix` and everything below it.
    async fn listen(&self, path_prefix: &str) -> Result<mpsc::UnboundedReceiver<ChangeEvent>>;
}
