use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::error::Result;
use crate::store::{ChangeEvent, DocumentStore, TransactionUpdate};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// In-process document store.
///
/// Backs the test suites and embedded deployments. Transactions apply their
/// closure under the map's entry guard, which serializes all writers of the
/// same path.
pub struct MemoryStore {
    records: DashMap<String, Value>,
    events: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            records: DashMap::new(),
            events,
        }
    }

    fn publish(&self, path: &str, value: Option<Value>) {
        // Send fails only when no listener is subscribed.
        let _ = self.events.send(ChangeEvent {
            path: path.to_string(),
            value,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        Ok(self.records.get(path).map(|entry| entry.value().clone()))
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.records.insert(path.to_string(), value.clone());
        self.publish(path, Some(value));
        Ok(())
    }

    async fn update_fields(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        let snapshot;
        {
            let mut entry = self
                .records
                .entry(path.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(existing) = entry.value_mut() {
                for (key, value) in fields {
                    existing.insert(key, value);
                }
            } else {
                // Merging into a scalar replaces it.
                *entry.value_mut() = Value::Object(fields);
            }
            snapshot = entry.value().clone();
        }
        self.publish(path, Some(snapshot));
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.records.remove(path);
        self.publish(path, None);
        Ok(())
    }

    async fn generate_id(&self, _parent_path: &str) -> Result<String> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn run_transaction(&self, path: &str, update: TransactionUpdate) -> Result<bool> {
        let committed_value = match self.records.entry(path.to_string()) {
            Entry::Occupied(mut occupied) => match update(Some(occupied.get().clone())) {
                Some(next) => {
                    occupied.insert(next.clone());
                    Some(next)
                }
                None => None,
            },
            Entry::Vacant(vacant) => match update(None) {
                Some(next) => {
                    vacant.insert(next.clone());
                    Some(next)
                }
                None => None,
            },
        };

        match committed_value {
            Some(value) => {
                self.publish(path, Some(value));
                Ok(true)
            }
            None => {
                tracing::debug!(path = %path, "Transaction aborted");
                Ok(false)
            }
        }
    }

    async fn get_children(&self, path: &str) -> Result<Vec<(String, Value)>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut children: Vec<(String, Value)> = self
            .records
            .iter()
            .filter_map(|entry| {
                let child = entry.key().strip_prefix(&prefix)?;
                if child.is_empty() || child.contains('/') {
                    return None;
                }
                Some((child.to_string(), entry.value().clone()))
            })
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children)
    }

    async fn listen(&self, path_prefix: &str) -> Result<mpsc::UnboundedReceiver<ChangeEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut events = self.events.subscribe();
        let prefix = path_prefix.trim_end_matches('/').to_string();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let matches = event.path == prefix
                            || event.path.starts_with(&format!("{}/", prefix));
                        if matches && tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Listener lagged behind change events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(rx)
    }
}
