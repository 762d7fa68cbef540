//! Store operations for user warnings

use chrono::Utc;
use doc_store::{DocumentStore, StoreError};
use serde_json::Map;
use std::sync::Arc;

use crate::error::Result;
use crate::models::WarningRecord;

const WARNINGS_PATH: &str = "warnings";

/// Store operations for user warnings.
pub struct WarningsDb {
    store: Arc<dyn DocumentStore>,
}

impl WarningsDb {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn user_warnings_path(user_id: &str) -> String {
        format!("{}/{}", WARNINGS_PATH, user_id)
    }

    fn warning_path(user_id: &str, warning_id: &str) -> String {
        format!("{}/{}/{}", WARNINGS_PATH, user_id, warning_id)
    }

    /// Append a warning to the user's warning list.
    pub async fn create_warning(&self, user_id: &str, reason: &str) -> Result<WarningRecord> {
        let parent = Self::user_warnings_path(user_id);
        let warning_id = self.store.generate_id(&parent).await?;

        let record = WarningRecord {
            warning_id: warning_id.clone(),
            user_id: user_id.to_string(),
            reason: reason.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            is_read: false,
        };

        let value = serde_json::to_value(&record).map_err(StoreError::from)?;
        self.store
            .set(&Self::warning_path(user_id, &warning_id), value)
            .await?;

        tracing::info!(
            warning_id = %record.warning_id,
            user_id = %user_id,
            "Warning issued"
        );

        Ok(record)
    }

    /// All warnings on record for a user, oldest first.
    pub async fn list_user_warnings(&self, user_id: &str) -> Result<Vec<WarningRecord>> {
        let children = self
            .store
            .get_children(&Self::user_warnings_path(user_id))
            .await?;
        let mut warnings = Vec::with_capacity(children.len());
        for (_, value) in children {
            let warning: WarningRecord = serde_json::from_value(value).map_err(StoreError::from)?;
            warnings.push(warning);
        }
        warnings.sort_by_key(|warning| warning.timestamp);
        Ok(warnings)
    }

    /// Live warning count. Escalation decisions always call this; the count
    /// is never cached between calls.
    pub async fn count_user_warnings(&self, user_id: &str) -> Result<u32> {
        let children = self
            .store
            .get_children(&Self::user_warnings_path(user_id))
            .await?;
        Ok(children.len() as u32)
    }

    /// Acknowledge a warning on behalf of the warned user.
    pub async fn mark_read(&self, user_id: &str, warning_id: &str) -> Result<()> {
        let mut fields = Map::new();
        fields.insert("is_read".to_string(), serde_json::Value::Bool(true));
        self.store
            .update_fields(&Self::warning_path(user_id, warning_id), fields)
            .await?;

        tracing::info!(
            warning_id = %warning_id,
            user_id = %user_id,
            "Warning acknowledged"
        );

        Ok(())
    }
}
