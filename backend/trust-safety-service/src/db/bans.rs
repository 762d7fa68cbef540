//! Store operations for user bans

use doc_store::{DocumentStore, StoreError};
use serde_json::Map;
use std::sync::Arc;

use crate::error::Result;
use crate::models::BanRecord;

const BANS_PATH: &str = "bans";

/// Store operations for user bans.
pub struct BansDb {
    store: Arc<dyn DocumentStore>,
}

impl BansDb {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn ban_path(user_id: &str) -> String {
        format!("{}/{}", BANS_PATH, user_id)
    }

    /// Write the user's ban record; each escalation overwrites the last, so
    /// no history of prior bans is retained.
    pub async fn upsert_ban(&self, ban: &BanRecord) -> Result<()> {
        let value = serde_json::to_value(ban).map_err(StoreError::from)?;
        self.store.set(&Self::ban_path(&ban.user_id), value).await?;

        tracing::warn!(
            user_id = %ban.user_id,
            warning_count = ban.warning_count,
            duration_days = ban.ban_duration_days,
            "User banned"
        );

        Ok(())
    }

    /// Current ban record for a user, if any.
    pub async fn get_ban(&self, user_id: &str) -> Result<Option<BanRecord>> {
        match self.store.get(&Self::ban_path(user_id)).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    /// Flip `is_active` off, leaving the rest of the record for audit.
    pub async fn deactivate(&self, user_id: &str) -> Result<()> {
        let mut fields = Map::new();
        fields.insert("is_active".to_string(), serde_json::Value::Bool(false));
        self.store
            .update_fields(&Self::ban_path(user_id), fields)
            .await?;

        tracing::info!(user_id = %user_id, "Ban deactivated");

        Ok(())
    }
}
