//! Store operations for the admin moderation inbox

use chrono::Utc;
use doc_store::{DocumentStore, StoreError};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{AdminNotificationRecord, ReportRecord};

const NOTIFICATIONS_PATH: &str = "admin_notifications";

/// Store operations for the admin moderation inbox.
pub struct NotificationsDb {
    store: Arc<dyn DocumentStore>,
}

impl NotificationsDb {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Write a moderation-inbox entry for a freshly filed report.
    pub async fn notify_admins(&self, report: &ReportRecord) -> Result<AdminNotificationRecord> {
        let notification_id = self.store.generate_id(NOTIFICATIONS_PATH).await?;

        let record = AdminNotificationRecord {
            notification_id: notification_id.clone(),
            report_id: report.report_id.clone(),
            reporter_id: report.reporter_id.clone(),
            reporter_name: report.reporter_name.clone(),
            reported_user_id: report.reported_user_id.clone(),
            reported_user_name: report.reported_user_name.clone(),
            reason: report.reason.clone(),
            timestamp: Utc::now().timestamp_millis(),
            is_read: false,
        };

        let value = serde_json::to_value(&record).map_err(StoreError::from)?;
        self.store
            .set(
                &format!("{}/{}", NOTIFICATIONS_PATH, notification_id),
                value,
            )
            .await?;

        tracing::debug!(
            notification_id = %record.notification_id,
            report_id = %report.report_id,
            "Admins notified"
        );

        Ok(record)
    }

    /// Inbox entries, newest first.
    pub async fn list_notifications(&self) -> Result<Vec<AdminNotificationRecord>> {
        let children = self.store.get_children(NOTIFICATIONS_PATH).await?;
        let mut notifications = Vec::with_capacity(children.len());
        for (_, value) in children {
            let notification: AdminNotificationRecord =
                serde_json::from_value(value).map_err(StoreError::from)?;
            notifications.push(notification);
        }
        notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(notifications)
    }
}
