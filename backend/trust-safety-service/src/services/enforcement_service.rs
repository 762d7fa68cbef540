use chrono::{Duration, Utc};
use doc_store::DocumentStore;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{BansDb, NotificationsDb, ReportsDb, WarningsDb};
use crate::error::{Result, TrustSafetyError};
use crate::models::{
    BanRecord, BanStatus, CreateReportInput, ReportOutcome, ReportRecord, ReportStatus,
};

const DEFAULT_BAN_THRESHOLD: u32 = 3;

/// Report intake, warning escalation, and ban gating.
///
/// Every report that persists also issues a warning against the reported
/// user; once the live warning count reaches the threshold the user gets a
/// time-bounded ban, recomputed and overwritten on every further report.
/// Expired bans are lifted lazily, on the next ban check, not by a sweep.
pub struct EnforcementService {
    reports: ReportsDb,
    warnings: WarningsDb,
    bans: BansDb,
    notifications: NotificationsDb,
    ban_threshold: u32,
}

impl EnforcementService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_threshold(store, DEFAULT_BAN_THRESHOLD)
    }

    pub fn with_config(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self::with_threshold(store, config.warning_ban_threshold)
    }

    pub fn with_threshold(store: Arc<dyn DocumentStore>, ban_threshold: u32) -> Self {
        Self {
            reports: ReportsDb::new(store.clone()),
            warnings: WarningsDb::new(store.clone()),
            bans: BansDb::new(store.clone()),
            notifications: NotificationsDb::new(store),
            ban_threshold,
        }
    }

    /// File an abuse report against a user.
    ///
    /// The report must carry a reason; without one nothing is written. Once
    /// the report persists, the warning append and the admin notification
    /// are each best-effort: their failures are logged but never roll the
    /// report back, and escalation still runs against whatever warning
    /// count the store currently holds.
    pub async fn report_user(&self, input: CreateReportInput) -> Result<ReportOutcome> {
        if input.reason.trim().is_empty() {
            return Err(TrustSafetyError::MissingReason);
        }

        let report = self.reports.create_report(input).await?;

        if let Err(error) = self
            .warnings
            .create_warning(&report.reported_user_id, &report.reason)
            .await
        {
            tracing::error!(
                user_id = %report.reported_user_id,
                %error,
                "Failed to record warning"
            );
        }

        let warning_count = self
            .warnings
            .count_user_warnings(&report.reported_user_id)
            .await?;

        let ban = match ban_duration_days(warning_count, self.ban_threshold) {
            Some(duration_days) => {
                let now = Utc::now();
                let ban = BanRecord {
                    user_id: report.reported_user_id.clone(),
                    banned_at: now.timestamp_millis(),
                    ban_expires_at: (now + Duration::days(duration_days)).timestamp_millis(),
                    ban_duration_days: duration_days,
                    warning_count,
                    reason: report.reason.clone(),
                    is_active: true,
                };
                self.bans.upsert_ban(&ban).await?;
                Some(ban)
            }
            None => None,
        };

        if let Err(error) = self.notifications.notify_admins(&report).await {
            tracing::error!(
                report_id = %report.report_id,
                %error,
                "Failed to notify admins"
            );
        }

        Ok(match ban {
            Some(ban) => ReportOutcome::WarnedAndBanned { ban },
            None => ReportOutcome::Warned { warning_count },
        })
    }

    /// Whether the user is banned right now.
    ///
    /// Reading an expired-but-active ban lifts it as a side effect; a user
    /// whose ban ran out stays marked banned until someone asks.
    pub async fn is_user_currently_banned(&self, user_id: &str) -> Result<BanStatus> {
        let Some(ban) = self.bans.get_ban(user_id).await? else {
            return Ok(BanStatus::not_banned());
        };

        if !ban.is_active {
            return Ok(BanStatus::not_banned());
        }

        let now = Utc::now().timestamp_millis();
        if now < ban.ban_expires_at {
            return Ok(BanStatus {
                is_banned: true,
                ban_expires_at: Some(ban.ban_expires_at),
            });
        }

        self.bans.deactivate(user_id).await?;
        tracing::info!(user_id = %user_id, "Expired ban lifted on check");
        Ok(BanStatus::not_banned())
    }

    /// Admin review decision on a pending report.
    pub async fn review_report(&self, report_id: &str, accept: bool) -> Result<ReportRecord> {
        let status = if accept {
            ReportStatus::Accepted
        } else {
            ReportStatus::Rejected
        };
        self.reports.set_status(report_id, status).await
    }
}

/// Ban length for a live warning count, `None` below the threshold.
/// At the threshold: 7 days; one past it: 14; anything beyond: 30.
fn ban_duration_days(warning_count: u32, threshold: u32) -> Option<i64> {
    if warning_count < threshold {
        return None;
    }
    Some(match warning_count - threshold {
        0 => 7,
        1 => 14,
        _ => 30,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use doc_store::{ChangeEvent, MemoryStore, StoreError, TransactionUpdate};
    use serde_json::{Map, Value};
    use tokio::sync::mpsc;

    use crate::models::WarningRecord;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn report_against(user_id: &str, reporter_id: &str, reason: &str) -> CreateReportInput {
        CreateReportInput {
            reporter_id: reporter_id.to_string(),
            reporter_name: format!("Reporter {}", reporter_id),
            reporter_role: "buyer".to_string(),
            reported_user_id: user_id.to_string(),
            reported_user_name: format!("User {}", user_id),
            reported_user_role: "seller".to_string(),
            reason: reason.to_string(),
        }
    }

    fn service(store: Arc<MemoryStore>) -> EnforcementService {
        EnforcementService::new(store)
    }

    #[test]
    fn test_ban_duration_schedule() {
        assert_eq!(ban_duration_days(0, 3), None);
        assert_eq!(ban_duration_days(2, 3), None);
        assert_eq!(ban_duration_days(3, 3), Some(7));
        assert_eq!(ban_duration_days(4, 3), Some(14));
        assert_eq!(ban_duration_days(5, 3), Some(30));
        assert_eq!(ban_duration_days(12, 3), Some(30));
    }

    #[tokio::test]
    async fn test_blank_reason_rejected_with_no_side_effects() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let error = service
            .report_user(report_against("seller-1", "buyer-1", "   "))
            .await
            .unwrap_err();

        assert!(matches!(error, TrustSafetyError::MissingReason));
        assert!(store.get_children("reports").await.unwrap().is_empty());
        assert!(store
            .get_children("warnings/seller-1")
            .await
            .unwrap()
            .is_empty());
        assert!(store.get("bans/seller-1").await.unwrap().is_none());
        assert!(store
            .get_children("admin_notifications")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_report_records_warning_and_notifies_admins() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let outcome = service
            .report_user(report_against("seller-1", "buyer-1", "Fake listing"))
            .await
            .unwrap();

        assert_eq!(outcome, ReportOutcome::Warned { warning_count: 1 });
        assert_eq!(outcome.message(), "User reported and warned");

        let reports = service.reports.list_reports().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, ReportStatus::Pending);
        assert_eq!(reports[0].reason, "Fake listing");

        let warnings = service
            .warnings
            .list_user_warnings("seller-1")
            .await
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(!warnings[0].is_read);

        let inbox = service.notifications.list_notifications().await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].reported_user_id, "seller-1");
    }

    #[tokio::test]
    async fn test_third_warning_bans_for_seven_days() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        for (reporter, reason) in [
            ("buyer-1", "Fake listing"),
            ("buyer-2", "Abusive messages"),
        ] {
            let outcome = service
                .report_user(report_against("seller-1", reporter, reason))
                .await
                .unwrap();
            assert!(matches!(outcome, ReportOutcome::Warned { .. }));
        }

        let outcome = service
            .report_user(report_against("seller-1", "buyer-3", "Never shipped"))
            .await
            .unwrap();

        let ban = match outcome {
            ReportOutcome::WarnedAndBanned { ban } => ban,
            other => panic!("expected a ban on the third warning, got {:?}", other),
        };
        assert_eq!(ban.ban_duration_days, 7);
        assert_eq!(ban.warning_count, 3);
        assert_eq!(ban.ban_expires_at - ban.banned_at, 7 * DAY_MS);
        assert!(ban.is_active);

        let status = service
            .is_user_currently_banned("seller-1")
            .await
            .unwrap();
        assert!(status.is_banned);
        assert_eq!(status.ban_expires_at, Some(ban.ban_expires_at));
    }

    #[tokio::test]
    async fn test_escalation_grows_with_warning_count() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        // Three prior warnings on record, e.g. from earlier reports.
        for i in 0..3 {
            service
                .warnings
                .create_warning("seller-1", &format!("prior {}", i))
                .await
                .unwrap();
        }

        let outcome = service
            .report_user(report_against("seller-1", "buyer-9", "Counterfeit goods"))
            .await
            .unwrap();
        match outcome {
            ReportOutcome::WarnedAndBanned { ban } => {
                assert_eq!(ban.warning_count, 4);
                assert_eq!(ban.ban_duration_days, 14);
            }
            other => panic!("expected 14-day ban, got {:?}", other),
        }

        // One more report: the ban record is overwritten, last escalation wins.
        let outcome = service
            .report_user(report_against("seller-1", "buyer-10", "Still at it"))
            .await
            .unwrap();
        match outcome {
            ReportOutcome::WarnedAndBanned { ban } => {
                assert_eq!(ban.warning_count, 5);
                assert_eq!(ban.ban_duration_days, 30);
                assert_eq!(ban.reason, "Still at it");
            }
            other => panic!("expected 30-day ban, got {:?}", other),
        }

        let stored = service.bans.get_ban("seller-1").await.unwrap().unwrap();
        assert_eq!(stored.ban_duration_days, 30);
    }

    #[tokio::test]
    async fn test_expired_ban_lifted_lazily_on_check() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let now = Utc::now().timestamp_millis();
        service
            .bans
            .upsert_ban(&BanRecord {
                user_id: "seller-1".to_string(),
                banned_at: now - 8 * DAY_MS,
                ban_expires_at: now - DAY_MS,
                ban_duration_days: 7,
                warning_count: 3,
                reason: "Fake listing".to_string(),
                is_active: true,
            })
            .await
            .unwrap();

        let status = service
            .is_user_currently_banned("seller-1")
            .await
            .unwrap();
        assert!(!status.is_banned);
        assert_eq!(status.ban_expires_at, None);

        // The stored record was deactivated as a side effect of the read.
        let stored = service.bans.get_ban("seller-1").await.unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_inactive_or_absent_ban_is_not_banned() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        assert_eq!(
            service.is_user_currently_banned("nobody").await.unwrap(),
            BanStatus::not_banned()
        );

        let now = Utc::now().timestamp_millis();
        service
            .bans
            .upsert_ban(&BanRecord {
                user_id: "seller-1".to_string(),
                banned_at: now,
                ban_expires_at: now + 7 * DAY_MS,
                ban_duration_days: 7,
                warning_count: 3,
                reason: "x".to_string(),
                is_active: false,
            })
            .await
            .unwrap();

        assert_eq!(
            service.is_user_currently_banned("seller-1").await.unwrap(),
            BanStatus::not_banned()
        );
    }

    #[tokio::test]
    async fn test_review_report_transitions_status_once() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        service
            .report_user(report_against("seller-1", "buyer-1", "Fake listing"))
            .await
            .unwrap();
        let report_id = service.reports.list_reports().await.unwrap()[0]
            .report_id
            .clone();

        let reviewed = service.review_report(&report_id, true).await.unwrap();
        assert_eq!(reviewed.status, ReportStatus::Accepted);

        let error = service.review_report(&report_id, false).await.unwrap_err();
        assert!(matches!(
            error,
            TrustSafetyError::InvalidStatusTransition { .. }
        ));
    }

    /// Delegates to a `MemoryStore` but fails every write under one path
    /// prefix, standing in for a flaky warning list.
    struct FailingWrites {
        inner: MemoryStore,
        fail_prefix: String,
    }

    #[async_trait]
    impl doc_store::DocumentStore for FailingWrites {
        async fn get(&self, path: &str) -> doc_store::Result<Option<Value>> {
            self.inner.get(path).await
        }

        async fn set(&self, path: &str, value: Value) -> doc_store::Result<()> {
            if path.starts_with(&self.fail_prefix) {
                return Err(StoreError::Backend("write refused".to_string()));
            }
            self.inner.set(path, value).await
        }

        async fn update_fields(
            &self,
            path: &str,
            fields: Map<String, Value>,
        ) -> doc_store::Result<()> {
            self.inner.update_fields(path, fields).await
        }

        async fn remove(&self, path: &str) -> doc_store::Result<()> {
            self.inner.remove(path).await
        }

        async fn generate_id(&self, parent_path: &str) -> doc_store::Result<String> {
            self.inner.generate_id(parent_path).await
        }

        async fn run_transaction(
            &self,
            path: &str,
            update: TransactionUpdate,
        ) -> doc_store::Result<bool> {
            self.inner.run_transaction(path, update).await
        }

        async fn get_children(&self, path: &str) -> doc_store::Result<Vec<(String, Value)>> {
            self.inner.get_children(path).await
        }

        async fn listen(
            &self,
            path_prefix: &str,
        ) -> doc_store::Result<mpsc::UnboundedReceiver<ChangeEvent>> {
            self.inner.listen(path_prefix).await
        }
    }

    #[tokio::test]
    async fn test_failed_warning_write_still_escalates_on_stored_count() {
        let inner = MemoryStore::new();
        let store = Arc::new(FailingWrites {
            inner,
            fail_prefix: "warnings/seller-1".to_string(),
        });

        // Three warnings already on record, written before the path went bad.
        for i in 0..3 {
            let record = WarningRecord {
                warning_id: format!("w{}", i),
                user_id: "seller-1".to_string(),
                reason: format!("prior {}", i),
                timestamp: Utc::now().timestamp_millis(),
                is_read: false,
            };
            store
                .inner
                .set(
                    &format!("warnings/seller-1/w{}", i),
                    serde_json::to_value(&record).unwrap(),
                )
                .await
                .unwrap();
        }

        let service = EnforcementService::new(store.clone());
        let outcome = service
            .report_user(report_against("seller-1", "buyer-1", "Scam storefront"))
            .await
            .unwrap();

        // The new warning write failed, so the count stayed at 3 and the
        // escalation banned on that stored count.
        match outcome {
            ReportOutcome::WarnedAndBanned { ban } => {
                assert_eq!(ban.warning_count, 3);
                assert_eq!(ban.ban_duration_days, 7);
            }
            other => panic!("expected escalation on stored count, got {:?}", other),
        }
        assert_eq!(
            store.inner.get_children("warnings/seller-1").await.unwrap().len(),
            3
        );
        // The report itself was not rolled back.
        assert_eq!(store.inner.get_children("reports").await.unwrap().len(), 1);
    }
}
