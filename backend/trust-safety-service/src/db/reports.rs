//! Store operations for user reports

use chrono::Utc;
use doc_store::{DocumentStore, StoreError};
use serde_json::Map;
use std::sync::Arc;

use crate::error::{Result, TrustSafetyError};
use crate::models::{CreateReportInput, ReportRecord, ReportStatus};

const REPORTS_PATH: &str = "reports";

/// Store operations for user reports.
pub struct ReportsDb {
    store: Arc<dyn DocumentStore>,
}

impl ReportsDb {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn report_path(report_id: &str) -> String {
        format!("{}/{}", REPORTS_PATH, report_id)
    }

    /// File a new report with status `pending`.
    ///
    /// Store failures surface as `PersistenceFailed`; no warning may be
    /// issued when the report itself did not persist.
    pub async fn create_report(&self, input: CreateReportInput) -> Result<ReportRecord> {
        let report_id = self
            .store
            .generate_id(REPORTS_PATH)
            .await
            .map_err(|e| TrustSafetyError::PersistenceFailed(e.to_string()))?;

        let record = ReportRecord {
            report_id: report_id.clone(),
            reporter_id: input.reporter_id,
            reporter_name: input.reporter_name,
            reporter_role: input.reporter_role,
            reported_user_id: input.reported_user_id,
            reported_user_name: input.reported_user_name,
            reported_user_role: input.reported_user_role,
            reason: input.reason,
            timestamp: Utc::now().timestamp_millis(),
            status: ReportStatus::Pending,
        };

        let value = serde_json::to_value(&record)
            .map_err(|e| TrustSafetyError::PersistenceFailed(e.to_string()))?;
        self.store
            .set(&Self::report_path(&report_id), value)
            .await
            .map_err(|e| TrustSafetyError::PersistenceFailed(e.to_string()))?;

        tracing::info!(
            report_id = %record.report_id,
            reporter = %record.reporter_id,
            reported_user = %record.reported_user_id,
            "User report created"
        );

        Ok(record)
    }

    /// Get report by ID
    pub async fn get_report(&self, report_id: &str) -> Result<ReportRecord> {
        match self.store.get(&Self::report_path(report_id)).await? {
            Some(value) => Ok(serde_json::from_value(value).map_err(StoreError::from)?),
            None => Err(TrustSafetyError::ReportNotFound(report_id.to_string())),
        }
    }

    /// Apply an admin review decision.
    pub async fn set_status(&self, report_id: &str, status: ReportStatus) -> Result<ReportRecord> {
        let mut report = self.get_report(report_id).await?;

        if !report.status.can_transition_to(status) {
            return Err(TrustSafetyError::InvalidStatusTransition {
                from: report.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }

        let mut fields = Map::new();
        fields.insert(
            "status".to_string(),
            serde_json::to_value(status).map_err(StoreError::from)?,
        );
        self.store
            .update_fields(&Self::report_path(report_id), fields)
            .await?;
        report.status = status;

        tracing::info!(
            report_id = %report_id,
            status = %status.as_str(),
            "Report reviewed"
        );

        Ok(report)
    }

    /// All stored reports, newest first.
    pub async fn list_reports(&self) -> Result<Vec<ReportRecord>> {
        let children = self.store.get_children(REPORTS_PATH).await?;
        let mut reports = Vec::with_capacity(children.len());
        for (_, value) in children {
            let report: ReportRecord = serde_json::from_value(value).map_err(StoreError::from)?;
            reports.push(report);
        }
        reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(reports)
    }
}
