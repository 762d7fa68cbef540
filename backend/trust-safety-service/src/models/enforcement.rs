//! User enforcement models (Reports, Warnings, Bans)

use serde::{Deserialize, Serialize};

/// Review state of an abuse report.
///
/// Serialized with the store's historical wire strings: `"pending"`,
/// `"Accepted"`, `"Rejected"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "pending")]
    Pending,
    Accepted,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    /// Reports move from pending to a terminal review decision, never back.
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Rejected)
        )
    }
}

/// One abuse report filed by one user against another, stored under
/// `reports/{report_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_id: String,
    pub reporter_id: String,
    pub reporter_name: String,
    pub reporter_role: String,
    pub reported_user_id: String,
    pub reported_user_name: String,
    pub reported_user_role: String,
    pub reason: String,
    /// Milliseconds since epoch, set at creation.
    pub timestamp: i64,
    pub status: ReportStatus,
}

/// One warning issued against a user, stored under
/// `warnings/{user_id}/{warning_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningRecord {
    pub warning_id: String,
    pub user_id: String,
    pub reason: String,
    /// Milliseconds since epoch, set at creation.
    pub timestamp: i64,
    /// Flipped to true when the user acknowledges the warning.
    #[serde(default)]
    pub is_read: bool,
}

/// The temporary suspension state for a user, stored under `bans/{user_id}`.
///
/// At most one record per user; each escalation overwrites the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanRecord {
    pub user_id: String,
    pub banned_at: i64,
    pub ban_expires_at: i64,
    pub ban_duration_days: i64,
    /// Warning count at the time the ban was computed.
    pub warning_count: u32,
    pub reason: String,
    pub is_active: bool,
}

/// Moderation-inbox entry written for admins on every accepted report,
/// stored under `admin_notifications/{notification_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminNotificationRecord {
    pub notification_id: String,
    pub report_id: String,
    pub reporter_id: String,
    pub reporter_name: String,
    pub reported_user_id: String,
    pub reported_user_name: String,
    pub reason: String,
    pub timestamp: i64,
    #[serde(default)]
    pub is_read: bool,
}

/// Input for filing a new report
#[derive(Debug, Clone)]
pub struct CreateReportInput {
    pub reporter_id: String,
    pub reporter_name: String,
    pub reporter_role: String,
    pub reported_user_id: String,
    pub reported_user_name: String,
    pub reported_user_role: String,
    pub reason: String,
}

/// Caller-visible outcome of a successfully filed report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// Report recorded and a warning issued.
    Warned { warning_count: u32 },
    /// Report recorded, warning issued, and the warning count crossed the
    /// escalation threshold.
    WarnedAndBanned { ban: BanRecord },
}

impl ReportOutcome {
    /// Display message for the reporting user.
    pub fn message(&self) -> String {
        match self {
            Self::Warned { .. } => "User reported and warned".to_string(),
            Self::WarnedAndBanned { ban } => format!(
                "User reported, warned, and banned for {} days",
                ban.ban_duration_days
            ),
        }
    }
}

/// Answer to the "is this user currently banned" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanStatus {
    pub is_banned: bool,
    pub ban_expires_at: Option<i64>,
}

impl BanStatus {
    pub fn not_banned() -> Self {
        Self {
            is_banned: false,
            ban_expires_at: None,
        }
    }
}
