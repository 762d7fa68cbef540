pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TrustSafetyError};
pub use models::{
    AdminNotificationRecord, BanRecord, BanStatus, CreateReportInput, ReportOutcome, ReportRecord,
    ReportStatus, WarningRecord,
};
pub use services::EnforcementService;
