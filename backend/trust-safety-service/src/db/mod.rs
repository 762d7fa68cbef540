pub mod bans;
pub mod notifications;
pub mod reports;
pub mod warnings;

pub use bans::BansDb;
pub use notifications::NotificationsDb;
pub use reports::ReportsDb;
pub use warnings::WarningsDb;
