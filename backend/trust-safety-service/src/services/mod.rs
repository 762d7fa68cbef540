pub mod enforcement_service;

pub use enforcement_service::EnforcementService;
