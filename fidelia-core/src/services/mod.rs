// File: src/services/mod.rs

pub mod benefit_service;
pub mod catalog;
pub mod identity_service;
pub mod redemption_service;
pub mod stats_service;

pub use benefit_service::BenefitService;
pub use catalog::CatalogService;
pub use identity_service::IdentityService;
pub use redemption_service::RedemptionService;
pub use stats_service::StatsService;
