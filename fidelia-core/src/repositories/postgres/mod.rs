// src/repositories/postgres/mod.rs

pub mod benefits;
pub mod businesses;
pub mod members;
pub mod redemptions;

pub use benefits::PostgresBenefitRepository;
pub use businesses::PostgresBusinessRepository;
pub use members::PostgresMemberRepository;
pub use redemptions::PostgresRedemptionRepository;
