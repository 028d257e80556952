// src/repositories/mod.rs

pub mod postgres;

pub use postgres::benefits::PostgresBenefitRepository;
pub use postgres::businesses::PostgresBusinessRepository;
pub use postgres::members::PostgresMemberRepository;
pub use postgres::redemptions::PostgresRedemptionRepository;
