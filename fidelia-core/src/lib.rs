// src/lib.rs

pub mod cache;
pub mod db;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use db::Database;
pub use fidelia_common::error::Error;

/// Install a process-wide tracing subscriber honoring `RUST_LOG`, defaulting
/// to `info`. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
