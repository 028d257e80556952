// File: src/cache/mod.rs
pub mod resolution_cache;

pub use resolution_cache::{CacheConfig, CacheKey, CacheValue, ResolutionCache};
