//! Dependency sources.
//!
//! ccgx never downloads modules itself; it only finds what the host
//! toolchain placed in its module cache.

pub mod cache;

pub use cache::{CacheEntry, CacheError, CacheResolver, ModuleCache};
