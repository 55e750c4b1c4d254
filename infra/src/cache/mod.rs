//! Cache module for Redis-backed state
//!
//! The only state this service keeps outside its process is the set of
//! revoked token fingerprints.

pub mod redis_client;
pub mod revocation_store;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use revocation_store::RedisRevocationStore;

// Re-export commonly used types
pub use tw_shared::config::cache::CacheConfig;
