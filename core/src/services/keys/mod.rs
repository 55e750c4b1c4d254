//! Signing key management
//!
//! This module owns the RS256 key lifecycle:
//! - Fetching key material from a pluggable secret source
//! - Parsing every key into an immutable snapshot
//! - Atomically swapping snapshots on refresh
//! - Periodic background refresh with a single fast retry

mod config;
mod manager;
mod refresh;
mod snapshot;
mod source;

#[cfg(test)]
mod tests;

pub use config::KeyManagerConfig;
pub use manager::{ActiveSigningKey, KeyManager};
pub use refresh::{next_refresh_delay, KeyRefreshTask, RefreshObserver, TracingRefreshObserver};
pub use snapshot::KeySnapshot;
pub use source::SecretSource;
