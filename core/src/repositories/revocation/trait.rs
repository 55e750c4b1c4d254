//! Revocation store trait defining the interface for deactivated-token records.

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::DomainError;

/// Key-value store with per-entry TTL recording deactivated tokens
///
/// Keys are already namespaced by the caller (`deactivated_token:<fingerprint>`).
/// Presence of a key means "reject"; the value is informational only.
///
/// # Consistency
/// A `set` that returned `Ok` must be visible to every later `exists` issued
/// from the same process. Writes are idempotent: repeating a `set` for the
/// same key only refreshes its TTL.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record `key` with `value` for `ttl`
    ///
    /// # Returns
    /// * `Ok(())` - Entry written
    /// * `Err(DomainError)` - Store unreachable or rejected the write
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Check whether `key` is currently recorded
    ///
    /// # Returns
    /// * `Ok(true)` - Entry present and not yet expired
    /// * `Ok(false)` - No entry
    /// * `Err(DomainError)` - Store unreachable
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;
}
