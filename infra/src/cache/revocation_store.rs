//! Redis-backed revocation store
//!
//! Each revoked token is one key, `deactivated_token:<fingerprint>`, holding
//! the marker value and expiring on its own; Redis does the cleanup.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use tw_core::errors::DomainError;
use tw_core::repositories::RevocationStore;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// [`RevocationStore`] over a shared [`RedisClient`]
///
/// Keys are namespaced with the configured `key_prefix`, if any.
#[derive(Debug, Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
}

impl RedisRevocationStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Connects to Redis from `config` and checks it answers PING
    pub async fn connect(config: tw_shared::CacheConfig) -> Result<Self, InfrastructureError> {
        let client = RedisClient::new(config).await?;
        if !client.health_check().await? {
            return Err(InfrastructureError::General(
                "Redis did not answer PING with PONG".to_string(),
            ));
        }
        info!("Revocation store ready");
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Remaining lifetime of a revocation record in seconds
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        self.client.ttl(&self.client.config().make_key(key)).await
    }
}

/// Whole seconds, rounded up, never below one
pub(crate) fn expiry_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let key = self.client.config().make_key(key);
        self.client
            .set_with_expiry(&key, value, expiry_seconds(ttl))
            .await
            .map_err(DomainError::from)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let key = self.client.config().make_key(key);
        self.client.exists(&key).await.map_err(DomainError::from)
    }
}
