//! Integration tests for the Redis revocation store
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p tw_infra --test redis_integration -- --ignored

use std::sync::Arc;
use std::time::Duration;

use tw_core::testutil::{fixed_now, key_manager, InMemorySecretSource, ManualClock};
use tw_core::{
    revocation_key, token_fingerprint, DomainError, RevocationStore, Role, Scope, TokenError,
    TokenService, TokenServiceConfig,
};
use tw_infra::cache::{CacheConfig, RedisRevocationStore};

fn test_config() -> CacheConfig {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    CacheConfig::new(url).with_prefix("tw_test")
}

async fn token_service(store: RedisRevocationStore) -> TokenService {
    let keys = key_manager(Arc::new(InMemorySecretSource::primary())).await;
    TokenService::new(
        keys,
        Arc::new(store),
        Arc::new(ManualClock::new(fixed_now())),
        TokenServiceConfig::default(),
    )
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_set_and_exists_with_prefix() {
    let store = RedisRevocationStore::connect(test_config()).await.unwrap();

    let key = revocation_key("integration-set-exists");
    store.set(&key, "deactivated", Duration::from_secs(30)).await.unwrap();

    assert!(store.exists(&key).await.unwrap());
    assert!(!store.exists(&revocation_key("never-written")).await.unwrap());

    let prefixed = "tw_test:deactivated_token:integration-set-exists";
    assert!(store.client().exists(prefixed).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_record_expires_with_ttl() {
    let store = RedisRevocationStore::connect(test_config()).await.unwrap();

    let key = revocation_key("integration-expiry");
    store.set(&key, "deactivated", Duration::from_secs(1)).await.unwrap();
    assert!(store.exists(&key).await.unwrap());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(!store.exists(&key).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_revoked_token_is_rejected_through_redis() {
    let store = RedisRevocationStore::connect(test_config()).await.unwrap();
    let service = token_service(store.clone()).await;

    let token = service.issue_access_token(4242, Role::User).unwrap();
    assert!(service.verify(&token, Scope::Authentication).await.is_ok());

    service.revoke(&token, Duration::from_secs(900)).await.unwrap();

    let result = service.verify(&token, Scope::Authentication).await;
    assert_eq!(result, Err(DomainError::Token(TokenError::TokenRevoked)));

    let ttl = store
        .ttl(&revocation_key(&token_fingerprint(&token)))
        .await
        .unwrap()
        .unwrap();
    assert!(ttl > 890 && ttl <= 900);
}
