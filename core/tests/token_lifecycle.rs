//! End-to-end token lifecycle through the public API: a file-less secret
//! source, a key manager, the token service and the authorization gate.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tw_core::domain::entities::keys::SigningKeyPem;
use tw_core::domain::entities::token::{RevocationKind, Role, Scope};
use tw_core::errors::{AuthError, DomainError, KeyError, TokenError};
use tw_core::repositories::InMemoryRevocationStore;
use tw_core::services::{
    AuthorizationGate, KeyManager, KeyManagerConfig, ManualClock, SecretSource, TokenService,
    TokenServiceConfig,
};

const PRIMARY_PRIVATE: &str = include_str!("fixtures/primary_private.pem");
const PRIMARY_PUBLIC: &str = include_str!("fixtures/primary_public.pem");
const ROTATED_PRIVATE: &str = include_str!("fixtures/rotated_private.pem");
const ROTATED_PUBLIC: &str = include_str!("fixtures/rotated_public.pem");

struct VaultLikeSource {
    signing: Mutex<SigningKeyPem>,
    public: Mutex<HashMap<String, String>>,
    down: Mutex<bool>,
}

impl VaultLikeSource {
    fn new() -> Self {
        let mut public = HashMap::new();
        public.insert("2024-01".to_string(), PRIMARY_PUBLIC.to_string());
        Self {
            signing: Mutex::new(SigningKeyPem {
                kid: "2024-01".to_string(),
                private_key_pem: PRIMARY_PRIVATE.to_string(),
            }),
            public: Mutex::new(public),
            down: Mutex::new(false),
        }
    }

    fn rotate(&self) {
        self.public
            .lock()
            .unwrap()
            .insert("2024-02".to_string(), ROTATED_PUBLIC.to_string());
        *self.signing.lock().unwrap() = SigningKeyPem {
            kid: "2024-02".to_string(),
            private_key_pem: ROTATED_PRIVATE.to_string(),
        };
    }
}

#[async_trait]
impl SecretSource for VaultLikeSource {
    async fn read_signing_key(&self) -> Result<SigningKeyPem, KeyError> {
        if *self.down.lock().unwrap() {
            return Err(KeyError::SourceUnavailable {
                message: "sealed".to_string(),
            });
        }
        Ok(self.signing.lock().unwrap().clone())
    }

    async fn read_public_keys(&self) -> Result<HashMap<String, String>, KeyError> {
        Ok(self.public.lock().unwrap().clone())
    }
}

struct Stack {
    source: Arc<VaultLikeSource>,
    keys: Arc<KeyManager>,
    tokens: Arc<TokenService>,
    gate: AuthorizationGate,
}

async fn stack() -> Stack {
    let source = Arc::new(VaultLikeSource::new());
    let keys = Arc::new(
        KeyManager::initialize(source.clone(), KeyManagerConfig::default())
            .await
            .unwrap(),
    );
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    ));
    let tokens = Arc::new(TokenService::new(
        keys.clone(),
        Arc::new(InMemoryRevocationStore::new()),
        clock,
        TokenServiceConfig::default(),
    ));
    let gate = AuthorizationGate::new(tokens.clone());

    Stack {
        source,
        keys,
        tokens,
        gate,
    }
}

#[tokio::test]
async fn login_refresh_logout_flow() {
    let stack = stack().await;

    let pair = stack.tokens.issue_pair(42, Role::Admin).unwrap();
    let header = format!("Bearer {}", pair.access_token);

    let principal = stack
        .gate
        .authorize(Some(&header), Some(Role::Admin))
        .await
        .unwrap();
    assert_eq!(principal.subject_id, 42);

    let refreshed = stack.tokens.refresh(&pair.refresh_token).await.unwrap();
    let principal = stack
        .tokens
        .verify(&refreshed, Scope::Authentication)
        .await
        .unwrap();
    assert_eq!(principal.role, Role::Admin);

    stack
        .tokens
        .revoke_for(&pair.access_token, RevocationKind::Logout)
        .await
        .unwrap();
    stack
        .tokens
        .revoke_for(&pair.refresh_token, RevocationKind::ExplicitRevoke)
        .await
        .unwrap();

    let err = stack.gate.authorize(Some(&header), None).await.unwrap_err();
    assert_eq!(err, DomainError::Token(TokenError::TokenRevoked));

    let err = stack.tokens.refresh(&pair.refresh_token).await.unwrap_err();
    assert_eq!(err, DomainError::Token(TokenError::TokenRevoked));
}

#[tokio::test]
async fn user_token_is_refused_by_admin_gate() {
    let stack = stack().await;
    let token = stack.tokens.issue_access_token(7, Role::User).unwrap();

    let err = stack
        .gate
        .authorize(Some(&format!("Bearer {token}")), Some(Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::RoleMismatch { .. })));
}

#[tokio::test]
async fn rotation_keeps_old_tokens_valid() {
    let stack = stack().await;
    let old = stack.tokens.issue_access_token(1, Role::User).unwrap();

    stack.source.rotate();
    stack.keys.refresh().await.unwrap();
    assert_eq!(stack.keys.active_kid(), "2024-02");

    assert!(stack.tokens.verify(&old, Scope::Authentication).await.is_ok());
}

#[tokio::test]
async fn source_outage_does_not_interrupt_service() {
    let stack = stack().await;
    *stack.source.down.lock().unwrap() = true;

    assert!(stack.keys.refresh().await.is_err());
    assert!(stack.keys.last_refresh_error().is_some());

    let token = stack.tokens.issue_access_token(1, Role::User).unwrap();
    assert!(stack
        .gate
        .authorize(Some(&format!("Bearer {token}")), None)
        .await
        .is_ok());
}

#[tokio::test]
async fn revocation_ttl_outlives_token() {
    let stack = stack().await;

    assert!(stack.tokens.revocation_ttl_for(RevocationKind::Logout) >= Duration::from_secs(15 * 60));
    assert!(
        stack.tokens.revocation_ttl_for(RevocationKind::ExplicitRevoke)
            >= Duration::from_secs(7 * 24 * 3600)
    );
}
