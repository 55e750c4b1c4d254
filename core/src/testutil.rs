//! Shared test utilities for TokenWarden crates
//!
//! Enabled for this crate's own tests and, through the `testutil` feature,
//! for the dev-dependencies of `tw_infra` and `tw_api`.
//!
//! - [`InMemorySecretSource`]: mutable key source with outage simulation
//! - RSA fixture PEMs for two key pairs (`primary`, `rotated`)
//! - Builders for a ready-to-use [`KeyManager`] and [`TokenService`]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::keys::SigningKeyPem;
use crate::errors::KeyError;
use crate::services::keys::{KeyManager, KeyManagerConfig, SecretSource};
use crate::services::token::{TokenService, TokenServiceConfig};

pub use crate::repositories::revocation::InMemoryRevocationStore;
pub use crate::services::clock::ManualClock;

pub const PRIMARY_KID: &str = "primary";
pub const ROTATED_KID: &str = "rotated";

pub const PRIMARY_PRIVATE_PEM: &str = include_str!("../tests/fixtures/primary_private.pem");
pub const PRIMARY_PUBLIC_PEM: &str = include_str!("../tests/fixtures/primary_public.pem");
pub const ROTATED_PRIVATE_PEM: &str = include_str!("../tests/fixtures/rotated_private.pem");
pub const ROTATED_PUBLIC_PEM: &str = include_str!("../tests/fixtures/rotated_public.pem");

/// Fixed instant used by deterministic tests
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

#[derive(Debug, Clone)]
struct SourceState {
    signing_key: SigningKeyPem,
    public_keys: HashMap<String, String>,
}

/// Secret source held entirely in memory
///
/// Tests rotate keys by mutating it between `KeyManager::refresh` calls.
pub struct InMemorySecretSource {
    state: Mutex<SourceState>,
    unavailable: AtomicBool,
    delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

impl InMemorySecretSource {
    pub fn new(
        kid: impl Into<String>,
        private_key_pem: impl Into<String>,
        public_keys: HashMap<String, String>,
    ) -> Self {
        Self {
            state: Mutex::new(SourceState {
                signing_key: SigningKeyPem {
                    kid: kid.into(),
                    private_key_pem: private_key_pem.into(),
                },
                public_keys,
            }),
            unavailable: AtomicBool::new(false),
            delay: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Source signing with `primary` and publishing only its public key
    pub fn primary() -> Self {
        let mut public_keys = HashMap::new();
        public_keys.insert(PRIMARY_KID.to_string(), PRIMARY_PUBLIC_PEM.to_string());
        Self::new(PRIMARY_KID, PRIMARY_PRIVATE_PEM, public_keys)
    }

    /// Make `rotated` the active key while still publishing `primary`
    pub fn rotate_to_secondary(&self) {
        self.insert_public_key(ROTATED_KID, ROTATED_PUBLIC_PEM);
        self.set_signing_key(ROTATED_KID, ROTATED_PRIVATE_PEM);
    }

    pub fn set_signing_key(&self, kid: impl Into<String>, private_key_pem: impl Into<String>) {
        self.state.lock().signing_key = SigningKeyPem {
            kid: kid.into(),
            private_key_pem: private_key_pem.into(),
        };
    }

    pub fn insert_public_key(&self, kid: impl Into<String>, pem: impl Into<String>) {
        self.state.lock().public_keys.insert(kid.into(), pem.into());
    }

    pub fn remove_public_key(&self, kid: &str) {
        self.state.lock().public_keys.remove(kid);
    }

    /// Every read fails with `SourceUnavailable` while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Every read sleeps for `delay` first
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Number of signing key reads so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn before_read(&self) -> Result<(), KeyError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(KeyError::SourceUnavailable {
                message: "in-memory source marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SecretSource for InMemorySecretSource {
    async fn read_signing_key(&self) -> Result<SigningKeyPem, KeyError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.before_read().await?;
        Ok(self.state.lock().signing_key.clone())
    }

    async fn read_public_keys(&self) -> Result<HashMap<String, String>, KeyError> {
        self.before_read().await?;
        Ok(self.state.lock().public_keys.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Key manager over `source` with default timings
pub async fn key_manager(source: Arc<InMemorySecretSource>) -> Arc<KeyManager> {
    match KeyManager::initialize(source, KeyManagerConfig::default()).await {
        Ok(manager) => Arc::new(manager),
        Err(e) => panic!("fixture keys failed to load: {}", e),
    }
}

/// Everything a token test needs, wired together
pub struct TestHarness {
    pub source: Arc<InMemorySecretSource>,
    pub keys: Arc<KeyManager>,
    pub revocations: Arc<InMemoryRevocationStore>,
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<TokenService>,
}

impl TestHarness {
    /// Harness on the `primary` key with the clock at [`fixed_now`]
    pub async fn new() -> Self {
        Self::with_clock(Arc::new(ManualClock::new(fixed_now()))).await
    }

    pub async fn with_clock(clock: Arc<ManualClock>) -> Self {
        let source = Arc::new(InMemorySecretSource::primary());
        let keys = key_manager(Arc::clone(&source)).await;
        let revocations = Arc::new(InMemoryRevocationStore::new());
        let tokens = Arc::new(TokenService::new(
            Arc::clone(&keys),
            revocations.clone(),
            clock.clone(),
            TokenServiceConfig::default(),
        ));

        Self {
            source,
            keys,
            revocations,
            clock,
            tokens,
        }
    }
}
