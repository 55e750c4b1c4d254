//! In-memory key manager with atomic snapshot swap

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::keys::KeyMaterial;
use crate::errors::{KeyError, TokenError};

use super::config::KeyManagerConfig;
use super::refresh::{RefreshObserver, TracingRefreshObserver};
use super::snapshot::KeySnapshot;
use super::source::SecretSource;

/// Active private key handed to the signer
#[derive(Clone)]
pub struct ActiveSigningKey {
    pub kid: String,
    pub key: EncodingKey,
}

impl std::fmt::Debug for ActiveSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSigningKey")
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RefreshStatus {
    last_error: Option<KeyError>,
    consecutive_failures: u32,
    last_success: Option<DateTime<Utc>>,
}

/// Cache of signing and verification keys
///
/// Readers clone an `Arc<KeySnapshot>` under a read lock and never block on
/// the network. `refresh` builds a complete new snapshot off-lock and only
/// takes the write lock to swap the pointer.
pub struct KeyManager {
    source: Arc<dyn SecretSource>,
    config: KeyManagerConfig,
    snapshot: RwLock<Arc<KeySnapshot>>,
    status: Mutex<RefreshStatus>,
    refresh_lock: tokio::sync::Mutex<()>,
    observer: Arc<dyn RefreshObserver>,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .field("snapshot", &*self.snapshot.read())
            .finish()
    }
}

impl KeyManager {
    /// Loads the initial key set from `source`
    ///
    /// # Returns
    ///
    /// * `Ok(KeyManager)` - Keys loaded and validated
    /// * `Err(KeyError::InitialKeyLoadFailed)` - The process must not start
    pub async fn initialize(
        source: Arc<dyn SecretSource>,
        config: KeyManagerConfig,
    ) -> Result<Self, KeyError> {
        let snapshot = fetch_snapshot(source.as_ref(), &config)
            .await
            .map_err(|e| KeyError::InitialKeyLoadFailed {
                message: e.to_string(),
            })?;

        info!(
            source = source.name(),
            active_kid = snapshot.active_kid(),
            key_count = snapshot.len(),
            "Signing keys loaded"
        );

        Ok(Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(snapshot)),
            status: Mutex::new(RefreshStatus {
                last_success: Some(Utc::now()),
                ..Default::default()
            }),
            refresh_lock: tokio::sync::Mutex::new(()),
            observer: Arc::new(TracingRefreshObserver),
        })
    }

    /// Replaces the refresh observer (defaults to tracing only)
    pub fn with_observer(mut self, observer: Arc<dyn RefreshObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &KeyManagerConfig {
        &self.config
    }

    /// Current snapshot; stays valid even if a refresh swaps in a newer one
    pub fn snapshot(&self) -> Arc<KeySnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// The key new tokens are signed with
    pub fn active_signing_key(&self) -> ActiveSigningKey {
        let snapshot = self.snapshot();
        ActiveSigningKey {
            kid: snapshot.active_kid().to_string(),
            key: snapshot.signing_key().clone(),
        }
    }

    pub fn active_kid(&self) -> String {
        self.snapshot().active_kid().to_string()
    }

    /// Verification key for `kid`
    ///
    /// `KeyNotFound` means "cannot verify with what is loaded", which may heal
    /// after the next refresh. It is not a statement about the token.
    pub fn public_key(&self, kid: &str) -> Result<DecodingKey, TokenError> {
        self.snapshot()
            .public_key(kid)
            .cloned()
            .ok_or_else(|| TokenError::KeyNotFound {
                kid: kid.to_string(),
            })
    }

    /// Every `kid` that currently verifies
    pub fn public_keys(&self) -> Vec<String> {
        self.snapshot().kids()
    }

    pub fn last_refresh_error(&self) -> Option<KeyError> {
        self.status.lock().last_error.clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.status.lock().consecutive_failures
    }

    pub fn last_successful_refresh(&self) -> Option<DateTime<Utc>> {
        self.status.lock().last_success
    }

    /// Fetches and parses a fresh key set, then swaps it in
    ///
    /// On any failure the previous snapshot keeps serving and the error is
    /// recorded for `last_refresh_error`.
    pub async fn refresh(&self) -> Result<(), KeyError> {
        let _guard = self.refresh_lock.lock().await;

        match fetch_snapshot(self.source.as_ref(), &self.config).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let previous = {
                    let mut current = self.snapshot.write();
                    std::mem::replace(&mut *current, Arc::clone(&snapshot))
                };

                {
                    let mut status = self.status.lock();
                    status.last_error = None;
                    status.consecutive_failures = 0;
                    status.last_success = Some(snapshot.loaded_at());
                }

                if previous.active_kid() != snapshot.active_kid() {
                    info!(
                        previous_kid = previous.active_kid(),
                        active_kid = snapshot.active_kid(),
                        "Active signing key rotated"
                    );
                } else {
                    debug!(active_kid = snapshot.active_kid(), "Signing keys unchanged");
                }

                self.observer.on_refresh_success(&snapshot);
                Ok(())
            }
            Err(error) => {
                let consecutive_failures = {
                    let mut status = self.status.lock();
                    status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                    status.last_error = Some(error.clone());
                    status.consecutive_failures
                };

                warn!(
                    source = self.source.name(),
                    consecutive_failures,
                    error = %error,
                    "Key refresh failed, keeping previous snapshot"
                );

                self.observer.on_refresh_failure(&error, consecutive_failures);
                Err(error)
            }
        }
    }
}

/// One bounded round-trip to the source followed by an all-or-nothing parse
async fn fetch_snapshot(
    source: &dyn SecretSource,
    config: &KeyManagerConfig,
) -> Result<KeySnapshot, KeyError> {
    let fetch = async {
        let signing_key = source.read_signing_key().await?;
        let public_keys = source.read_public_keys().await?;
        Ok::<_, KeyError>(KeyMaterial::new(signing_key, public_keys))
    };

    let material = tokio::time::timeout(config.source_timeout, fetch)
        .await
        .map_err(|_| KeyError::Timeout {
            seconds: config.source_timeout.as_secs(),
        })??;

    KeySnapshot::from_material(&material)
}
