//! Background key refresh task and refresh observability hook

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::errors::KeyError;

use super::config::KeyManagerConfig;
use super::manager::KeyManager;
use super::snapshot::KeySnapshot;

/// Receives the outcome of every refresh attempt
///
/// The key manager already logs each outcome through `tracing`; an observer
/// is for callers that also want to count or alert on them.
pub trait RefreshObserver: Send + Sync {
    fn on_refresh_success(&self, _snapshot: &KeySnapshot) {}

    fn on_refresh_failure(&self, _error: &KeyError, _consecutive_failures: u32) {}
}

/// Observer that escalates repeated failures to `error!`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRefreshObserver;

impl RefreshObserver for TracingRefreshObserver {
    fn on_refresh_failure(&self, error: &KeyError, consecutive_failures: u32) {
        if consecutive_failures >= 2 {
            error!(
                consecutive_failures,
                error = %error,
                "Signing keys are going stale, secret source keeps failing"
            );
        }
    }
}

/// Delay before the next refresh attempt
///
/// After a failed scheduled refresh the next attempt comes after
/// `retry_backoff`. After that retry, whatever its outcome, the normal
/// interval resumes.
///
/// Returns the delay and whether the next attempt is the retry.
pub fn next_refresh_delay(
    config: &KeyManagerConfig,
    succeeded: bool,
    was_retry: bool,
) -> (Duration, bool) {
    if succeeded || was_retry {
        (config.refresh_interval, false)
    } else {
        (config.retry_backoff.min(config.refresh_interval), true)
    }
}

/// Handle to the periodic refresh loop of a [`KeyManager`]
///
/// Dropping the handle cancels the loop; [`shutdown`](Self::shutdown) also
/// waits for it to finish.
pub struct KeyRefreshTask {
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl KeyRefreshTask {
    /// Starts the refresh loop
    ///
    /// The first refresh runs one full interval after spawning since the
    /// manager was just initialized.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime context.
    pub fn spawn(manager: Arc<KeyManager>) -> Self {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let config = manager.config().clone();
            let mut delay = config.refresh_interval;
            let mut is_retry = false;

            info!(
                interval_secs = config.refresh_interval.as_secs(),
                retry_backoff_secs = config.retry_backoff.as_secs(),
                "Key refresh task started"
            );

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }

                let succeeded = tokio::select! {
                    _ = token.cancelled() => break,
                    result = manager.refresh() => result.is_ok(),
                };

                (delay, is_retry) = next_refresh_delay(&config, succeeded, is_retry);
            }

            info!("Key refresh task shutting down");
        });

        Self {
            cancel_token,
            handle: Some(handle),
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// Cancels the loop and waits for it to exit
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "Key refresh task ended abnormally");
            }
        }
    }
}

impl Drop for KeyRefreshTask {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
