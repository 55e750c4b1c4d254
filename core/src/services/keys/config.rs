//! Configuration for the key manager

use std::time::Duration;

use tw_shared::config::KeyConfig;

/// Refresh cadence and source timeout for the key manager
#[derive(Debug, Clone)]
pub struct KeyManagerConfig {
    /// Time between scheduled refreshes
    pub refresh_interval: Duration,
    /// Delay before the single retry after a failed refresh
    pub retry_backoff: Duration,
    /// Upper bound for one complete fetch from the secret source
    pub source_timeout: Duration,
}

impl Default for KeyManagerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(3600), // 1 hour
            retry_backoff: Duration::from_secs(60),      // 1 minute
            source_timeout: Duration::from_secs(3),
        }
    }
}

impl From<&KeyConfig> for KeyManagerConfig {
    fn from(config: &KeyConfig) -> Self {
        Self {
            refresh_interval: Duration::from_secs(config.refresh_interval),
            retry_backoff: Duration::from_secs(config.refresh_retry_backoff),
            source_timeout: Duration::from_secs(config.source_timeout),
        }
    }
}

impl KeyManagerConfig {
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }
}
