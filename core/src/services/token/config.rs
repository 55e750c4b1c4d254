//! Configuration for the token service

use chrono::Duration;
use tracing::warn;

use tw_shared::config::JwtConfig;

use crate::domain::entities::token::{ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS};

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Upper bound for one revocation store round-trip
    pub revocation_timeout: std::time::Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
            refresh_token_ttl: Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
            revocation_timeout: std::time::Duration::from_secs(3),
        }
    }
}

/// Converts a configured lifetime in seconds, or `None` when out of range
fn ttl_from_seconds(seconds: u64) -> Option<Duration> {
    i64::try_from(seconds).ok().and_then(Duration::try_seconds)
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        let defaults = Self::default();

        let access_token_ttl = ttl_from_seconds(config.access_token_expiry).unwrap_or_else(|| {
            warn!(
                seconds = config.access_token_expiry,
                "Access token expiry out of range, using default"
            );
            defaults.access_token_ttl
        });
        let refresh_token_ttl = ttl_from_seconds(config.refresh_token_expiry).unwrap_or_else(|| {
            warn!(
                seconds = config.refresh_token_expiry,
                "Refresh token expiry out of range, using default"
            );
            defaults.refresh_token_ttl
        });

        Self {
            access_token_ttl,
            refresh_token_ttl,
            ..defaults
        }
    }
}

impl TokenServiceConfig {
    pub fn with_revocation_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.revocation_timeout = timeout;
        self
    }
}
