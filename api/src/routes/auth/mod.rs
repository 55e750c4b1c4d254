//! Authentication route handlers
//!
//! - Login (credential check and token pair issuance)
//! - Access token refresh
//! - Token validation
//! - Explicit revocation
//! - Logout

pub mod login;
pub mod logout;
pub mod refresh;
pub mod revoke;
pub mod validate;

use std::sync::Arc;

use tw_core::services::authorization::AuthorizationGate;
use tw_core::services::credentials::CredentialValidator;
use tw_core::services::token::TokenService;

use tw_shared::config::CorsConfig;

use crate::config::ErrorConfig;

/// Application state that holds shared services
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub gate: Arc<AuthorizationGate>,
    pub credentials: Arc<dyn CredentialValidator>,
    pub errors: ErrorConfig,
    pub cors: CorsConfig,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        credentials: Arc<dyn CredentialValidator>,
        errors: ErrorConfig,
    ) -> Self {
        let gate = Arc::new(AuthorizationGate::new(Arc::clone(&tokens)));
        Self {
            tokens,
            gate,
            credentials,
            errors,
            cors: CorsConfig::default(),
        }
    }

    /// Replace the default CORS settings
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }
}
