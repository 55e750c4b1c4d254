//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - RS256 access and refresh token issuance
//! - Ordered verification (revocation, key, signature, expiry, scope)
//! - Refresh-token to access-token exchange
//! - Revocation by token fingerprint

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::TokenService;
