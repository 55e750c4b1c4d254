//! HTTP client for the user service's credential check

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use tw_core::domain::entities::token::Role;
use tw_core::errors::DomainError;
use tw_core::services::credentials::{CredentialCheck, CredentialValidator};
use tw_shared::config::CredentialServiceConfig;

use crate::InfrastructureError;

const USER_SERVICE: &str = "user service";

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    is_valid: bool,
    #[serde(default)]
    user_id: i64,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    message: Option<String>,
}

impl From<ValidateResponse> for CredentialCheck {
    fn from(response: ValidateResponse) -> Self {
        if response.is_valid {
            CredentialCheck::accepted(response.user_id, response.role.unwrap_or(Role::User))
        } else {
            CredentialCheck::rejected()
        }
    }
}

/// [`CredentialValidator`] calling `POST {base_url}/validate`
///
/// `401`/`400`/`404` answers mean "wrong credentials"; transport errors,
/// timeouts and `5xx` answers mean the user service is unavailable.
#[derive(Debug, Clone)]
pub struct HttpCredentialValidator {
    http_client: reqwest::Client,
    validate_url: String,
}

impl HttpCredentialValidator {
    pub fn new(config: &CredentialServiceConfig) -> Result<Self, InfrastructureError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout.max(1)))
            .build()?;

        Ok(Self::with_client(http_client, config.validate_url()))
    }

    pub fn with_client(http_client: reqwest::Client, validate_url: impl Into<String>) -> Self {
        Self {
            http_client,
            validate_url: validate_url.into(),
        }
    }
}

#[async_trait]
impl CredentialValidator for HttpCredentialValidator {
    async fn validate(&self, email: &str, password: &str) -> Result<CredentialCheck, DomainError> {
        let response = self
            .http_client
            .post(&self.validate_url)
            .json(&ValidateRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "User service request failed");
                DomainError::dependency_unavailable(USER_SERVICE)
            })?;

        let status = response.status();
        if matches!(
            status,
            reqwest::StatusCode::UNAUTHORIZED
                | reqwest::StatusCode::BAD_REQUEST
                | reqwest::StatusCode::NOT_FOUND
        ) {
            debug!(status = %status, "User service rejected credentials");
            return Ok(CredentialCheck::rejected());
        }
        if !status.is_success() {
            warn!(status = %status, "User service returned an error status");
            return Err(DomainError::dependency_unavailable(USER_SERVICE));
        }

        let body: ValidateResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Unreadable user service response");
            DomainError::dependency_unavailable(USER_SERVICE)
        })?;

        if !body.is_valid {
            debug!(message = body.message.as_deref().unwrap_or(""), "Credentials rejected");
        }
        Ok(body.into())
    }
}
