//! Credential validation collaborator used at login

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::token::Role;
use crate::errors::DomainError;

/// Outcome of an email/password check performed by the user service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCheck {
    pub valid: bool,
    #[serde(default)]
    pub subject_id: i64,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

impl CredentialCheck {
    pub fn accepted(subject_id: i64, role: Role) -> Self {
        Self {
            valid: true,
            subject_id,
            role,
        }
    }

    pub fn rejected() -> Self {
        Self {
            valid: false,
            subject_id: 0,
            role: Role::User,
        }
    }
}

/// Remote "is this email/password valid" check
///
/// Implementations return `DependencyUnavailable` when the user service
/// cannot be reached; a wrong password is `Ok` with `valid == false`.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, email: &str, password: &str) -> Result<CredentialCheck, DomainError>;
}
