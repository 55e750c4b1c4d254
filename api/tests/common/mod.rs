//! Shared setup for HTTP tests

#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tw_api::config::ErrorConfig;
use tw_api::routes::AppState;
use tw_core::domain::entities::token::Role;
use tw_core::errors::DomainError;
use tw_core::services::credentials::{CredentialCheck, CredentialValidator};
use tw_core::testutil::TestHarness;
use tw_shared::config::CorsConfig;

pub const USER_EMAIL: &str = "ada@example.com";
pub const ADMIN_EMAIL: &str = "root@example.com";
pub const PASSWORD: &str = "correct horse";

/// User service stand-in with two accounts
#[derive(Default)]
pub struct StubCredentials {
    unavailable: AtomicBool,
}

impl StubCredentials {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialValidator for StubCredentials {
    async fn validate(&self, email: &str, password: &str) -> Result<CredentialCheck, DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::dependency_unavailable("user service"));
        }
        Ok(match (email, password) {
            (USER_EMAIL, PASSWORD) => CredentialCheck::accepted(17, Role::User),
            (ADMIN_EMAIL, PASSWORD) => CredentialCheck::accepted(1, Role::Admin),
            _ => CredentialCheck::rejected(),
        })
    }
}

pub struct TestApp {
    pub harness: TestHarness,
    pub credentials: Arc<StubCredentials>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(ErrorConfig::default(), CorsConfig::default()).await
    }

    pub async fn verbose() -> Self {
        Self::build(ErrorConfig::verbose(), CorsConfig::default()).await
    }

    pub async fn with_cors(cors: CorsConfig) -> Self {
        Self::build(ErrorConfig::default(), cors).await
    }

    async fn build(errors: ErrorConfig, cors: CorsConfig) -> Self {
        let harness = TestHarness::new().await;
        let credentials = Arc::new(StubCredentials::default());
        let state = web::Data::new(
            AppState::new(Arc::clone(&harness.tokens), credentials.clone(), errors)
                .with_cors(cors),
        );

        Self {
            harness,
            credentials,
            state,
        }
    }

    pub fn access_token(&self, subject_id: i64, role: Role) -> String {
        self.harness
            .tokens
            .issue_access_token(subject_id, role)
            .unwrap()
    }

    pub fn refresh_token(&self, subject_id: i64, role: Role) -> String {
        self.harness
            .tokens
            .issue_refresh_token(subject_id, role)
            .unwrap()
    }
}
