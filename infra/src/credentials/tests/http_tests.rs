//! HTTP credential validator tests against a mock user service

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tw_core::domain::entities::token::Role;
use tw_core::services::credentials::{CredentialCheck, CredentialValidator};
use tw_shared::config::CredentialServiceConfig;

use crate::credentials::HttpCredentialValidator;

fn validator(server: &MockServer) -> HttpCredentialValidator {
    HttpCredentialValidator::new(&CredentialServiceConfig {
        base_url: server.uri(),
        timeout: 1,
    })
    .unwrap()
}

#[tokio::test]
async fn test_valid_credentials_return_subject_and_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_valid": true,
            "user_id": 17,
            "role": "admin",
            "message": "ok"
        })))
        .mount(&server)
        .await;

    let check = validator(&server).validate("ada@example.com", "s3cret").await.unwrap();
    assert_eq!(check, CredentialCheck::accepted(17, Role::Admin));
}

#[tokio::test]
async fn test_missing_role_defaults_to_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "is_valid": true, "user_id": 3 })),
        )
        .mount(&server)
        .await;

    let check = validator(&server).validate("a@b.c", "pw").await.unwrap();
    assert_eq!(check.role, Role::User);
    assert_eq!(check.subject_id, 3);
}

#[tokio::test]
async fn test_invalid_credentials_are_rejected_not_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_valid": false,
            "message": "invalid password"
        })))
        .mount(&server)
        .await;

    let check = validator(&server).validate("a@b.c", "wrong").await.unwrap();
    assert!(!check.valid);
}

#[tokio::test]
async fn test_unauthorized_status_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let check = validator(&server).validate("a@b.c", "wrong").await.unwrap();
    assert_eq!(check, CredentialCheck::rejected());
}

#[tokio::test]
async fn test_server_error_is_dependency_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let error = validator(&server).validate("a@b.c", "pw").await.unwrap_err();
    assert!(error.is_dependency_failure());
}

#[tokio::test]
async fn test_slow_user_service_is_dependency_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "is_valid": true, "user_id": 1 }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let error = validator(&server).validate("a@b.c", "pw").await.unwrap_err();
    assert!(error.is_dependency_failure());
}

#[tokio::test]
async fn test_unreachable_user_service_is_dependency_unavailable() {
    let validator = HttpCredentialValidator::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:1/validate",
    );

    let error = validator.validate("a@b.c", "pw").await.unwrap_err();
    assert!(error.is_dependency_failure());
}
