//! Integration tests for cross-origin handling

mod common;

use actix_web::{http::header, http::StatusCode, test};
use serde_json::json;

use common::{TestApp, PASSWORD, USER_EMAIL};
use tw_api::app::create_app;
use tw_shared::config::CorsConfig;

#[actix_web::test]
async fn test_preflight_allows_authorization_header() {
    let ctx = TestApp::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/auth/validate")
        .insert_header((header::ORIGIN, "https://frontend.example.com"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://frontend.example.com"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "300");
}

#[actix_web::test]
async fn test_simple_request_echoes_origin() {
    let ctx = TestApp::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .insert_header((header::ORIGIN, "http://localhost:3000"))
        .set_json(json!({ "email": USER_EMAIL, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
}

#[actix_web::test]
async fn test_unlisted_origin_gets_no_cors_headers() {
    let cors = CorsConfig::default().with_origins(["https://app.example.com"]);
    let ctx = TestApp::with_cors(cors).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/ping")
        .insert_header((header::ORIGIN, "https://evil.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());

    let req = test::TestRequest::get()
        .uri("/ping")
        .insert_header((header::ORIGIN, "https://app.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://app.example.com"
    );
}

#[actix_web::test]
async fn test_disabled_cors_adds_no_headers() {
    let cors = CorsConfig {
        enabled: false,
        ..CorsConfig::default()
    };
    let ctx = TestApp::with_cors(cors).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/ping")
        .insert_header((header::ORIGIN, "https://frontend.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
