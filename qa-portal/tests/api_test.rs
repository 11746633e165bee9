mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, Keys, TestApp, SECONDARY_KEY, USERNAME};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn(Keys::NONE).await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn metrics_are_exposed_without_login() {
    let app = TestApp::spawn(Keys::NONE).await;
    app.get("/health").await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("http_requests_total"));
}

#[tokio::test]
async fn chat_greets_signed_in_user() {
    let mut app = TestApp::spawn(Keys::NONE).await;
    app.login().await;

    let response = app.post_json("/chat", json!({"message": "Hello there"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let reply = body_json(response).await["reply"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(reply.contains(USERNAME));
}

#[tokio::test]
async fn chat_never_fails_on_bad_input() {
    let mut app = TestApp::spawn(Keys::NONE).await;
    app.login().await;

    let empty = body_json(app.post_json("/chat", json!({"message": "   "})).await).await;
    let garbage = app
        .post_raw("/chat", "application/json", "not json".to_string())
        .await;
    assert_eq!(garbage.status(), StatusCode::OK);
    let garbage = body_json(garbage).await;

    assert_eq!(empty["reply"], garbage["reply"]);

    let echo = body_json(app.post_json("/chat", json!({"message": "Flaky suite"})).await).await;
    assert_eq!(echo["reply"], "(offline response) You said: Flaky suite");
}

#[tokio::test]
async fn diagnostics_reports_secondary_status_without_login() {
    let app = TestApp::spawn(Keys::BOTH).await;

    let long_body = "m".repeat(800);
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", SECONDARY_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_string(long_body))
        .expect(1)
        .mount(&app.secondary)
        .await;

    let response = app.get("/diagnostics/secondary").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.starts_with("Secondary provider status: 200"));
    assert_eq!(text.matches('m').count(), 500);
}

#[tokio::test]
async fn diagnostics_passes_through_provider_errors() {
    let app = TestApp::spawn(Keys::BOTH).await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&app.secondary)
        .await;

    let response = app.get("/diagnostics/secondary").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("status: 403"));
    assert!(text.contains("API key not valid"));
}

#[tokio::test]
async fn diagnostics_without_key_is_unavailable() {
    let app = TestApp::spawn(Keys::NONE).await;

    let response = app.get("/diagnostics/secondary").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn diagnostics_unreachable_provider_is_bad_gateway() {
    let app = TestApp::spawn_with(Keys::BOTH, |config| {
        // Nothing listens on the discard port.
        config.providers.secondary.base_url = "http://127.0.0.1:9".to_string();
    })
    .await;

    let response = app.get("/diagnostics/secondary").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Upstream provider error: secondary provider check failed"));
}

#[tokio::test]
async fn static_assets_are_served() {
    let app = TestApp::spawn(Keys::NONE).await;

    let response = app.get("/static/script.js").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/generate"));
}
