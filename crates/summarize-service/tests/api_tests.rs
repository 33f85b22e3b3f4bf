// ---------------------------------------------------------------------------
// Integration tests for the analysis service routes
// ---------------------------------------------------------------------------

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

use summarize_service::{build_router, AppState, Engine};
use summarizer_core::{parse_host_document, SummarizeResponse};

fn app() -> axum::Router {
    build_router(Arc::new(AppState::new(Engine::mock(Duration::ZERO))))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, 4 * 1024 * 1024).await.unwrap().to_vec()
}

async fn parse_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_mock_mode() {
    let resp = app().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = parse_json(resp.into_body()).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["mode"], "Mock");
    assert_eq!(json["model"], "gpt-4o-mini");
}

#[tokio::test]
async fn health_reports_configured_model() {
    let mut state = AppState::new(Engine::mock(Duration::ZERO));
    state.model = "gpt-4.1".into();
    let resp = build_router(Arc::new(state))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = parse_json(resp.into_body()).await;
    assert_eq!(json["model"], "gpt-4.1");
}

// ---------------------------------------------------------------------------
// Summarize
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summarize_returns_items_in_request_order() {
    let body = r#"{"hosts":[{"ip":"10.0.0.1","ports":[22]},{"hostname":"db.internal","ports":[5432]},{"misc":true}]}"#;
    let resp = app().oneshot(post_json("/summarize", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let parsed: SummarizeResponse = serde_json::from_slice(&body_bytes(resp.into_body()).await).unwrap();
    let ids: Vec<_> = parsed.items.iter().map(|s| s.host_id.as_str()).collect();
    assert_eq!(ids, vec!["10.0.0.1", "db.internal", "unknown"]);
    assert!(parsed.items[1].recommendations[0].starts_with("URGENT"));
}

#[tokio::test]
async fn empty_host_list_is_rejected_with_detail() {
    let resp = app().oneshot(post_json("/summarize", r#"{"hosts":[]}"#)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = parse_json(resp.into_body()).await;
    assert_eq!(json["detail"], "No hosts provided");
}

#[tokio::test]
async fn malformed_body_is_unprocessable() {
    for body in ["{not json", r#"{"items":[]}"#, r#"{"hosts":[1,2]}"#] {
        let resp = app().oneshot(post_json("/summarize", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        let json = parse_json(resp.into_body()).await;
        assert!(json["detail"].as_str().is_some_and(|d| !d.is_empty()));
    }
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let mut state = AppState::new(Engine::mock(Duration::ZERO));
    state.body_limit = 64;
    let app = build_router(Arc::new(state));
    let hosts: Vec<String> = (0..20).map(|i| format!(r#"{{"ip":"10.0.0.{i}"}}"#)).collect();
    let body = format!(r#"{{"hosts":[{}]}}"#, hosts.join(","));
    let resp = app.oneshot(post_json("/summarize", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ---------------------------------------------------------------------------
// Sample dataset + CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bundled_dataset_is_a_host_document() {
    let resp = app()
        .oneshot(Request::get("/hosts_dataset.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let text = String::from_utf8(body_bytes(resp.into_body()).await).unwrap();
    let hosts = parse_host_document(&text).unwrap();
    assert!(hosts.len() >= 3);
}

#[tokio::test]
async fn preflight_from_dev_origin_is_allowed() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/summarize")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}
