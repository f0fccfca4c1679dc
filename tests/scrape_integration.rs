//! Scrape integration tests
//!
//! End-to-end tests from the HTTP surface down to a mocked WANGuard API:
//! - Metrics endpoint output
//! - Behavior while the upstream is failing
//! - Custom metrics paths

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wanguard_exporter::client::{ApiClient, Target};
use wanguard_exporter::config::{CollectorsConfig, Secret};
use wanguard_exporter::exposition::formatter::CONTENT_TYPE;
use wanguard_exporter::{build_registry, server};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a mock WANGuard API with one announcement and some firewall rules
async fn create_mock_wanguard() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wanguard-api/v1/announcements"))
        .and(query_param("count", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Count": "4"}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wanguard-api/v1/announcements/4/finished"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Count": "1"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wanguard-api/v1/firewall_rules"))
        .and(query_param("count", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Count": "12"})))
        .mount(&mock_server)
        .await;

    mock_server
}

fn app_for(server: &MockServer, metrics_path: &str) -> axum::Router {
    let target = Target::new(&server.uri(), "admin", Secret::new("secret"), false).unwrap();
    let client = Arc::new(ApiClient::new(target).unwrap());
    let registry = build_registry(client, &CollectorsConfig::default()).unwrap();
    server::router(Arc::new(registry), metrics_path)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_metrics_endpoint_end_to_end() {
    let mock_server = create_mock_wanguard().await;
    let app = app_for(&mock_server, "/metrics");

    let (status, content_type, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE));
    assert!(body.contains("# TYPE wanguard_announcement_active gauge"));
    assert!(body.contains("wanguard_announcement_active{count=\"4\"} 4"));
    assert!(body.contains("wanguard_announcement_finished{count=\"4\"} 1"));
    assert!(body.contains("wanguard_firewall_rule_active 12"));
    assert!(body.contains("wanguard_exporter_scrape_duration_seconds"));
    assert!(!body.contains("secret"));
}

#[tokio::test]
async fn test_metrics_endpoint_with_upstream_failing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let app = app_for(&mock_server, "/metrics");
    let (status, _, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("wanguard_announcement_active"));
    assert!(body.contains("wanguard_exporter_build_info"));
}

#[tokio::test]
async fn test_custom_metrics_path() {
    let mock_server = create_mock_wanguard().await;

    let (status, _, body) = get(app_for(&mock_server, "/wg"), "/wg").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("wanguard_firewall_rule_active 12"));

    let (status, _, _) = get(app_for(&mock_server, "/wg"), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, _, landing) = get(app_for(&mock_server, "/wg"), "/").await;
    assert!(landing.contains("href=\"/wg\""));
}

#[tokio::test]
async fn test_health_does_not_contact_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Count": "0"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, _, body) = get(app_for(&mock_server, "/metrics"), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));
}
