//! HTTP request handlers
//!
//! Contains handlers for all HTTP endpoints.

use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument};

use super::AppState;
use crate::exposition::formatter::CONTENT_TYPE;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health status
    status: String,
    /// Application version
    version: String,
}

/// Landing page linking to the metrics path
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let html = format!(
        r#"<html>
<head><title>WANGuard Exporter</title></head>
<body>
<h1>WANGuard Exporter</h1>
<p>Version: {}</p>
<p><a href="{}">Metrics</a></p>
</body>
</html>
"#,
        env!("CARGO_PKG_VERSION"),
        html_escape(&state.metrics_path)
    );
    Html(html)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Metrics endpoint
///
/// Always answers 200: upstream failures only shrink the sample set.
#[instrument(skip(state), name = "metrics_handler")]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let output = state.registry.gather().await;

    debug!(
        duration_ms = start.elapsed().as_millis() as u64,
        bytes = output.len(),
        "Metrics collection complete"
    );

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], output)
}
