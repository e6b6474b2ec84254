//! HTTP Handlers

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tower::ServiceExt;

use crate::proxy;
use crate::state::AppState;

pub(crate) const UPSTREAM_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub upstream: String,
    pub upstream_reachable: bool,
}

/// Check that the inference service answers at all
///
/// Any HTTP answer counts; a refused connection or a silent peer past
/// [`UPSTREAM_CHECK_TIMEOUT`] does not.
pub(crate) async fn check_upstream(state: &AppState) -> Result<(), reqwest::Error> {
    state
        .client
        .get(state.upstream.base())
        .timeout(UPSTREAM_CHECK_TIMEOUT)
        .send()
        .await
        .map(drop)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let upstream_reachable = check_upstream(&state).await.is_ok();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        upstream: state.upstream.to_string(),
        upstream_reachable,
    })
}

/// Everything not routed explicitly: `/predict*` goes upstream, the rest is
/// the frontend bundle
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    if proxy::is_proxied(request.uri().path()) {
        return match proxy::forward(&state, request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        };
    }

    match state.static_files.clone().oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
