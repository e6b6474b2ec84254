//! `/predict` Forwarding
//!
//! Every request whose path starts with `/predict` is relayed to the
//! upstream inference service: method, path, query and body unchanged,
//! `Host` and `Origin` rewritten to the upstream, hop-by-hop headers dropped
//! in both directions.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        uri::PathAndQuery,
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use plantdoc_client::PREDICT_PATH;
use serde::Serialize;
use thiserror::Error;

use crate::config::Upstream;
use crate::state::AppState;

/// Connection-scoped headers a proxy must not forward
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Request body exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Failed to build response: {0}")]
    Response(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ProxyError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Response(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Body(_) => "BAD_REQUEST_BODY",
            Self::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            Self::Response(_) => "PROXY_ERROR",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
                code: self.code().into(),
            }),
        )
            .into_response()
    }
}

/// Whether `path` belongs to the forwarded prefix
pub fn is_proxied(path: &str) -> bool {
    path.starts_with(PREDICT_PATH)
}

/// Relay one request to the upstream
pub async fn forward(state: &AppState, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    if let Some(size) = content_length(&parts.headers) {
        if size > state.max_upload_bytes as u64 {
            tracing::warn!(size, limit = state.max_upload_bytes, "Rejected oversized upload");
            return Err(ProxyError::PayloadTooLarge {
                limit: state.max_upload_bytes,
            });
        }
    }

    let path_and_query = parts.uri.path_and_query().map_or("/", PathAndQuery::as_str);
    let url = state.upstream.url_for(path_and_query);

    let body = to_bytes(body, state.max_upload_bytes)
        .await
        .map_err(|e| body_error(e, state.max_upload_bytes))?;

    tracing::debug!(method = %parts.method, %url, size = body.len(), "Forwarding to upstream");

    let upstream_response = state
        .client
        .request(parts.method, &url)
        .headers(request_headers(&parts.headers, &state.upstream))
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(%url, error = %e, "Upstream request failed");
            ProxyError::Upstream(e.to_string())
        })?;

    let status = upstream_response.status();
    let headers = response_headers(upstream_response.headers());
    let bytes = upstream_response
        .bytes()
        .await
        .map_err(|e| ProxyError::Upstream(e.to_string()))?;

    tracing::debug!(%url, status = status.as_u16(), size = bytes.len(), "Upstream responded");

    let mut response = Response::builder()
        .status(status)
        .body(Body::from(bytes))
        .map_err(|e| ProxyError::Response(e.to_string()))?;
    response.headers_mut().extend(headers);

    Ok(response)
}

/// Bodies without `Content-Length` only hit the limit while streaming
fn body_error(err: axum::Error, limit: usize) -> ProxyError {
    let err = err.into_inner();
    if err.downcast_ref::<LengthLimitError>().is_some() {
        tracing::warn!(limit, "Rejected oversized streamed upload");
        ProxyError::PayloadTooLarge { limit }
    } else {
        ProxyError::Body(err.to_string())
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in `Connection` are connection-scoped too
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in &listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Headers sent upstream
///
/// `Host` and `Content-Length` are left to the client; `Origin` is
/// rewritten to the upstream's own origin.
fn request_headers(incoming: &HeaderMap, upstream: &Upstream) -> HeaderMap {
    let mut headers = incoming.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    if headers.contains_key(header::ORIGIN) {
        if let Ok(origin) = HeaderValue::from_str(upstream.origin()) {
            headers.insert(header::ORIGIN, origin);
        }
    }

    headers
}

fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);
    headers
}
