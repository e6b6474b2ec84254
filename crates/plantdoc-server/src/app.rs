//! Router

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{dispatch, health_check};
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    // The frontend may be served by a separate dev server (trunk) on another port
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .fallback(dispatch)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
