//! plantdoc Development Server
//!
//! Serves the compiled frontend and forwards `/predict` to the inference
//! service so the browser only ever talks to one origin.

mod app;
mod config;
mod handlers;
mod proxy;
mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let state = AppState::from_config(&config)?;

    // Check the inference service once so a missing backend is obvious at startup
    match handlers::check_upstream(&state).await {
        Ok(()) => tracing::info!("✓ Inference service reachable at {}", config.upstream),
        Err(e) => {
            tracing::warn!("⚠ Inference service not reachable at {}: {}", config.upstream, e);
            tracing::warn!("  /predict will answer 502 until it is up (PREDICT_UPSTREAM)");
        }
    }

    if !std::path::Path::new(&config.static_dir).join("index.html").exists() {
        tracing::warn!("⚠ No index.html in {:?} - build the frontend with trunk", config.static_dir);
    }

    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🌱 plantdoc server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  *    /predict*   - Forwarded to {}", config.upstream);
    tracing::info!("  GET  /*          - Frontend from {}", config.static_dir);
    tracing::info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
