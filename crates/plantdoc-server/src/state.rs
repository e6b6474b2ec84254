//! Application State

use std::path::Path;
use std::sync::Arc;

use tower_http::services::{ServeDir, ServeFile};

use crate::config::{ServerConfig, Upstream};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Client used for forwarded requests (certificate checks disabled)
    pub client: reqwest::Client,

    /// Inference service behind `/predict`
    pub upstream: Arc<Upstream>,

    /// Frontend bundle; unknown paths fall back to `index.html`
    pub static_files: ServeDir<ServeFile>,

    /// Request body limit for forwarded requests
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;

        let static_dir = Path::new(&config.static_dir);
        let static_files =
            ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

        Ok(Self {
            client,
            upstream: Arc::new(config.upstream.clone()),
            static_files,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}
