//! HTTP Classifier
//!
//! Sends the selected image to `POST {base_url}/predict` as
//! `multipart/form-data` with a single `img` part.

use std::time::Duration;

use async_trait::async_trait;
use plantdoc_core::{
    ClassificationResult, Classifier, ClassifyError, ImageFile, PredictionResponse, Result,
};
use reqwest::{
    header::ACCEPT,
    multipart::{Form, Part},
    Client,
};
use thiserror::Error;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "img";

/// Inference endpoint path
pub const PREDICT_PATH: &str = "/predict";

/// Failure to construct the underlying HTTP client
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid base URL: {0:?}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP classifier configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Scheme and authority the `/predict` path is appended to
    pub base_url: String,

    /// Whole-request timeout; `None` waits indefinitely.
    /// Ignored on wasm32, where the browser owns timeouts.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            timeout: None,
        }
    }
}

/// `Classifier` backed by the `/predict` endpoint
pub struct HttpClassifier {
    client: Client,
    config: ClientConfig,
}

impl HttpClassifier {
    /// Create a classifier for the given origin
    pub fn new(base_url: impl Into<String>) -> std::result::Result<Self, BuildError> {
        Self::from_config(ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: ClientConfig) -> std::result::Result<Self, BuildError> {
        let base = config.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(BuildError::InvalidBaseUrl(config.base_url));
        }

        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }

    /// Full URL of the inference endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim().trim_end_matches('/'),
            PREDICT_PATH
        )
    }

    fn build_form(image: &ImageFile) -> Result<Form> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| {
                tracing::warn!(mime_type = %image.mime_type, error = %e, "Unparsable media type");
                ClassifyError::InvalidFileType(image.mime_type.clone())
            })?;

        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(config: &ClientConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

#[cfg(target_arch = "wasm32")]
fn build_client(_config: &ClientConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder().build()
}

fn transport_error(err: &reqwest::Error) -> ClassifyError {
    if err.is_timeout() {
        ClassifyError::Timeout
    } else {
        ClassifyError::Transport(err.to_string())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &ImageFile) -> Result<ClassificationResult> {
        let form = Self::build_form(image)?;
        let url = self.endpoint();

        tracing::debug!(%url, file = %image.name, size = image.len(), "POST predict");

        // The backend renders HTML unless the request accepts JSON
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Inference endpoint returned error status");
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| transport_error(&e))?;

        PredictionResponse::from_slice(&body)?.into_result()
    }

    fn name(&self) -> &str {
        "HttpClassifier"
    }
}
