//! Prediction Response Model
//!
//! Wire shape of the `/predict` response and the result the controller keeps.

use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, Result};
use crate::label::{format_confidence, format_label, HealthStatus, LabelParts};

/// JSON body returned by the inference endpoint
///
/// Current servers send `prediction`; older ones put the label in `data`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub prediction: Option<String>,

    /// Legacy label field
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub image_url: Option<String>,

    /// `"success"` on current servers; informational only
    #[serde(default)]
    pub status: Option<String>,
}

impl PredictionResponse {
    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| ClassifyError::Decode(e.to_string()))
    }

    /// Resolve the label, preferring `prediction` over `data`
    pub fn label(&self) -> Option<&str> {
        self.prediction.as_deref().or(self.data.as_deref())
    }

    pub fn into_result(self) -> Result<ClassificationResult> {
        let label = match (self.prediction, self.data) {
            (Some(prediction), _) => prediction,
            (None, Some(data)) => data,
            (None, None) => return Err(ClassifyError::MissingPrediction),
        };

        Ok(ClassificationResult {
            label,
            confidence: self.confidence,
            image_url: self.image_url,
        })
    }
}

/// A successful classification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Raw classifier label (e.g. `Tomato___Late_blight`)
    pub label: String,
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: None,
            image_url: None,
        }
    }

    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn display_label(&self) -> String {
        format_label(&self.label)
    }

    pub fn parts(&self) -> LabelParts {
        LabelParts::parse(&self.label)
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus::from_label(&self.label)
    }

    pub fn is_healthy(&self) -> bool {
        self.health() == HealthStatus::Healthy
    }

    pub fn confidence_text(&self) -> Option<String> {
        self.confidence.map(format_confidence)
    }
}
