//! Classifier Strategy
//!
//! The controller never talks HTTP itself. It hands the selected image to a
//! [`Classifier`]; `plantdoc-client` provides the real one and
//! [`MockClassifier`] scripts responses for tests and demos.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{ClassifyError, Result};
use crate::image::ImageFile;
use crate::prediction::{ClassificationResult, PredictionResponse};

/// Strategy trait for inference backends
///
/// One call is one request: implementations must not retry.
/// Browser futures are not `Send`, so the bound is dropped on wasm32.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Classifier: Send + Sync {
    /// Classify one image
    async fn classify(&self, image: &ImageFile) -> Result<ClassificationResult>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Scripted classifier
///
/// Replies are consumed in order; an empty script fails like a dropped
/// connection.
#[derive(Default)]
pub struct MockClassifier {
    replies: Mutex<VecDeque<Result<PredictionResponse>>>,
    received: Mutex<Vec<ImageFile>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply with the given body
    #[must_use]
    pub fn respond(self, response: PredictionResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a `{ "prediction": label }` reply
    #[must_use]
    pub fn predict(self, label: impl Into<String>) -> Self {
        self.respond(PredictionResponse {
            prediction: Some(label.into()),
            ..Default::default()
        })
    }

    /// Queue a failing reply
    #[must_use]
    pub fn fail(self, error: ClassifyError) -> Self {
        self.push(Err(error));
        self
    }

    /// Number of `classify` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Images received, in call order
    pub fn received(&self) -> Vec<ImageFile> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, reply: Result<PredictionResponse>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Classifier for MockClassifier {
    async fn classify(&self, image: &ImageFile) -> Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(image.clone());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(ClassifyError::Transport("no scripted reply".into())));

        reply?.into_result()
    }

    fn name(&self) -> &str {
        "MockClassifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replies_in_order() {
        let classifier = MockClassifier::new()
            .predict("Apple___healthy")
            .fail(ClassifyError::Status(500));
        let image = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);

        let first = classifier.classify(&image).await.unwrap();
        assert_eq!(first.label, "Apple___healthy");

        let second = classifier.classify(&image).await;
        assert!(matches!(second, Err(ClassifyError::Status(500))));

        let third = classifier.classify(&image).await;
        assert!(matches!(third, Err(ClassifyError::Transport(_))));

        assert_eq!(classifier.calls(), 3);
        assert_eq!(classifier.received()[0].name, "a.png");
        assert_eq!(classifier.name(), "MockClassifier");
    }

    #[tokio::test]
    async fn test_mock_applies_legacy_fallback() {
        let classifier = MockClassifier::new().respond(PredictionResponse {
            data: Some("Potato___healthy".into()),
            ..Default::default()
        });
        let image = ImageFile::new("p.jpg", "image/jpeg", vec![0]);

        let result = classifier.classify(&image).await.unwrap();
        assert_eq!(result.label, "Potato___healthy");
    }
}
