//! API Client

use plantdoc_client::HttpClassifier;
use plantdoc_core::{ClassificationResult, Classifier, ClassifyError, ImageFile, Result};

/// Origin the page was served from; the dev server forwards `/predict`
fn page_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into())
}

/// Classify one image against the page's own `/predict`
pub async fn classify(image: &ImageFile) -> Result<ClassificationResult> {
    let classifier =
        HttpClassifier::new(page_origin()).map_err(|e| ClassifyError::Transport(e.to_string()))?;
    classifier.classify(image).await
}
