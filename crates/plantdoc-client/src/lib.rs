//! # plantdoc-client
//!
//! HTTP implementation of [`plantdoc_core::Classifier`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plantdoc_client::HttpClassifier;
//! use plantdoc_core::Controller;
//!
//! let classifier = HttpClassifier::new("http://localhost:3000")?;
//! let mut controller = Controller::new();
//! controller.select_file(file, make_preview)?;
//! controller.submit(&classifier).await;
//! ```

pub mod http;

pub use http::{ClientConfig, HttpClassifier, BuildError, IMAGE_FIELD, PREDICT_PATH};

// Re-export core types for convenience
pub use plantdoc_core::{
    ClassificationResult, Classifier, ClassifyError, Controller, ImageFile, Phase, Result,
};
