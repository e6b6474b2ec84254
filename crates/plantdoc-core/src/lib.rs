//! # plantdoc-core
//!
//! Rendering-independent core of the plantdoc client: the upload-and-classify
//! state machine, label formatting and the classifier abstraction.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Controller                            │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ SelectedImage│  │  Submission  │──│    Classifier      │  │
//! │  │  + preview   │  │   (ticket)   │  │    (Strategy)      │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! │           │                                   │              │
//! │           └────────── Snapshot (watch) ◀──────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The presentation layer (Leptos in `plantdoc-web`) only calls
//! `select_file`, `begin_submission`/`resolve` and reads snapshots, so the
//! whole flow can be exercised in plain unit tests with [`MockClassifier`].

pub mod classifier;
pub mod controller;
pub mod error;
pub mod image;
pub mod label;
pub mod prediction;

pub use classifier::{Classifier, MockClassifier};
pub use controller::{Controller, Phase, RequestState, Snapshot, Submission, SubmissionId};
pub use error::{ClassifyError, Result};
pub use image::{ImageFile, PreviewHandle, SelectedImage};
pub use label::{format_confidence, format_label, is_healthy, HealthStatus, LabelParts};
pub use prediction::{ClassificationResult, PredictionResponse};
