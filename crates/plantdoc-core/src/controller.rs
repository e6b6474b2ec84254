//! Upload-Classify Controller
//!
//! Owns the interaction state (selected file, preview, request flag, result,
//! error) and drives one classification request at a time.
//!
//! ## Flow
//!
//! ```text
//!            select_file(image/*)
//!   Idle ───────────────────────────▶ Ready ──begin_submission──▶ Submitting
//!    │                                  ▲                          │      │
//!    │ select_file(other)               │ select_file(image/*)   ok│      │err
//!    ▼                                  │                          ▼      ▼
//!  Failed ◀─────────────────────────────┴──────────────────── Succeeded  Failed
//! ```
//!
//! The network call sits between [`Controller::begin_submission`] and
//! [`Controller::resolve`], so a UI can keep the controller in a reactive
//! cell without holding a borrow across the await. Every submission carries
//! a [`SubmissionId`]; a response whose id is no longer current (the user
//! picked another file meanwhile) is dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::classifier::Classifier;
use crate::error::{ClassifyError, Result, INVALID_FILE_MESSAGE, REQUEST_FAILED_MESSAGE};
use crate::image::{ImageFile, PreviewHandle, SelectedImage};
use crate::label::HealthStatus;
use crate::prediction::ClassificationResult;

/// Monotonically increasing submission identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(u64);

impl SubmissionId {
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a request is in flight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    Submitting,
}

/// Interaction phase shown to the user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No file selected
    #[default]
    Idle,
    /// File selected, nothing in flight
    Ready,
    /// Request in flight
    Submitting,
    /// Result available
    Succeeded,
    /// Error message available
    Failed,
}

/// Ticket for one outbound request
#[derive(Clone, Debug)]
pub struct Submission {
    pub id: SubmissionId,
    pub image: ImageFile,
}

/// Rendering-independent view of the controller
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub file_name: Option<String>,
    pub preview_url: Option<String>,
    pub result: Option<ClassificationResult>,
    pub error: Option<String>,
    /// Formatted result label
    pub display_label: Option<String>,
    pub health: Option<HealthStatus>,
    pub confidence: Option<String>,
    /// Whether the analyze action is enabled
    pub can_submit: bool,
}

/// The upload-and-classify state machine
pub struct Controller {
    selected: Option<SelectedImage>,
    result: Option<ClassificationResult>,
    error: Option<String>,
    request: RequestState,
    in_flight: Option<SubmissionId>,
    next_id: u64,
    updates: watch::Sender<Snapshot>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(Snapshot::default());
        Self {
            selected: None,
            result: None,
            error: None,
            request: RequestState::Idle,
            in_flight: None,
            next_id: 1,
            updates,
        }
    }

    /// Select a file
    ///
    /// Accepts `image/*` only. `make_preview` runs for accepted files alone,
    /// so a rejected selection leaves the current preview and result alone
    /// and only sets the error. An accepted one clears result and error,
    /// releases the previous preview and supersedes any in-flight request.
    pub fn select_file<F>(&mut self, file: ImageFile, make_preview: F) -> Result<()>
    where
        F: FnOnce(&ImageFile) -> Box<dyn PreviewHandle>,
    {
        if !file.is_image() {
            tracing::warn!(
                file = %file.name,
                mime_type = %file.mime_type,
                "Rejected non-image selection"
            );
            self.error = Some(INVALID_FILE_MESSAGE.into());
            self.publish();
            return Err(ClassifyError::InvalidFileType(file.mime_type));
        }

        if let Some(id) = self.in_flight.take() {
            tracing::debug!(submission = %id, "Selection superseded in-flight submission");
            self.request = RequestState::Idle;
        }

        self.result = None;
        self.error = None;

        let preview = make_preview(&file);
        tracing::debug!(file = %file.name, size = file.len(), "Image selected");
        self.selected = Some(SelectedImage::new(file, preview));

        self.publish();
        Ok(())
    }

    /// Drop the selection and everything derived from it
    pub fn clear(&mut self) {
        self.selected = None;
        self.result = None;
        self.error = None;
        self.in_flight = None;
        self.request = RequestState::Idle;
        self.publish();
    }

    /// Start a submission
    ///
    /// Returns `None` (and changes nothing) when no file is selected or a
    /// request is already in flight.
    pub fn begin_submission(&mut self) -> Option<Submission> {
        if self.request == RequestState::Submitting {
            tracing::debug!("Submission ignored: request already in flight");
            return None;
        }

        let image = self.selected.as_ref()?.file().clone();

        let id = SubmissionId(self.next_id);
        self.next_id += 1;
        self.in_flight = Some(id);
        self.request = RequestState::Submitting;
        self.result = None;
        self.error = None;

        tracing::info!(submission = %id, file = %image.name, "Submitting image for classification");
        self.publish();

        Some(Submission { id, image })
    }

    /// Apply the outcome of a submission
    ///
    /// Returns `false` when `id` is stale; the outcome is then discarded.
    pub fn resolve(&mut self, id: SubmissionId, outcome: Result<ClassificationResult>) -> bool {
        if self.in_flight != Some(id) {
            tracing::warn!(submission = %id, "Discarding response for superseded submission");
            return false;
        }

        self.in_flight = None;
        self.request = RequestState::Idle;

        match outcome {
            Ok(result) => {
                tracing::info!(submission = %id, label = %result.label, "Classification succeeded");
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                tracing::error!(submission = %id, error = %e, "Classification request failed");
                self.result = None;
                self.error = Some(REQUEST_FAILED_MESSAGE.into());
            }
        }

        self.publish();
        true
    }

    /// Run one full submission against `classifier`
    ///
    /// A no-op without a selected file or while a request is in flight.
    pub async fn submit<C>(&mut self, classifier: &C) -> Phase
    where
        C: Classifier + ?Sized,
    {
        let Some(submission) = self.begin_submission() else {
            return self.phase();
        };

        tracing::debug!(submission = %submission.id, classifier = classifier.name(), "Classifying");

        let outcome = classifier.classify(&submission.image).await;
        self.resolve(submission.id, outcome);
        self.phase()
    }

    /// A file is selected and nothing is in flight
    pub const fn can_submit(&self) -> bool {
        self.selected.is_some() && matches!(self.request, RequestState::Idle)
    }

    pub fn phase(&self) -> Phase {
        if self.request == RequestState::Submitting {
            Phase::Submitting
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.result.is_some() {
            Phase::Succeeded
        } else if self.selected.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub const fn request_state(&self) -> RequestState {
        self.request
    }

    pub const fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight
    }

    pub const fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.selected.as_ref().map(SelectedImage::preview_url)
    }

    pub const fn result(&self) -> Option<&ClassificationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase(),
            file_name: self.selected.as_ref().map(|s| s.file().name.clone()),
            preview_url: self.preview_url().map(str::to_owned),
            result: self.result.clone(),
            error: self.error.clone(),
            display_label: self.result.as_ref().map(ClassificationResult::display_label),
            health: self.result.as_ref().map(ClassificationResult::health),
            confidence: self.result.as_ref().and_then(ClassificationResult::confidence_text),
            can_submit: self.can_submit(),
        }
    }

    /// Receive a fresh snapshot after every transition
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("phase", &self.phase())
            .field("selected", &self.selected)
            .field("result", &self.result)
            .field("error", &self.error)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::classifier::MockClassifier;
    use crate::prediction::PredictionResponse;

    struct TestPreview {
        url: String,
        released: Arc<AtomicUsize>,
    }

    impl PreviewHandle for TestPreview {
        fn url(&self) -> &str {
            &self.url
        }
    }

    impl Drop for TestPreview {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Preview factory counting creations and releases
    #[derive(Clone, Default)]
    struct Previews {
        created: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl Previews {
        fn factory(&self) -> impl FnOnce(&ImageFile) -> Box<dyn PreviewHandle> {
            let created = self.created.clone();
            let released = self.released.clone();
            move |file: &ImageFile| {
                created.fetch_add(1, Ordering::SeqCst);
                Box::new(TestPreview {
                    url: format!("blob:{}", file.name),
                    released,
                }) as Box<dyn PreviewHandle>
            }
        }

        fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }

        fn released(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }
    }

    fn leaf(name: &str) -> ImageFile {
        ImageFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
    }

    fn pdf() -> ImageFile {
        ImageFile::new("report.pdf", "application/pdf", vec![0x25, 0x50])
    }

    #[test]
    fn test_initial_state() {
        let controller = Controller::new();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.request_state(), RequestState::Idle);
        assert!(controller.preview_url().is_none());
        assert_eq!(controller.snapshot(), Snapshot::default());
    }

    #[test]
    fn test_select_image() {
        let previews = Previews::default();
        let mut controller = Controller::new();

        controller.select_file(leaf("leaf.jpg"), previews.factory()).unwrap();

        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(controller.preview_url(), Some("blob:leaf.jpg"));
        assert_eq!(previews.created(), 1);
        assert!(controller.result().is_none());
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_select_non_image() {
        let previews = Previews::default();
        let mut controller = Controller::new();

        let err = controller.select_file(pdf(), previews.factory()).unwrap_err();

        assert!(matches!(err, ClassifyError::InvalidFileType(ref m) if m == "application/pdf"));
        assert_eq!(controller.phase(), Phase::Failed);
        assert_eq!(controller.error(), Some("Please select a valid image file."));
        assert_eq!(previews.created(), 0);
        assert!(controller.selected().is_none());
    }

    #[tokio::test]
    async fn test_non_image_keeps_result_and_preview() {
        let previews = Previews::default();
        let classifier = MockClassifier::new().predict("Apple___Apple_scab");
        let mut controller = Controller::new();

        controller.select_file(leaf("apple.jpg"), previews.factory()).unwrap();
        controller.submit(&classifier).await;
        let before = controller.result().cloned();
        assert!(before.is_some());

        assert!(controller.select_file(pdf(), previews.factory()).is_err());

        assert_eq!(controller.result().cloned(), before);
        assert_eq!(controller.preview_url(), Some("blob:apple.jpg"));
        assert_eq!(controller.error(), Some(INVALID_FILE_MESSAGE));
        assert_eq!(previews.created(), 1);
        assert_eq!(previews.released(), 0);
    }

    #[tokio::test]
    async fn test_new_selection_clears_result_and_error() {
        let previews = Previews::default();
        let classifier = MockClassifier::new().predict("Tomato___Late_blight");
        let mut controller = Controller::new();

        controller.select_file(leaf("one.jpg"), previews.factory()).unwrap();
        controller.submit(&classifier).await;
        let _ = controller.select_file(pdf(), previews.factory());
        assert!(controller.result().is_some());
        assert!(controller.error().is_some());

        controller.select_file(leaf("two.jpg"), previews.factory()).unwrap();

        assert_eq!(controller.phase(), Phase::Ready);
        assert!(controller.result().is_none());
        assert!(controller.error().is_none());
        assert_eq!(controller.preview_url(), Some("blob:two.jpg"));
        assert_eq!(previews.released(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_file_is_noop() {
        let classifier = MockClassifier::new().predict("Apple___healthy");
        let mut controller = Controller::new();
        let before = controller.snapshot();

        let phase = controller.submit(&classifier).await;

        assert_eq!(phase, Phase::Idle);
        assert_eq!(classifier.calls(), 0);
        assert_eq!(controller.snapshot(), before);
        assert!(controller.begin_submission().is_none());
    }

    #[tokio::test]
    async fn test_submit_success() {
        let previews = Previews::default();
        let classifier = MockClassifier::new().predict("Corn___Common_rust");
        let mut controller = Controller::new();
        controller.select_file(leaf("corn.jpg"), previews.factory()).unwrap();

        let phase = controller.submit(&classifier).await;

        assert_eq!(phase, Phase::Succeeded);
        assert_eq!(classifier.calls(), 1);
        assert_eq!(classifier.received()[0].name, "corn.jpg");

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.display_label.as_deref(), Some("Corn - Common Rust"));
        assert_eq!(snapshot.health, Some(HealthStatus::Diseased));
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_submit_legacy_data_field() {
        let previews = Previews::default();
        let classifier = MockClassifier::new().respond(PredictionResponse {
            data: Some("Potato___healthy".into()),
            ..Default::default()
        });
        let mut controller = Controller::new();
        controller.select_file(leaf("potato.jpg"), previews.factory()).unwrap();

        controller.submit(&classifier).await;

        let result = controller.result().unwrap();
        assert_eq!(result.label, "Potato___healthy");
        assert_eq!(result.display_label(), "Potato - Healthy");
        assert!(result.is_healthy());
    }

    #[tokio::test]
    async fn test_submit_failure() {
        let previews = Previews::default();
        let classifier =
            MockClassifier::new().fail(ClassifyError::Transport("connection refused".into()));
        let mut controller = Controller::new();
        controller.select_file(leaf("leaf.jpg"), previews.factory()).unwrap();

        let phase = controller.submit(&classifier).await;

        assert_eq!(phase, Phase::Failed);
        assert_eq!(controller.request_state(), RequestState::Idle);
        assert_eq!(
            controller.error(),
            Some("Failed to analyze the image. Please try again.")
        );
        assert!(controller.result().is_none());
        // Selection survives so the user can retry
        assert_eq!(controller.preview_url(), Some("blob:leaf.jpg"));
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let previews = Previews::default();
        let classifier = MockClassifier::new()
            .fail(ClassifyError::Status(503))
            .predict("Grape___healthy");
        let mut controller = Controller::new();
        controller.select_file(leaf("grape.jpg"), previews.factory()).unwrap();

        assert_eq!(controller.submit(&classifier).await, Phase::Failed);
        assert_eq!(controller.submit(&classifier).await, Phase::Succeeded);
        assert!(controller.error().is_none());
        assert_eq!(classifier.calls(), 2);
    }

    #[test]
    fn test_single_submission_in_flight() {
        let previews = Previews::default();
        let mut controller = Controller::new();
        controller.select_file(leaf("leaf.jpg"), previews.factory()).unwrap();

        let first = controller.begin_submission().unwrap();
        assert_eq!(controller.phase(), Phase::Submitting);
        assert!(!controller.can_submit());
        assert!(controller.begin_submission().is_none());
        assert_eq!(controller.in_flight(), Some(first.id));

        assert!(controller.resolve(first.id, Ok(ClassificationResult::new("Apple___healthy"))));
        let second = controller.begin_submission().unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_rejected_first_selection_cannot_submit() {
        let previews = Previews::default();
        let mut controller = Controller::new();
        assert!(!controller.can_submit());

        assert!(controller.select_file(pdf(), previews.factory()).is_err());
        assert_eq!(controller.phase(), Phase::Failed);
        assert!(!controller.can_submit());
        assert!(!controller.snapshot().can_submit);
        assert!(controller.begin_submission().is_none());

        controller.select_file(leaf("leaf.jpg"), previews.factory()).unwrap();
        assert!(controller.can_submit());
        assert!(controller.snapshot().can_submit);
    }

    #[test]
    fn test_begin_submission_clears_previous_outcome() {
        let previews = Previews::default();
        let mut controller = Controller::new();
        controller.select_file(leaf("leaf.jpg"), previews.factory()).unwrap();

        let first = controller.begin_submission().unwrap();
        controller.resolve(first.id, Err(ClassifyError::Status(500)));
        assert!(controller.error().is_some());

        controller.begin_submission().unwrap();
        assert!(controller.error().is_none());
        assert!(controller.result().is_none());
    }

    #[test]
    fn test_stale_response_discarded() {
        let previews = Previews::default();
        let mut controller = Controller::new();
        controller.select_file(leaf("old.jpg"), previews.factory()).unwrap();
        let stale = controller.begin_submission().unwrap();

        controller.select_file(leaf("new.jpg"), previews.factory()).unwrap();
        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(controller.request_state(), RequestState::Idle);

        let applied = controller.resolve(stale.id, Ok(ClassificationResult::new("Apple___Black_rot")));

        assert!(!applied);
        assert_eq!(controller.phase(), Phase::Ready);
        assert!(controller.result().is_none());
        assert_eq!(controller.preview_url(), Some("blob:new.jpg"));

        // The new selection can be submitted and resolved normally
        let fresh = controller.begin_submission().unwrap();
        assert_eq!(fresh.image.name, "new.jpg");
        assert!(controller.resolve(fresh.id, Ok(ClassificationResult::new("Apple___healthy"))));
        assert_eq!(controller.phase(), Phase::Succeeded);
    }

    #[test]
    fn test_stale_failure_discarded() {
        let previews = Previews::default();
        let mut controller = Controller::new();
        controller.select_file(leaf("old.jpg"), previews.factory()).unwrap();
        let stale = controller.begin_submission().unwrap();
        controller.select_file(leaf("new.jpg"), previews.factory()).unwrap();

        assert!(!controller.resolve(stale.id, Err(ClassifyError::Timeout)));
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_preview_released_on_clear_and_drop() {
        let previews = Previews::default();

        let mut controller = Controller::new();
        controller.select_file(leaf("a.jpg"), previews.factory()).unwrap();
        controller.clear();
        assert_eq!(previews.released(), 1);
        assert_eq!(controller.phase(), Phase::Idle);

        controller.select_file(leaf("b.jpg"), previews.factory()).unwrap();
        drop(controller);
        assert_eq!(previews.created(), 2);
        assert_eq!(previews.released(), 2);
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let previews = Previews::default();
        let mut controller = Controller::new();
        let mut updates = controller.subscribe();
        assert!(!updates.has_changed().unwrap());

        controller.select_file(leaf("leaf.jpg"), previews.factory()).unwrap();
        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.phase, Phase::Ready);
        assert_eq!(snapshot.file_name.as_deref(), Some("leaf.jpg"));

        let submission = controller.begin_submission().unwrap();
        assert_eq!(updates.borrow_and_update().phase, Phase::Submitting);

        controller.resolve(submission.id, Ok(ClassificationResult::new("Apple___healthy").with_confidence(0.5)));
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.phase, Phase::Succeeded);
        assert_eq!(snapshot.health, Some(HealthStatus::Healthy));
        assert_eq!(snapshot.confidence.as_deref(), Some("50.0%"));
    }
}
