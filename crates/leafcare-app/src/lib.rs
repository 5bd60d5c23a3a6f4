#![warn(missing_docs)]
//! # leafcare-app
//!
//! ## Purpose
//! Orchestrates camera, selection, upload, presentation, and history for
//! `leafcare`.
//!
//! ## Responsibilities
//! - Own one instance of every controller in a [`DiagnosisSession`].
//! - Expose an explicit command interface whose outcomes are projected into
//!   [`UiState`].
//! - Fetch and project diagnosis history through [`HistoryViewer`].
//! - Load configuration and install logging for the terminal front-end.
//!
//! ## Data flow
//! Command -> controller transition -> [`UiState`] update -> renderer.
//! History runs on its own trigger and never touches upload state.
//!
//! ## Ownership and lifetimes
//! The session owns all mutable state; nothing is global. Dropping the session
//! releases the camera.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Every command leaves the
//! session idle with the camera either live or released, never in between.

pub mod config;
pub mod logging;

use std::path::Path;
use std::sync::Arc;

use leafcare_analysis_contract::parse_history_response;
use leafcare_capture::{
    CameraBackend, CameraSession, CaptureError, ImageAcquisitionController, MediaSourceManager,
};
use leafcare_core::{
    CapturedImage, CoreError, HistoryRecord, ImageSource, Severity, mime_type_for_extension,
};
use leafcare_ui::{
    CAMERA_UNAVAILABLE_ALERT, HistoryView, PredictionPresenter, StatusLine, UiState,
};
use leafcare_upload::{
    Diagnosis, DiagnosisTransport, HttpResponse, PendingUpload, ServiceEndpoints, TransportError,
    UploadController, UploadError, UploadPhase,
};
use thiserror::Error;
use tracing::{info, warn};

pub use config::{AppConfig, ConfigError};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("LEAFCARE_VERSION");

/// Status text used when the service omits its success message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Image uploaded successfully!";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Reads an image file and tags it as a file selection.
///
/// # Errors
/// Returns [`AppError::Io`] when the file cannot be read and
/// [`AppError::Core`] when the extension is not a known image type or the file
/// is empty.
pub fn load_image_file(path: &Path) -> Result<CapturedImage, AppError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default();
    let mime_type = mime_type_for_extension(extension)
        .ok_or_else(|| CoreError::InvalidMimeType(format!("unknown extension '{extension}'")))?;
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(CapturedImage::new(
        filename,
        mime_type,
        ImageSource::File,
        bytes,
    )?)
}

/// Fetches past diagnoses on demand.
pub struct HistoryViewer {
    endpoints: ServiceEndpoints,
    transport: Arc<dyn DiagnosisTransport>,
}

impl HistoryViewer {
    /// Creates a viewer for the given service.
    pub fn new(endpoints: ServiceEndpoints, transport: Arc<dyn DiagnosisTransport>) -> Self {
        Self {
            endpoints,
            transport,
        }
    }

    /// Fetches history records in server order.
    ///
    /// # Errors
    /// Returns [`AppError::History`] for transport failures, non-success
    /// statuses, and undecodable bodies.
    pub fn fetch(&self) -> Result<Vec<HistoryRecord>, AppError> {
        let response = self
            .transport
            .get(self.endpoints.history())
            .map_err(|error| AppError::History(error.to_string()))?;

        if !response.is_success() {
            return Err(AppError::History(format!(
                "http status {}",
                response.status
            )));
        }

        parse_history_response(&response.body).map_err(|error| AppError::History(error.to_string()))
    }

    /// Fetches and projects history; failures become the error placeholder.
    pub fn load(&self) -> HistoryView {
        project_history(self.fetch())
    }
}

/// Projects a history fetch outcome into the history panel.
pub fn project_history(fetched: Result<Vec<HistoryRecord>, AppError>) -> HistoryView {
    match fetched {
        Ok(records) => {
            info!(records = records.len(), "history loaded");
            HistoryView::from_records(&records)
        }
        Err(error) => {
            warn!(%error, "history load failed");
            HistoryView::Error
        }
    }
}

/// One user session: every controller plus the view model it drives.
pub struct DiagnosisSession {
    media: MediaSourceManager,
    acquisition: ImageAcquisitionController,
    upload: UploadController,
    history: HistoryViewer,
    presenter: PredictionPresenter,
    last_outcome: Option<UploadPhase>,
    ui: UiState,
}

impl DiagnosisSession {
    /// Creates a session with no selection and an inactive camera.
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn DiagnosisTransport>,
        camera: Box<dyn CameraBackend>,
    ) -> Self {
        Self {
            media: MediaSourceManager::new(camera),
            acquisition: ImageAcquisitionController::new(),
            upload: UploadController::new(config.endpoints.clone(), Arc::clone(&transport)),
            history: HistoryViewer::new(config.endpoints.clone(), transport),
            presenter: PredictionPresenter,
            last_outcome: None,
            ui: UiState::new(APP_VERSION),
        }
    }

    /// Current view model.
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Takes the pending alert, if any.
    pub fn take_alert(&mut self) -> Option<String> {
        self.ui.take_alert()
    }

    /// Current camera session.
    pub fn camera_session(&self) -> CameraSession {
        self.media.session()
    }

    /// Current upload phase.
    pub fn upload_phase(&self) -> UploadPhase {
        self.upload.phase()
    }

    /// Terminal phase reached by the most recent submission.
    pub fn last_outcome(&self) -> Option<UploadPhase> {
        self.last_outcome
    }

    /// Active image, if any.
    pub fn active_image(&self) -> Option<&CapturedImage> {
        self.acquisition.active_image()
    }

    /// Makes a file the active image.
    pub fn select_file(&mut self, image: CapturedImage) {
        self.acquisition.select_from_file(image);
        self.ui.preview_visible = false;
        self.ui.retake_visible = false;
        self.ui.status = StatusLine::info("✅ File selected. Ready to upload.");
        self.sync_upload_gate();
    }

    /// Starts the camera. A denial raises an alert and leaves it inactive.
    ///
    /// # Errors
    /// Returns [`AppError::Capture`] with
    /// [`CaptureError::CameraUnavailable`] on denial.
    pub fn start_camera(&mut self) -> Result<(), AppError> {
        match self.media.start_camera() {
            Ok(_) => {
                self.ui.camera_visible = true;
                Ok(())
            }
            Err(error) => {
                self.ui.camera_visible = false;
                self.ui.alert = Some(CAMERA_UNAVAILABLE_ALERT.to_string());
                Err(error.into())
            }
        }
    }

    /// Captures from the live camera, keeping it running for retakes.
    ///
    /// # Errors
    /// Returns [`AppError::Capture`] when the camera is inactive or the frame
    /// cannot be read or encoded; the previous selection is kept.
    pub fn capture(&mut self) -> Result<(), AppError> {
        let captured = self
            .acquisition
            .capture_from_camera(&mut self.media)
            .map(|_| ());
        match captured {
            Ok(()) => {
                self.ui.preview_visible = true;
                self.ui.retake_visible = true;
                self.ui.status = StatusLine::info("📸 Image captured successfully!");
                self.sync_upload_gate();
                Ok(())
            }
            Err(error) => {
                self.ui.status = StatusLine::failure(error.to_string());
                Err(error.into())
            }
        }
    }

    /// Discards the active image; the camera keeps running.
    pub fn retake(&mut self) {
        self.acquisition.retake();
        self.ui.preview_visible = false;
        self.ui.retake_visible = false;
        self.ui.status = StatusLine::info("🔁 Ready to capture a new photo.");
        self.sync_upload_gate();
    }

    /// Releases the camera and hides its views.
    pub fn stop_camera(&mut self) {
        self.media.stop_camera();
        self.ui.clear_camera_view();
    }

    /// Runs one submission to completion and presents the outcome.
    ///
    /// # Errors
    /// Returns [`AppError::Upload`] for every failed submission; the status
    /// line already carries the user-facing text.
    pub fn submit(&mut self) -> Result<Diagnosis, AppError> {
        let pending = self.begin_submit()?;
        let response = self.upload.send(&pending);
        self.finish_submit(pending, response)
    }

    /// First half of [`submit`](Self::submit) for shells that send the
    /// request themselves. Shows the loading affordance.
    ///
    /// # Errors
    /// Returns [`UploadError::NoImageSelected`] or
    /// [`UploadError::AlreadySubmitting`] wrapped in [`AppError::Upload`].
    pub fn begin_submit(&mut self) -> Result<PendingUpload, AppError> {
        match self.upload.begin(&self.acquisition) {
            Ok(pending) => {
                self.ui.loading = true;
                self.ui.status = StatusLine::default();
                self.ui.prediction = None;
                Ok(pending)
            }
            Err(UploadError::NoImageSelected) => {
                self.ui.status = StatusLine {
                    tone: Some(Severity::Warning),
                    text: format!("⚠️ {}", UploadError::NoImageSelected),
                };
                Err(UploadError::NoImageSelected.into())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Second half of [`submit`](Self::submit): classifies the response,
    /// presents it, and returns the controller to idle.
    ///
    /// # Errors
    /// Returns [`AppError::Upload`] for rejected, failed, or malformed
    /// responses. A ticket arriving when no submission is in flight is refused
    /// with [`UploadError::NotSubmitting`] and leaves the view model untouched.
    pub fn finish_submit(
        &mut self,
        pending: PendingUpload,
        response: Result<HttpResponse, TransportError>,
    ) -> Result<Diagnosis, AppError> {
        let outcome = self.upload.finish(pending, response, &mut self.media);
        if matches!(outcome, Err(UploadError::NotSubmitting)) {
            return Err(UploadError::NotSubmitting.into());
        }
        self.last_outcome = Some(self.upload.phase());
        self.upload.reset();
        self.ui.loading = false;

        match outcome {
            Ok(diagnosis) => {
                let message = if diagnosis.message.trim().is_empty() {
                    DEFAULT_SUCCESS_MESSAGE
                } else {
                    diagnosis.message.as_str()
                };
                self.ui.status = StatusLine::success(message);
                self.ui.prediction = Some(self.presenter.present(
                    &diagnosis.prediction.disease_label,
                    diagnosis.prediction.confidence,
                ));
                if diagnosis.camera_stopped {
                    self.ui.clear_camera_view();
                }
                self.sync_upload_gate();
                Ok(diagnosis)
            }
            Err(error) => {
                self.ui.status = StatusLine::failure(error.to_string());
                self.ui.prediction = None;
                Err(error.into())
            }
        }
    }

    /// Fetches history into the view model.
    pub fn load_history(&mut self) -> &HistoryView {
        self.begin_history();
        let fetched = self.history.fetch();
        self.finish_history(fetched)
    }

    /// First half of [`load_history`](Self::load_history) for shells that
    /// fetch through [`history_viewer`](Self::history_viewer) themselves.
    /// Shows the loading placeholder.
    pub fn begin_history(&mut self) -> &HistoryView {
        self.ui.history = HistoryView::Loading;
        &self.ui.history
    }

    /// Second half of [`load_history`](Self::load_history): replaces the
    /// loading placeholder with the fetched rows or a placeholder.
    pub fn finish_history(
        &mut self,
        fetched: Result<Vec<HistoryRecord>, AppError>,
    ) -> &HistoryView {
        self.ui.history = project_history(fetched);
        &self.ui.history
    }

    /// History fetcher bound to the configured service.
    pub fn history_viewer(&self) -> &HistoryViewer {
        &self.history
    }

    fn sync_upload_gate(&mut self) {
        self.ui.upload_enabled = self.acquisition.upload_enabled();
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Camera or selection error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Image validation error.
    #[error("image error: {0}")]
    Core(#[from] CoreError),
    /// Submission error; `Display` carries the user-facing text.
    #[error("{0}")]
    Upload(#[from] UploadError),
    /// History fetch error.
    #[error("history error: {0}")]
    History(String),
    /// Local file error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Transport construction error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
