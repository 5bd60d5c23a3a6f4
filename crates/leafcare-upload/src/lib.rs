#![warn(missing_docs)]
//! # leafcare-upload
//!
//! ## Purpose
//! Sequences image uploads to the diagnosis service.
//!
//! ## Responsibilities
//! - Resolve and validate service endpoints.
//! - Execute requests through an injectable [`DiagnosisTransport`].
//! - Track the [`UploadPhase`] state machine and reject concurrent submits.
//! - Release the camera after a successful camera-sourced diagnosis.
//!
//! ## Data flow
//! [`ImageAcquisitionController`] lends the active image -> [`UploadController::begin`]
//! snapshots it into a [`PendingUpload`] -> transport posts it ->
//! [`UploadController::finish`] classifies the response into a [`Diagnosis`] or
//! an [`UploadError`].
//!
//! ## Ownership and lifetimes
//! The controller owns the phase. The pending ticket owns a copy of the image,
//! so a retake during the request cannot change what is sent.
//!
//! ## Error model
//! Every failure is terminal for one submission and leaves the controller in
//! [`UploadPhase::Failed`] until [`UploadController::reset`]. Nothing is retried.
//! Transitions run strictly Idle -> Submitting -> Succeeded | Failed -> Idle;
//! out-of-order calls are refused without touching the phase or the camera.

mod transport;

use std::sync::Arc;

use leafcare_analysis_contract::{UploadResponse, extract_error_message, parse_upload_response};
use leafcare_capture::{ImageAcquisitionController, MediaSourceManager};
use leafcare_core::{CapturedImage, ImageSource, PredictionResult};
use thiserror::Error;
use tracing::{info, warn};

pub use transport::{
    DEFAULT_REQUEST_TIMEOUT, DiagnosisTransport, EndpointError, HttpResponse, HttpTransport,
    IMAGE_FIELD, ServiceEndpoints, TransportError,
};

/// Shown when no response could be obtained.
pub const CONNECTION_ERROR_MESSAGE: &str = "Error connecting to backend!";

/// Shown for non-success statuses without a server error message.
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Upload state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Ready to accept a submission.
    Idle,
    /// A request is in flight.
    Submitting,
    /// Last submission produced a diagnosis.
    Succeeded,
    /// Last submission failed.
    Failed,
}

/// Ticket for one in-flight submission.
///
/// Only [`UploadController::begin`] creates tickets and
/// [`UploadController::finish`] consumes them, so each submission is finished
/// at most once.
#[derive(Debug)]
pub struct PendingUpload {
    image: CapturedImage,
}

impl PendingUpload {
    /// Image snapshot being sent.
    pub fn image(&self) -> &CapturedImage {
        &self.image
    }
}

/// Successful submission result.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    /// Human-readable server message.
    pub message: String,
    /// Diagnosed label and confidence.
    pub prediction: PredictionResult,
    /// Source of the uploaded image.
    pub source: ImageSource,
    /// Whether this submission released the camera.
    pub camera_stopped: bool,
}

/// Serializes submissions and tracks their outcome.
pub struct UploadController {
    phase: UploadPhase,
    endpoints: ServiceEndpoints,
    transport: Arc<dyn DiagnosisTransport>,
}

impl UploadController {
    /// Creates an idle controller.
    pub fn new(endpoints: ServiceEndpoints, transport: Arc<dyn DiagnosisTransport>) -> Self {
        Self {
            phase: UploadPhase::Idle,
            endpoints,
            transport,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Configured endpoints.
    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Runs one full submission: [`begin`](Self::begin), send,
    /// [`finish`](Self::finish), [`reset`](Self::reset).
    ///
    /// The controller is back in [`UploadPhase::Idle`] when this returns; the
    /// outcome is carried by the result alone.
    ///
    /// # Errors
    /// See [`begin`](Self::begin) and [`finish`](Self::finish).
    pub fn submit(
        &mut self,
        acquisition: &ImageAcquisitionController,
        media: &mut MediaSourceManager,
    ) -> Result<Diagnosis, UploadError> {
        let pending = self.begin(acquisition)?;
        let response = self.send(&pending);
        let outcome = self.finish(pending, response, media);
        self.reset();
        outcome
    }

    /// Enters [`UploadPhase::Submitting`] and snapshots the active image.
    ///
    /// A terminal phase left over from the previous submission is reset first.
    ///
    /// # Errors
    /// Returns [`UploadError::AlreadySubmitting`] while a request is in flight
    /// and [`UploadError::NoImageSelected`] without an active image. Neither
    /// changes the phase.
    pub fn begin(
        &mut self,
        acquisition: &ImageAcquisitionController,
    ) -> Result<PendingUpload, UploadError> {
        if self.phase == UploadPhase::Submitting {
            warn!("submit rejected: upload already in progress");
            return Err(UploadError::AlreadySubmitting);
        }
        self.reset();

        let image = acquisition
            .active_image()
            .ok_or(UploadError::NoImageSelected)?
            .clone();

        self.phase = UploadPhase::Submitting;
        info!(
            source = ?image.source(),
            bytes = image.len(),
            digest = %image.digest(),
            endpoint = %self.endpoints.upload(),
            "upload submitting"
        );
        Ok(PendingUpload { image })
    }

    /// Sends the pending image through the transport.
    pub fn send(&self, pending: &PendingUpload) -> Result<HttpResponse, TransportError> {
        self.transport
            .post_image(self.endpoints.upload(), &pending.image)
    }

    /// Classifies the transport result and leaves the submitting phase.
    ///
    /// On success with a camera-sourced image the camera is stopped. The camera
    /// is never touched on failure. The phase stays terminal until
    /// [`reset`](Self::reset) so a shell can read it while presenting.
    ///
    /// # Errors
    /// Returns [`UploadError::NotSubmitting`] without any state change when no
    /// submission is in flight, [`UploadError::Rejected`] for server error
    /// bodies, [`UploadError::Network`] for transport failures and non-success
    /// statuses, and [`UploadError::Protocol`] for unrecognized bodies.
    pub fn finish(
        &mut self,
        pending: PendingUpload,
        response: Result<HttpResponse, TransportError>,
        media: &mut MediaSourceManager,
    ) -> Result<Diagnosis, UploadError> {
        if self.phase != UploadPhase::Submitting {
            warn!(phase = ?self.phase, "finish refused: no upload in flight");
            return Err(UploadError::NotSubmitting);
        }

        match classify_response(response) {
            Ok((message, prediction)) => {
                let source = pending.image.source();
                let camera_stopped = source == ImageSource::Camera && media.stop_camera();
                self.phase = UploadPhase::Succeeded;
                info!(
                    disease = %prediction.disease_label,
                    confidence = prediction.confidence,
                    ?source,
                    camera_stopped,
                    "upload succeeded"
                );
                Ok(Diagnosis {
                    message,
                    prediction,
                    source,
                    camera_stopped,
                })
            }
            Err(error) => {
                self.phase = UploadPhase::Failed;
                warn!(?error, "upload failed");
                Err(error)
            }
        }
    }

    /// Returns a terminal phase to [`UploadPhase::Idle`].
    ///
    /// Has no effect while submitting.
    pub fn reset(&mut self) {
        if matches!(self.phase, UploadPhase::Succeeded | UploadPhase::Failed) {
            self.phase = UploadPhase::Idle;
        }
    }
}

fn classify_response(
    response: Result<HttpResponse, TransportError>,
) -> Result<(String, PredictionResult), UploadError> {
    let response = response.map_err(|error| UploadError::Network {
        status: None,
        message: CONNECTION_ERROR_MESSAGE.to_string(),
        detail: error.to_string(),
    })?;

    if !response.is_success() {
        if let Some(message) = extract_error_message(&response.body) {
            return Err(UploadError::Rejected(message));
        }
        return Err(UploadError::Network {
            status: Some(response.status),
            message: SERVER_ERROR_MESSAGE.to_string(),
            detail: format!("http status {}", response.status),
        });
    }

    match parse_upload_response(&response.body) {
        Ok(UploadResponse::Diagnosis {
            message,
            prediction,
        }) => Ok((message, prediction)),
        Ok(UploadResponse::Rejected { message }) => Err(UploadError::Rejected(message)),
        Err(error) => Err(UploadError::Protocol(error.to_string())),
    }
}

/// Upload failures. `Display` yields the user-facing text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Submit without an active image; no request is made.
    #[error("Please select or capture an image first!")]
    NoImageSelected,
    /// Submit while another request is in flight.
    #[error("An upload is already in progress.")]
    AlreadySubmitting,
    /// Finish requested while no submission is in flight.
    #[error("No upload is in progress.")]
    NotSubmitting,
    /// Server returned an error message.
    #[error("{0}")]
    Rejected(String),
    /// No response, or a non-success status without an error message.
    #[error("{message}")]
    Network {
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// User-facing message.
        message: String,
        /// Diagnostic detail for logs.
        detail: String,
    },
    /// Response matched neither the diagnosis nor the error shape.
    #[error("Unexpected response from server.")]
    Protocol(String),
}
