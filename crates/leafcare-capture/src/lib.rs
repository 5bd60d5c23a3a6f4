#![warn(missing_docs)]
//! # leafcare-capture
//!
//! ## Purpose
//! Owns the camera device stream and the single active image selection.
//!
//! ## Responsibilities
//! - Define a backend-agnostic camera trait.
//! - Track the camera session lifecycle in [`MediaSourceManager`].
//! - Encode captured frames into JPEG [`CapturedImage`] payloads.
//! - Hold the one active image and gate uploads in
//!   [`ImageAcquisitionController`].
//!
//! ## Data flow
//! `start_camera` opens a backend stream -> `capture_frame` reads one
//! [`RgbFrame`] and encodes it -> [`ImageAcquisitionController`] stores the
//! resulting image until it is replaced, retaken, or uploaded.
//!
//! ## Ownership and lifetimes
//! [`MediaSourceManager`] is the only owner of the device stream. No other type
//! can start or stop it. The stream is released on drop.
//!
//! ## Error model
//! Permission denial and missing devices surface as
//! [`CaptureError::CameraUnavailable`]. They are never retried here.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use leafcare_core::{CapturedImage, CoreError, ImageSource, RgbFrame};
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(feature = "webcam")]
mod webcam;

#[cfg(feature = "webcam")]
pub use webcam::NokhwaCamera;

/// JPEG quality used for every camera capture.
pub const JPEG_QUALITY: u8 = 90;

/// Trait implemented by concrete camera providers.
///
/// Implementations are driven exclusively by [`MediaSourceManager`], which
/// guarantees `open_stream` is never called twice without a `close_stream` in
/// between.
pub trait CameraBackend {
    /// Requests device access and opens the video stream.
    ///
    /// # Errors
    /// Returns [`CaptureError::CameraUnavailable`] when permission is denied or
    /// no device exists.
    fn open_stream(&mut self) -> Result<(), CaptureError>;

    /// Reads the current frame from the open stream.
    fn read_frame(&mut self) -> Result<RgbFrame, CaptureError>;

    /// Releases the device stream.
    fn close_stream(&mut self);

    /// Human-readable device description for logs.
    fn describe(&self) -> String;
}

/// Opaque identifier of one granted device stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(u64);

/// Camera session state owned by [`MediaSourceManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSession {
    /// No stream is open.
    Inactive,
    /// A granted stream is live.
    Active(StreamHandle),
}

/// Owns the camera device stream and its session lifecycle.
pub struct MediaSourceManager {
    backend: Box<dyn CameraBackend>,
    session: CameraSession,
    next_handle: u64,
}

impl MediaSourceManager {
    /// Creates a manager with an inactive session.
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            backend,
            session: CameraSession::Inactive,
            next_handle: 1,
        }
    }

    /// Returns the current session snapshot.
    pub fn session(&self) -> CameraSession {
        self.session
    }

    /// Returns `true` while a stream is live.
    pub fn is_active(&self) -> bool {
        matches!(self.session, CameraSession::Active(_))
    }

    /// Starts the camera, or returns the live handle when already active.
    ///
    /// # Errors
    /// Returns [`CaptureError::CameraUnavailable`] on denial; the session stays
    /// [`CameraSession::Inactive`].
    pub fn start_camera(&mut self) -> Result<StreamHandle, CaptureError> {
        if let CameraSession::Active(handle) = self.session {
            debug!(?handle, "camera already active");
            return Ok(handle);
        }

        if let Err(error) = self.backend.open_stream() {
            warn!(device = %self.backend.describe(), %error, "camera start refused");
            return Err(error);
        }

        let handle = StreamHandle(self.next_handle);
        self.next_handle += 1;
        self.session = CameraSession::Active(handle);
        info!(device = %self.backend.describe(), ?handle, "camera started");
        Ok(handle)
    }

    /// Reads the live frame without encoding it, for preview surfaces.
    ///
    /// # Errors
    /// Returns [`CaptureError::CameraInactive`] when no stream is open.
    pub fn preview_frame(&mut self) -> Result<RgbFrame, CaptureError> {
        self.ensure_active()?;
        self.backend.read_frame()
    }

    /// Captures the current frame as a JPEG image tagged [`ImageSource::Camera`].
    ///
    /// The session stays active so the user can retake.
    ///
    /// # Errors
    /// Returns [`CaptureError::CameraInactive`] when no stream is open, or the
    /// backend/encoder failure.
    pub fn capture_frame(&mut self) -> Result<CapturedImage, CaptureError> {
        self.ensure_active()?;
        let frame = self.backend.read_frame()?;
        let jpeg = encode_jpeg(&frame)?;
        let image = CapturedImage::from_camera_jpeg(jpeg)?;
        info!(
            width = frame.width,
            height = frame.height,
            bytes = image.len(),
            digest = %image.digest(),
            "camera frame captured"
        );
        Ok(image)
    }

    /// Releases the stream. Returns `true` when a live stream was released.
    pub fn stop_camera(&mut self) -> bool {
        match self.session {
            CameraSession::Inactive => false,
            CameraSession::Active(handle) => {
                self.backend.close_stream();
                self.session = CameraSession::Inactive;
                info!(?handle, "camera stopped");
                true
            }
        }
    }

    fn ensure_active(&self) -> Result<(), CaptureError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CaptureError::CameraInactive)
        }
    }
}

impl Drop for MediaSourceManager {
    fn drop(&mut self) {
        self.stop_camera();
    }
}

/// Holds the single active image and gates the upload action.
#[derive(Debug, Clone, Default)]
pub struct ImageAcquisitionController {
    active: Option<CapturedImage>,
}

impl ImageAcquisitionController {
    /// Creates a controller with no active image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active image with a file selection.
    pub fn select_from_file(&mut self, image: CapturedImage) -> &CapturedImage {
        let image = image.with_source(ImageSource::File);
        info!(
            filename = image.filename(),
            bytes = image.len(),
            digest = %image.digest(),
            "file selected"
        );
        &*self.active.insert(image)
    }

    /// Captures from the live camera and makes the capture active.
    ///
    /// The camera session is left running. On failure the previous selection
    /// is kept.
    ///
    /// # Errors
    /// Propagates [`MediaSourceManager::capture_frame`] failures.
    pub fn capture_from_camera(
        &mut self,
        media: &mut MediaSourceManager,
    ) -> Result<&CapturedImage, CaptureError> {
        let image = media.capture_frame()?;
        Ok(&*self.active.insert(image))
    }

    /// Discards the active image so a new capture can follow.
    pub fn retake(&mut self) -> Option<CapturedImage> {
        let discarded = self.active.take();
        if discarded.is_some() {
            debug!("active image discarded for retake");
        }
        discarded
    }

    /// Returns the active image, if any.
    pub fn active_image(&self) -> Option<&CapturedImage> {
        self.active.as_ref()
    }

    /// Returns `true` iff an active image exists.
    pub fn upload_enabled(&self) -> bool {
        self.active.is_some()
    }
}

/// Encodes one frame as JPEG at [`JPEG_QUALITY`].
///
/// # Errors
/// Returns [`CaptureError::Encode`] when the encoder rejects the frame.
pub fn encode_jpeg(frame: &RgbFrame) -> Result<Vec<u8>, CaptureError> {
    let mut encoded = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
        encoder
            .encode(&frame.rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
            .map_err(|error| CaptureError::Encode(error.to_string()))?;
    }
    Ok(encoded)
}

/// Backend for builds without camera support; every request is refused.
#[derive(Debug, Clone, Default)]
pub struct UnavailableCamera;

impl CameraBackend for UnavailableCamera {
    fn open_stream(&mut self) -> Result<(), CaptureError> {
        Err(CaptureError::CameraUnavailable(
            "this build has no camera support".to_string(),
        ))
    }

    fn read_frame(&mut self) -> Result<RgbFrame, CaptureError> {
        Err(CaptureError::CameraInactive)
    }

    fn close_stream(&mut self) {}

    fn describe(&self) -> String {
        "unavailable".to_string()
    }
}

/// Counters shared between a [`SyntheticCamera`] and its observers.
#[derive(Debug, Default)]
pub struct CameraStats {
    opens: AtomicUsize,
    closes: AtomicUsize,
    frames: AtomicUsize,
}

impl CameraStats {
    /// Number of granted stream opens.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of stream releases.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Number of frames read.
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

/// Deterministic camera for tests, demos, and CI.
#[derive(Debug)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    deny: bool,
    open: bool,
    stats: Arc<CameraStats>,
}

impl SyntheticCamera {
    /// Creates a camera that grants access and emits `width x height` frames.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            deny: false,
            open: false,
            stats: Arc::new(CameraStats::default()),
        }
    }

    /// Creates a camera whose permission request is always denied.
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::new(4, 4)
        }
    }

    /// Returns the shared counters for this camera.
    pub fn stats(&self) -> Arc<CameraStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(8, 8)
    }
}

impl CameraBackend for SyntheticCamera {
    fn open_stream(&mut self) -> Result<(), CaptureError> {
        if self.deny {
            return Err(CaptureError::CameraUnavailable(
                "permission denied".to_string(),
            ));
        }
        self.open = true;
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RgbFrame, CaptureError> {
        if !self.open {
            return Err(CaptureError::CameraInactive);
        }

        let sequence = self.stats.frames.fetch_add(1, Ordering::SeqCst) + 1;
        let shade = (sequence % 255) as u8;
        let len = (self.width as usize) * (self.height as usize) * 3;
        RgbFrame::new(self.width, self.height, vec![shade; len]).map_err(CaptureError::Frame)
    }

    fn close_stream(&mut self) {
        if self.open {
            self.open = false;
            self.stats.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn describe(&self) -> String {
        format!("synthetic {}x{}", self.width, self.height)
    }
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Permission denied or no camera device.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    /// Capture requested while no stream is open.
    #[error("camera is not active")]
    CameraInactive,
    /// Backend runtime failure while reading a frame.
    #[error("camera backend failure: {0}")]
    Backend(String),
    /// Frame or image validation failed.
    #[error("invalid capture: {0}")]
    Frame(#[from] CoreError),
    /// JPEG encoding failed.
    #[error("jpeg encoding failed: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for camera lifecycle and selection gating.

    use super::*;

    fn manager_with_stats() -> (MediaSourceManager, Arc<CameraStats>) {
        let camera = SyntheticCamera::new(4, 4);
        let stats = camera.stats();
        (MediaSourceManager::new(Box::new(camera)), stats)
    }

    #[test]
    fn start_is_idempotent_while_active() {
        let (mut media, stats) = manager_with_stats();
        let first = media.start_camera().expect("camera should start");
        let second = media.start_camera().expect("second start is a no-op");
        assert_eq!(first, second);
        assert_eq!(stats.opens(), 1);
    }

    #[test]
    fn denied_camera_stays_inactive() {
        let mut media = MediaSourceManager::new(Box::new(SyntheticCamera::denied()));
        assert!(matches!(
            media.start_camera(),
            Err(CaptureError::CameraUnavailable(_))
        ));
        assert_eq!(media.session(), CameraSession::Inactive);
    }

    #[test]
    fn capture_requires_active_session_and_keeps_it_live() {
        let (mut media, _stats) = manager_with_stats();
        assert!(matches!(
            media.capture_frame(),
            Err(CaptureError::CameraInactive)
        ));

        media.start_camera().expect("camera should start");
        let image = media.capture_frame().expect("capture should work");
        assert_eq!(image.source(), ImageSource::Camera);
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(&image.bytes()[..2], &[0xFF, 0xD8]);
        assert!(media.is_active());
    }

    #[test]
    fn stop_is_idempotent_and_releases_once() {
        let (mut media, stats) = manager_with_stats();
        assert!(!media.stop_camera());
        media.start_camera().expect("camera should start");
        assert!(media.stop_camera());
        assert!(!media.stop_camera());
        assert_eq!(stats.closes(), 1);
    }

    #[test]
    fn drop_releases_live_stream() {
        let (mut media, stats) = manager_with_stats();
        media.start_camera().expect("camera should start");
        drop(media);
        assert_eq!(stats.closes(), 1);
    }

    #[test]
    fn upload_gate_follows_active_image() {
        let (mut media, _stats) = manager_with_stats();
        let mut acquisition = ImageAcquisitionController::new();
        assert!(!acquisition.upload_enabled());

        media.start_camera().expect("camera should start");
        acquisition
            .capture_from_camera(&mut media)
            .expect("capture should work");
        assert!(acquisition.upload_enabled());

        acquisition.retake();
        assert!(!acquisition.upload_enabled());
        assert!(media.is_active());
    }

    #[test]
    fn file_selection_is_tagged_as_file() {
        let mut acquisition = ImageAcquisitionController::new();
        let image = CapturedImage::new("leaf.png", "image/png", ImageSource::Camera, vec![1, 2])
            .expect("valid image");
        let selected = acquisition.select_from_file(image);
        assert_eq!(selected.source(), ImageSource::File);
        assert!(acquisition.upload_enabled());
    }
}
