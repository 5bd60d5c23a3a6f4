#![warn(missing_docs)]
//! # leafcare-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `leafcare` workspace.
//!
//! ## Responsibilities
//! - Represent the active leaf image and the camera frames it is built from.
//! - Represent diagnosis results and history records returned by the service.
//! - Own the three-way severity rule used by both result and history views.
//!
//! ## Data flow
//! Camera backends emit [`RgbFrame`] values, which capture code encodes into a
//! [`CapturedImage`]. File selection produces a [`CapturedImage`] directly.
//! The upload layer turns service responses into [`PredictionResult`] and
//! [`HistoryRecord`] values, which the UI classifies with [`classify_severity`].
//!
//! ## Ownership and lifetimes
//! Images and frames own their backing buffers (`Vec<u8>`) so a selection can
//! outlive the camera stream that produced it.
//!
//! ## Error model
//! Validation failures (empty payload, bad MIME type, frame shape mismatch)
//! return [`CoreError`] variants.
//!
//! ## Privacy notes
//! Image bytes are never logged; callers log [`CapturedImage::digest`] instead.
//!
//! ## Example
//! ```rust
//! use leafcare_core::{classify_severity, Severity};
//!
//! assert_eq!(classify_severity("Healthy Leaf", 12.0), Severity::Success);
//! assert_eq!(classify_severity("Corn Rust", 69.9), Severity::Warning);
//! assert_eq!(classify_severity("Corn Rust", 70.0), Severity::Danger);
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;

/// File name assigned to every camera capture.
pub const CAMERA_CAPTURE_FILENAME: &str = "captured.jpg";

/// MIME type of every camera capture.
pub const CAMERA_CAPTURE_MIME: &str = "image/jpeg";

/// Confidence below this value is classified as [`Severity::Warning`].
pub const WARNING_CONFIDENCE_THRESHOLD: f64 = 70.0;

/// Upper bound of the confidence percentage scale.
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Where the active image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Chosen through a file picker or path.
    File,
    /// Captured from the live camera stream.
    Camera,
}

/// One image ready to be submitted for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    filename: String,
    mime_type: String,
    source: ImageSource,
    bytes: Vec<u8>,
}

impl CapturedImage {
    /// Constructs a validated image.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyImage`] when `bytes` is empty and
    /// [`CoreError::InvalidMimeType`] when the MIME type is not `image/*`.
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        source: ImageSource,
        bytes: Vec<u8>,
    ) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::EmptyImage);
        }

        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(CoreError::InvalidMimeType(mime_type));
        }

        let filename = filename.into();
        let filename = if filename.trim().is_empty() {
            "upload".to_string()
        } else {
            filename
        };

        Ok(Self {
            filename,
            mime_type,
            source,
            bytes,
        })
    }

    /// Wraps JPEG bytes produced by a camera capture.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyImage`] when the encoder produced no bytes.
    pub fn from_camera_jpeg(bytes: Vec<u8>) -> Result<Self, CoreError> {
        Self::new(
            CAMERA_CAPTURE_FILENAME,
            CAMERA_CAPTURE_MIME,
            ImageSource::Camera,
            bytes,
        )
    }

    /// Returns the same payload re-tagged with another source.
    pub fn with_source(mut self, source: ImageSource) -> Self {
        self.source = source;
        self
    }

    /// File name sent as the multipart file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// MIME type of the payload.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Source the image was acquired from.
    pub fn source(&self) -> ImageSource {
        self.source
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; construction rejects empty payloads.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// SHA-256 hex digest of the payload, safe to log.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Guesses an image MIME type from a file extension.
///
/// Returns `None` for extensions that are not common still-image formats.
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// One decoded camera frame in packed RGB8 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Row-major RGB bytes (`width * height * 3`).
    pub rgb: Vec<u8>,
}

impl RgbFrame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFrameShape`] when the buffer length is not
    /// exactly `width * height * 3`, and [`CoreError::EmptyFrame`] for zero
    /// dimensions.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::EmptyFrame);
        }

        let expected = required_rgb_len(width, height)?;
        if rgb.len() != expected {
            return Err(CoreError::InvalidFrameShape {
                expected,
                actual: rgb.len(),
            });
        }

        Ok(Self { width, height, rgb })
    }
}

/// Diagnosis returned by the service for one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Free-text disease label.
    pub disease_label: String,
    /// Confidence percentage in [0, 100].
    pub confidence: f64,
}

impl PredictionResult {
    /// Builds a result with confidence clamped into [0, 100].
    pub fn new(disease_label: impl Into<String>, confidence: f64) -> Self {
        Self {
            disease_label: disease_label.into(),
            confidence: clamp_confidence(confidence),
        }
    }

    /// Severity classification of this result.
    pub fn severity(&self) -> Severity {
        classify_severity(&self.disease_label, self.confidence)
    }
}

/// One past diagnosis as reported by the history endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Server-assigned record id.
    pub id: u64,
    /// File name the image was uploaded under.
    pub filename: String,
    /// Diagnosed disease label.
    pub disease_label: String,
    /// Confidence percentage in [0, 100].
    pub confidence: f64,
    /// Opaque server timestamp, displayed as-is.
    pub timestamp: String,
}

impl HistoryRecord {
    /// Severity classification of this record.
    pub fn severity(&self) -> Severity {
        classify_severity(&self.disease_label, self.confidence)
    }
}

/// Display classification for results and history rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Healthy leaf.
    Success,
    /// Disease reported with low confidence.
    Warning,
    /// Disease reported with high confidence.
    Danger,
}

impl Severity {
    /// Style class name used by rendering surfaces.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Classifies a diagnosis.
///
/// Rules are evaluated in order: a label containing `healthy` in any case is
/// [`Severity::Success`]; otherwise confidence below
/// [`WARNING_CONFIDENCE_THRESHOLD`] is [`Severity::Warning`]; everything else is
/// [`Severity::Danger`].
pub fn classify_severity(label: &str, confidence: f64) -> Severity {
    if label.to_lowercase().contains("healthy") {
        Severity::Success
    } else if confidence < WARNING_CONFIDENCE_THRESHOLD {
        Severity::Warning
    } else {
        Severity::Danger
    }
}

/// Clamps a confidence value into [0, 100]. `NaN` maps to zero.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, MAX_CONFIDENCE)
}

/// Error type for core validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Image payload has no bytes.
    #[error("image payload is empty")]
    EmptyImage,
    /// MIME type is not an image type.
    #[error("unsupported image mime type: {0}")]
    InvalidMimeType(String),
    /// Frame has a zero dimension.
    #[error("frame has zero width or height")]
    EmptyFrame,
    /// Frame buffer does not match declared geometry.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected RGB byte count.
        expected: usize,
        /// Actual RGB byte count.
        actual: usize,
    },
    /// Frame dimensions overflow addressable memory.
    #[error("frame dimensions overflow")]
    FrameOverflow,
}

fn required_rgb_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or(CoreError::FrameOverflow)
}
