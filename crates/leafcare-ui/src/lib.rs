#![warn(missing_docs)]
//! # leafcare-ui
//!
//! ## Purpose
//! Defines the UI-facing view model for `leafcare` and the pure presentation
//! steps that fill it.
//!
//! ## Responsibilities
//! - Map a diagnosis to display text, severity, and an advisory tip.
//! - Project history records into rows or placeholders.
//! - Hold the flags and texts a rendering surface needs ([`UiState`]).
//!
//! ## Data flow
//! Session commands mutate [`UiState`]; a renderer reads it. Nothing here calls
//! back into controllers.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Failures arrive as
//! text already chosen by the caller.

use leafcare_core::{HistoryRecord, Severity, classify_severity, clamp_confidence};

/// Tip shown for labels missing from the advisory table.
pub const FALLBACK_TIP: &str = "💡 Keep monitoring and ensure proper sunlight and water balance.";

/// Placeholder for an empty history.
pub const NO_HISTORY_TEXT: &str = "No uploads yet.";

/// Placeholder for a failed history fetch.
pub const HISTORY_ERROR_TEXT: &str = "❌ Error loading history!";

/// Alert raised when the camera cannot be started.
pub const CAMERA_UNAVAILABLE_ALERT: &str = "⚠️ Camera access denied or unavailable.";

/// Returns the advisory tip for an exact, case-sensitive disease label.
pub fn advisory_tip(label: &str) -> &'static str {
    match label {
        "Tomato Early Blight" => "🪴 Use neem oil and remove infected leaves.",
        "Potato Late Blight" => "🌦 Avoid water on leaves; apply copper-based fungicide.",
        "Apple Scab" => "🍎 Prune infected branches; ensure good air flow.",
        "Corn Rust" => "🌽 Rotate crops and use resistant hybrids.",
        "Healthy Leaf" => "✅ No issues detected. Maintain regular watering.",
        "Mango Anthracnose" => "🥭 Spray with copper fungicide during flowering.",
        "Pepper Bell Bacterial Spot" => "🌶️ Avoid overhead watering; use disease-free seeds.",
        _ => FALLBACK_TIP,
    }
}

/// Formats a confidence percentage with two decimals.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", clamp_confidence(confidence))
}

/// Rendered diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionView {
    /// Raw disease label.
    pub disease_label: String,
    /// Clamped confidence percentage.
    pub confidence: f64,
    /// `🌿 Disease: <label>` line.
    pub disease_text: String,
    /// `📈 Confidence: <nn.nn>%` line.
    pub confidence_text: String,
    /// Advisory tip for the label.
    pub tip: &'static str,
    /// Display severity.
    pub severity: Severity,
}

/// Stateless mapping from a diagnosis to its view.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionPresenter;

impl PredictionPresenter {
    /// Presents one diagnosis.
    pub fn present(&self, label: &str, confidence: f64) -> PredictionView {
        let confidence = clamp_confidence(confidence);
        PredictionView {
            disease_label: label.to_string(),
            confidence,
            disease_text: format!("🌿 Disease: {label}"),
            confidence_text: format!("📈 Confidence: {}", format_confidence(confidence)),
            tip: advisory_tip(label),
            severity: classify_severity(label, confidence),
        }
    }
}

/// One rendered history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    /// Record id.
    pub id: String,
    /// Uploaded file name.
    pub filename: String,
    /// Disease label.
    pub disease: String,
    /// Confidence as shown (`91.8%`).
    pub confidence: String,
    /// Server timestamp.
    pub timestamp: String,
    /// Row severity.
    pub severity: Severity,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: record.id.to_string(),
            filename: record.filename.clone(),
            disease: record.disease_label.clone(),
            confidence: format!("{}%", record.confidence),
            timestamp: record.timestamp.clone(),
            severity: record.severity(),
        }
    }
}

/// History panel contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryView {
    /// Never loaded.
    #[default]
    NotLoaded,
    /// Fetch in progress.
    Loading,
    /// Fetch returned no records.
    Empty,
    /// Fetch failed.
    Error,
    /// Records in server order.
    Table(Vec<HistoryRow>),
}

impl HistoryView {
    /// Projects fetched records, choosing the empty placeholder when needed.
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        if records.is_empty() {
            return Self::Empty;
        }
        Self::Table(records.iter().map(HistoryRow::from).collect())
    }

    /// Placeholder text, or `None` when a table should be shown.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::NotLoaded | Self::Table(_) => None,
            Self::Loading => Some("⏳ Loading history..."),
            Self::Empty => Some(NO_HISTORY_TEXT),
            Self::Error => Some(HISTORY_ERROR_TEXT),
        }
    }
}

/// One status line with an optional tone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    /// Styling tone, if any.
    pub tone: Option<Severity>,
    /// Message text.
    pub text: String,
}

impl StatusLine {
    /// Untoned informational line.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            tone: None,
            text: text.into(),
        }
    }

    /// Success line prefixed with a check mark.
    pub fn success(text: impl AsRef<str>) -> Self {
        Self {
            tone: Some(Severity::Success),
            text: format!("✅ {}", text.as_ref()),
        }
    }

    /// Failure line prefixed with a cross mark.
    pub fn failure(text: impl AsRef<str>) -> Self {
        Self {
            tone: Some(Severity::Danger),
            text: format!("❌ {}", text.as_ref()),
        }
    }
}

/// Aggregate view model.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Upload action enabled.
    pub upload_enabled: bool,
    /// Live camera view shown.
    pub camera_visible: bool,
    /// Captured-image preview shown.
    pub preview_visible: bool,
    /// Retake action shown.
    pub retake_visible: bool,
    /// Loading affordance shown while a request is in flight.
    pub loading: bool,
    /// Main status line.
    pub status: StatusLine,
    /// Latest diagnosis, hidden on failure.
    pub prediction: Option<PredictionView>,
    /// History panel.
    pub history: HistoryView,
    /// Pending interrupt-style alert.
    pub alert: Option<String>,
}

impl UiState {
    /// Creates the initial view model.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            upload_enabled: false,
            camera_visible: false,
            preview_visible: false,
            retake_visible: false,
            loading: false,
            status: StatusLine::default(),
            prediction: None,
            history: HistoryView::NotLoaded,
            alert: None,
        }
    }

    /// Hides everything derived from a live camera session.
    pub fn clear_camera_view(&mut self) {
        self.camera_visible = false;
        self.preview_visible = false;
        self.retake_visible = false;
    }

    /// Takes the pending alert, leaving none.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}
