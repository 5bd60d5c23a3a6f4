#![warn(missing_docs)]
//! # leafcare-analysis-contract
//!
//! ## Purpose
//! Defines the diagnosis service response shapes and client-side parsing.
//!
//! ## Responsibilities
//! - Classify `POST /upload` bodies as a diagnosis, a server error, or a
//!   protocol violation.
//! - Parse `GET /history` bodies into ordered [`HistoryRecord`] lists.
//!
//! ## Data flow
//! Raw JSON body -> [`parse_upload_response`] / [`parse_history_response`] ->
//! upload controller and history viewer.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned so they never borrow from transient network buffers.
//!
//! ## Error model
//! Undecodable JSON and bodies that match neither shape return
//! [`ContractError`]. A well-formed `{"error": ...}` body is not an error here;
//! it is the [`UploadResponse::Rejected`] outcome.

use leafcare_core::{HistoryRecord, PredictionResult, clamp_confidence};
use serde::Deserialize;
use thiserror::Error;

/// Message shown when the server reports an error without text.
pub const FALLBACK_ERROR_MESSAGE: &str = "Unexpected error!";

/// Classified `POST /upload` response.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResponse {
    /// Service produced a diagnosis.
    Diagnosis {
        /// Human-readable server message (may be empty).
        message: String,
        /// Diagnosed label and confidence.
        prediction: PredictionResult,
    },
    /// Service refused the upload with an error message.
    Rejected {
        /// Server-provided message, shown verbatim.
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct WireUploadResponse {
    message: Option<String>,
    disease: Option<String>,
    confidence: Option<f64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireHistoryResponse {
    history: Option<Vec<WireHistoryRecord>>,
}

#[derive(Debug, Deserialize)]
struct WireHistoryRecord {
    id: u64,
    filename: Option<String>,
    disease: String,
    confidence: f64,
    timestamp: Option<String>,
}

/// Parses and classifies an upload response body.
///
/// A body with a non-blank `disease` and a numeric `confidence` is a
/// diagnosis. Otherwise a body with an `error` field is a rejection.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or mistyped fields and
/// [`ContractError::InvalidContract`] when neither shape matches.
pub fn parse_upload_response(raw: &str) -> Result<UploadResponse, ContractError> {
    let parsed: WireUploadResponse = serde_json::from_str(raw).map_err(ContractError::Decode)?;

    if let (Some(disease), Some(confidence)) = (&parsed.disease, parsed.confidence)
        && !disease.trim().is_empty()
    {
        return Ok(UploadResponse::Diagnosis {
            message: parsed.message.unwrap_or_default(),
            prediction: PredictionResult::new(disease.clone(), confidence),
        });
    }

    if let Some(error) = parsed.error {
        let message = if error.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            error
        };
        return Ok(UploadResponse::Rejected { message });
    }

    Err(ContractError::InvalidContract(
        "upload response carries neither a diagnosis nor an error".to_string(),
    ))
}

/// Extracts only the `error` message from a body, if it has one.
///
/// Used for non-success statuses, where the body may be anything.
pub fn extract_error_message(raw: &str) -> Option<String> {
    serde_json::from_str::<WireUploadResponse>(raw)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|error| !error.trim().is_empty())
}

/// Parses a history response body, preserving server order.
///
/// A missing or `null` `history` field yields an empty list.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or malformed records.
pub fn parse_history_response(raw: &str) -> Result<Vec<HistoryRecord>, ContractError> {
    let parsed: WireHistoryResponse = serde_json::from_str(raw).map_err(ContractError::Decode)?;

    Ok(parsed
        .history
        .unwrap_or_default()
        .into_iter()
        .map(|record| HistoryRecord {
            id: record.id,
            filename: record.filename.unwrap_or_default(),
            disease_label: record.disease,
            confidence: clamp_confidence(record.confidence),
            timestamp: record.timestamp.unwrap_or_default(),
        })
        .collect())
}

/// Response contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// JSON decode failure.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload matches no known response shape.
    #[error("response contract violation: {0}")]
    InvalidContract(String),
}
