#![warn(missing_docs)]
//! # leafcare-contract-tests
//!
//! Helpers for validating the diagnosis service fixtures under `contracts/`
//! against their frozen JSON schemas. The checks themselves live in
//! `tests/contract_validation.rs`.

use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;

/// Directory holding schemas and fixtures, relative to the workspace root.
pub fn contracts_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../contracts")
}

/// Reads and parses a JSON document below [`contracts_dir`].
///
/// # Errors
/// Returns a human-readable message when the file is missing or not JSON.
pub fn load_json(relative: &str) -> Result<Value, String> {
    let path = contracts_dir().join(relative);
    let raw = std::fs::read_to_string(&path)
        .map_err(|error| format!("{}: {error}", path.display()))?;
    serde_json::from_str(&raw).map_err(|error| format!("{}: {error}", path.display()))
}

/// Compiles the schema stored at `relative`.
///
/// # Errors
/// Returns a human-readable message when the schema cannot be loaded or
/// compiled.
pub fn compile_validator(relative: &str) -> Result<JSONSchema, String> {
    let schema = load_json(relative)?;
    JSONSchema::compile(&schema).map_err(|error| format!("{relative}: {error}"))
}

/// Collects every validation error for `instance`; empty means valid.
pub fn validation_errors(validator: &JSONSchema, instance: &Value) -> Vec<String> {
    match validator.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|error| error.to_string()).collect(),
    }
}
