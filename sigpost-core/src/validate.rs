//! Validation and decoding of signal candidates
//!
//! Loaders hand this module raw parsed JSON. Decoding (shape violations,
//! malformed types, unrecognized enum spellings) and validation (required
//! fields, enum membership) are distinct error channels: decode failures
//! propagate as errors, validation failures come back as a report listing
//! every problem found, never as an exception that halts a batch. The
//! caller decides whether to reject or accept-with-warning.

use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::context::{ComplianceStatus, SecurityType, WorkflowStatus};
use crate::entity::EntityType;
use crate::enums::UnknownEnumValue;
use crate::signal::{Signal, SignalType};

/// Errors from decoding a signal out of JSON.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("failed to decode signal: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of validating a candidate signal.
#[derive(Debug, Clone)]
pub struct Validation {
    pub valid: bool,
    /// Every missing or invalid field, not just the first.
    pub errors: Vec<String>,
}

/// Decode a signal from JSON text. Unknown fields are ignored.
pub fn parse_signal(text: &str) -> Result<Signal, SignalError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a signal from an already-parsed JSON value.
pub fn signal_from_value(raw: &Value) -> Result<Signal, SignalError> {
    Ok(serde_json::from_value(raw.clone())?)
}

/// Check a raw JSON candidate against the required-field set and the
/// closed enumerations. Reports every problem; does not depend on the
/// order of fields in the input.
pub fn validate_value(raw: &Value) -> Validation {
    let mut errors = Vec::new();

    require_string(raw.get("id"), "id", &mut errors);
    require_string(raw.get("name"), "name", &mut errors);

    match raw.get("source") {
        Some(source) if source.is_object() => {
            require_string(source.get("name"), "source.name", &mut errors);
        }
        Some(_) => errors.push("source is not an object".to_string()),
        None => errors.push("source is missing".to_string()),
    }

    match raw.get("createdAt") {
        Some(value) if value.is_string() => {}
        Some(value) if !value.is_null() => errors.push("createdAt is not a string".to_string()),
        _ => errors.push("createdAt is missing".to_string()),
    }

    check_enum::<SignalType>(raw.get("type"), "type", &mut errors);
    if let Some(entity) = raw.get("entity") {
        check_enum::<EntityType>(entity.get("type"), "entity.type", &mut errors);
    }

    if let Some(context) = raw.get("securityContext") {
        validate_context(context, "securityContext", &mut errors);
    }
    if let Some(Value::Array(contexts)) = raw.get("securityContexts") {
        for (index, context) in contexts.iter().enumerate() {
            validate_context(context, &format!("securityContexts[{index}]"), &mut errors);
        }
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

fn validate_context(context: &Value, path: &str, errors: &mut Vec<String>) {
    match context.get("status") {
        Some(status) if status.is_object() => {
            check_enum::<ComplianceStatus>(
                status.get("complianceStatus"),
                &format!("{path}.status.complianceStatus"),
                errors,
            );
            check_enum::<WorkflowStatus>(
                status.get("workflowStatus"),
                &format!("{path}.status.workflowStatus"),
                errors,
            );
        }
        Some(_) => errors.push(format!("{path}.status is not an object")),
        None => errors.push(format!("{path}.status is missing")),
    }

    check_enum::<SecurityType>(context.get("type"), &format!("{path}.type"), errors);
}

fn require_string(value: Option<&Value>, path: &str, errors: &mut Vec<String>) {
    match value.and_then(Value::as_str) {
        Some(text) if !text.is_empty() => {}
        _ => errors.push(format!("{path} is missing or empty")),
    }
}

fn check_enum<T>(value: Option<&Value>, path: &str, errors: &mut Vec<String>)
where
    T: FromStr<Err = UnknownEnumValue>,
{
    match value {
        Some(Value::String(raw)) => {
            if let Err(err) = raw.parse::<T>() {
                errors.push(format!("{path}: {err}"));
            }
        }
        // Absent and explicit null both mean "not provided".
        None | Some(Value::Null) => {}
        Some(_) => errors.push(format!("{path} is not a string")),
    }
}
