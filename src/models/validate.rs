use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Reject blank required text fields
pub fn validate_required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_field(field, "is required"));
    }
    Ok(())
}

/// A JSON text field must parse when present; blank counts as absent
pub fn validate_json(field: &str, value: Option<&str>) -> AppResult<()> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(text) => serde_json::from_str::<Value>(text)
            .map(|_| ())
            .map_err(|e| AppError::invalid_field(field, format!("must be valid JSON ({e})"))),
        None => Ok(()),
    }
}

/// Parse an optional JSON text field, treating blank as absent
pub fn parse_json(value: Option<&str>) -> Option<Value> {
    value
        .filter(|v| !v.trim().is_empty())
        .and_then(|text| serde_json::from_str(text).ok())
}

/// Trim and drop empty strings
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
