//! Validation helpers for annotation payloads.
//!
//! Used by the API layer before any mutation touches the store; a failed
//! validation aborts the whole operation with no partial state change.

use crate::error::CoreError;

/// Maximum length for a region label.
pub const MAX_LABEL_LENGTH: usize = 200;

/// Default color assigned to a region when the client omits one.
pub const DEFAULT_REGION_COLOR: &str = "#FF0000";

/// Validate that a color is in hex format `#RRGGBB`.
pub fn validate_hex_color(color: &str) -> Result<(), CoreError> {
    if color.len() != 7 || !color.starts_with('#') {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RRGGBB hex format"
        )));
    }

    if !color[1..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must contain only hex digits after '#'"
        )));
    }

    Ok(())
}

/// Validate a segment time range `[start, end)` in seconds.
pub fn validate_time_range(start_time: f64, end_time: f64) -> Result<(), CoreError> {
    if !start_time.is_finite() || !end_time.is_finite() {
        return Err(CoreError::Validation(
            "start_time and end_time must be finite numbers".to_string(),
        ));
    }

    if start_time < 0.0 {
        return Err(CoreError::Validation(
            "start_time must not be negative".to_string(),
        ));
    }

    if end_time <= start_time {
        return Err(CoreError::Validation(format!(
            "end_time ({end_time}) must be greater than start_time ({start_time})"
        )));
    }

    Ok(())
}

/// Validate that a required name field is present and non-blank.
pub fn validate_required_name(name: &str, entity: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{entity} name is required")));
    }
    Ok(())
}

/// Validate a region label.
pub fn validate_label(label: &str) -> Result<(), CoreError> {
    if label.len() > MAX_LABEL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Label exceeds maximum length of {MAX_LABEL_LENGTH} characters"
        )));
    }
    Ok(())
}
