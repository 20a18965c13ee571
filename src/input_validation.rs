//! Validation of user-supplied tag settings and path arguments
//!
//! Everything here runs before any tag is read or written, so a bad input
//! never reaches the attribute store.

use crate::error::{Result, TagError};
use crate::tags::Color;

const MAX_TAG_NAME_LENGTH: usize = 255;
const MAX_PATH_LENGTH: usize = 4096;

fn invalid(message: impl Into<String>) -> TagError {
    TagError::Validation(message.into())
}

/// Validate a custom tag name.
///
/// The stored form separates name and color with a newline, so names may
/// not contain one.
pub fn validate_tag_name(name: Option<&str>) -> Result<&str> {
    let name = name.ok_or_else(|| invalid("Tag name is required"))?;

    if name.trim().is_empty() {
        return Err(invalid("Tag name cannot be empty"));
    }

    if name.chars().count() > MAX_TAG_NAME_LENGTH {
        return Err(invalid(format!(
            "Tag name too long: {} chars (max: {})",
            name.chars().count(),
            MAX_TAG_NAME_LENGTH
        )));
    }

    if name.contains('\n') || name.contains('\r') || name.contains('\0') {
        return Err(invalid("Tag name contains control characters"));
    }

    Ok(name)
}

/// Validate the color from action settings. The field is required; names
/// that are not palette colors give `Custom`.
pub fn validate_color_name(color: Option<&str>) -> Result<Color> {
    let color = color.ok_or_else(|| invalid("Tag color is required"))?;
    Ok(Color::from_name(color))
}

/// Validate a path passed on the command line.
pub fn validate_path_argument(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid("Path cannot be empty"));
    }

    if path.len() > MAX_PATH_LENGTH {
        return Err(invalid(format!(
            "Path too long: {} bytes (max: {MAX_PATH_LENGTH})",
            path.len()
        )));
    }

    if path.contains('\0') {
        return Err(invalid("Path contains null byte"));
    }

    Ok(())
}
