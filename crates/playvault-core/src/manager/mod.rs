// Service managers: one per backend feature area, all sharing one executor.

pub mod auth;
pub mod cloud_save;
pub mod feedback;
pub mod gift_codes;
pub mod leaderboard;
pub mod news;
pub mod remote_config;
pub mod remote_log;

use playvault_api::RequestExecutor;

use crate::error::CoreError;

/// Fail fast when an endpoint needs a signed-in player.
pub(crate) fn require_session(executor: &RequestExecutor) -> Result<(), CoreError> {
    if executor.context().session().has_session_token() {
        Ok(())
    } else {
        Err(CoreError::NotSignedIn)
    }
}

/// Check an identifier that becomes a URL path segment.
///
/// All-dot values are refused since URL normalization treats them as
/// relative path steps.
pub(crate) fn validate_segment(what: &str, value: &str) -> Result<(), CoreError> {
    let valid = !value.is_empty()
        && value.len() <= 64
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !value.chars().all(|c| c == '.');
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation {
            message: format!(
                "{what} must be 1-64 characters of letters, digits, '-', '_' or '.', got {value:?}"
            ),
        })
    }
}

/// Reject blank free-text input.
pub(crate) fn require_text(what: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation {
            message: format!("{what} must not be empty"),
        })
    } else {
        Ok(())
    }
}
