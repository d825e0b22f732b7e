//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use playvault_config::ConfigError;
use playvault_core::{CoreError, FailureKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const RATE_LIMITED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("No reachable backend host")]
    #[diagnostic(
        code(playvault::connection_failed),
        help(
            "None of these hosts answered the health check:\n  {hosts}\n\
             Check the profile's hosts, or pass --host to skip probing."
        )
    )]
    ConnectionFailed { hosts: String },

    #[error("Request failed after retrying: {message}")]
    #[diagnostic(
        code(playvault::unavailable),
        help("The backend kept failing. Try again later or raise retry.max_retries.")
    )]
    Unavailable { message: String },

    #[error("Request timed out or was cancelled: {message}")]
    #[diagnostic(
        code(playvault::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not signed in")]
    #[diagnostic(
        code(playvault::not_signed_in),
        help(
            "Sign in first with: playvault auth guest\n\
             Or: playvault auth login <email>"
        )
    )]
    NotSignedIn,

    #[error("Authentication rejected: {message}")]
    #[diagnostic(
        code(playvault::auth_failed),
        help(
            "Check the API key, or sign in again with: playvault auth login <email>"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(playvault::no_credentials),
        help(
            "Pass --api-key, set PLAYVAULT_API_KEY, or set api_key_env in the profile."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(playvault::not_found),
        help("Run: playvault {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(playvault::api_error))]
    Api { status: u16, message: String },

    #[error("Rejected by the backend: {message}")]
    #[diagnostic(code(playvault::rejected))]
    Rejected { message: String },

    #[error("Rate limited by the backend: {message}")]
    #[diagnostic(code(playvault::rate_limited), help("Wait a moment and retry."))]
    RateLimited { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(playvault::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(playvault::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: playvault config add-profile <name> --url <url>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(playvault::no_config),
        help(
            "Create a profile with: playvault config add-profile default --url <url>\n\
             Or pass --host. Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(playvault::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(playvault::io))]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(playvault::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Unavailable { .. } => exit_code::CONNECTION,
            Self::NotSignedIn | Self::AuthFailed { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::RateLimited { .. } => exit_code::RATE_LIMITED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            Self::Api { .. }
            | Self::Rejected { .. }
            | Self::Config(_)
            | Self::Io(_)
            | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoReachableHost { candidates } => Self::ConnectionFailed {
                hosts: candidates.join("\n  "),
            },
            CoreError::NoHostsConfigured => Self::NoConfig {
                path: playvault_config::config_path().display().to_string(),
            },
            CoreError::NotSignedIn => Self::NotSignedIn,
            CoreError::Unauthorized { message } => Self::AuthFailed { message },
            CoreError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Api {
                message,
                kind,
                status,
            } => match kind {
                FailureKind::RetriesExhausted | FailureKind::Connection | FailureKind::Server => {
                    Self::Unavailable { message }
                }
                FailureKind::RateLimited => Self::RateLimited { message },
                FailureKind::Cancelled => Self::Timeout { message },
                FailureKind::NoActiveHost => Self::ConnectionFailed {
                    hosts: "(none selected)".into(),
                },
                _ => Self::Api { status, message },
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => {
                let available = playvault_config::load_config_or_default()
                    .profiles
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                Self::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available
                    },
                }
            }
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (CoreError::NotSignedIn, exit_code::AUTH),
            (
                CoreError::NoReachableHost {
                    candidates: vec!["https://a.example".into()],
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::Api {
                    message: "slow down".into(),
                    kind: FailureKind::RateLimited,
                    status: 429,
                },
                exit_code::RATE_LIMITED,
            ),
            (
                CoreError::Api {
                    message: "gone".into(),
                    kind: FailureKind::Client,
                    status: 410,
                },
                exit_code::GENERAL,
            ),
            (
                CoreError::Validation {
                    message: "bad slot".into(),
                },
                exit_code::USAGE,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn missing_api_key_is_an_auth_error() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "default".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
