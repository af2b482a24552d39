//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use nimbra_config::ConfigError;
use nimbra_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// A creation request was sent but the circuit never appeared.
    pub const NOT_CONFIRMED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to gateway at {url}: {reason}")]
    #[diagnostic(
        code(nimbra::connection_failed),
        help(
            "Check that the gateway is running and accessible.\n\
             URL: {url}\n\
             Try: nimbra element --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Element '{element}' is not available: {reason}")]
    #[diagnostic(
        code(nimbra::element_unavailable),
        help("The element must be in the Active state. Check it with: nimbra element")
    )]
    ElementUnavailable { element: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(nimbra::auth_failed),
        help(
            "Verify the gateway token.\n\
             Run: nimbra config set-token --profile <name>\n\
             Or set NIMBRA_TOKEN."
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nimbra::not_found),
        help("Run: nimbra {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Cannot apply '{transition}' to a reservation in status '{from}'")]
    #[diagnostic(
        code(nimbra::invalid_transition),
        help("Run: nimbra reservations show <id> to see its current status")
    )]
    InvalidTransition { transition: String, from: String },

    #[error("Circuit for reservation {id} was not confirmed")]
    #[diagnostic(
        code(nimbra::not_confirmed),
        help("The reservation was rejected. Its notes carry the reason.")
    )]
    NotConfirmed { id: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Gateway error ({code}): {message}")]
    #[diagnostic(code(nimbra::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nimbra::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nimbra::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: nimbra config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No gateway configured")]
    #[diagnostic(
        code(nimbra::no_config),
        help(
            "Create a profile with: nimbra config init\n\
             Or pass --gateway. Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(nimbra::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(nimbra::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(nimbra::timeout),
        help("Increase timeout with --timeout or check gateway responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO ────────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ElementUnavailable { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidTransition { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotConfirmed { .. } => exit_code::NOT_CONFIRMED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::ElementUnavailable { element, reason } => {
                CliError::ElementUnavailable { element, reason }
            }

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::InvalidInterfaceId { id, reason } => CliError::Validation {
                field: "interface".into(),
                reason: format!("'{id}': {reason}"),
            },

            CoreError::InvalidTransition { transition, from } => {
                CliError::InvalidTransition { transition, from }
            }

            CoreError::UnknownAction { action } => CliError::Validation {
                field: "action".into(),
                reason: format!(
                    "unknown action '{action}' (expected Select Interfaces, Approve, Reject, \
                     Terminate or Cancel)"
                ),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Rejected { message } => CliError::ApiError {
                code: "rejected".into(),
                message,
            },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "api".into(), |s| s.to_string()),
                message,
            },

            CoreError::Store { message } => CliError::ApiError {
                code: "store".into(),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let unavailable = CliError::from(CoreError::ElementUnavailable {
            element: "vision".into(),
            reason: "element is in state 'Stopped'".into(),
        });
        assert_eq!(unavailable.exit_code(), exit_code::CONNECTION);

        let transition = CliError::from(CoreError::InvalidTransition {
            transition: "ongoing_to_completed".into(),
            from: "confirmed".into(),
        });
        assert_eq!(transition.exit_code(), exit_code::CONFLICT);

        let validation = CliError::from(CoreError::ValidationFailed {
            message: "Capacity must be a positive integer".into(),
        });
        assert_eq!(validation.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "circuit".into(),
            identifier: "42".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "circuits list"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
