// ── Core error types ──
//
// User-facing errors from nimbra-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<nimbra_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach element gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Gateway request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Element {element} is unavailable: {reason}")]
    ElementUnavailable { element: String, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Malformed interface identifier '{id}': {reason}")]
    InvalidInterfaceId { id: String, reason: String },

    // ── Workflow errors ──────────────────────────────────────────────
    #[error("Transition {transition} is not allowed from status {from}")]
    InvalidTransition { transition: String, from: String },

    #[error("Unsupported workflow action: {action}")]
    UnknownAction { action: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by element: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Storage errors ───────────────────────────────────────────────
    #[error("Reservation store error: {message}")]
    Store { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nimbra_api::Error> for CoreError {
    fn from(err: nimbra_api::Error) -> Self {
        match err {
            nimbra_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "Gateway rejected the access token".into(),
            },
            nimbra_api::Error::InvalidToken { message } => {
                CoreError::AuthenticationFailed { message }
            }
            nimbra_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            nimbra_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            nimbra_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            nimbra_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            nimbra_api::Error::Gateway { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            nimbra_api::Error::ElementNotFound { name } => CoreError::ElementUnavailable {
                element: name,
                reason: "element does not exist".into(),
            },
            nimbra_api::Error::Rejected { message } => CoreError::Rejected { message },
            nimbra_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
