use thiserror::Error;

/// Top-level error type for the `nimbra-api` crate.
///
/// Covers transport, gateway and payload failures. `nimbra-core` maps
/// these into its own error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Gateway refused the bearer token.
    #[error("Gateway rejected the access token")]
    Unauthorized,

    /// Token could not be encoded as a header value.
    #[error("Invalid access token: {message}")]
    InvalidToken { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Gateway ─────────────────────────────────────────────────────
    /// The gateway answered with a non-success HTTP status.
    #[error("Gateway error (HTTP {status}): {message}")]
    Gateway { status: u16, message: String },

    /// The named element does not exist on the gateway.
    #[error("Element {name} does not exist")]
    ElementNotFound { name: String },

    /// The gateway processed the call but reported `success: false`.
    #[error("Element rejected the request: {message}")]
    Rejected { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON (de)serialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Gateway { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Gateway { status: 404, .. } | Self::ElementNotFound { .. } => true,
            _ => false,
        }
    }
}
