// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Nimbra Vision element.
// They carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use nimbra_api::transport::{TlsMode, TransportConfig};

use crate::poll::RetryPolicy;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (lab gateways with self-signed certs).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for talking to a single Nimbra Vision element.
///
/// Built by the CLI, passed to `Controller::connect` -- core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Gateway URL (e.g., `https://dataminer.example`).
    pub url: Url,
    /// Name of the Nimbra Vision element behind the gateway.
    pub element: String,
    /// Optional bearer token.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Confirmation polling budget used by approval.
    pub retry: RetryPolicy,
}

impl ControllerConfig {
    pub fn new(url: Url, element: impl Into<String>) -> Self {
        Self {
            url,
            element: element.into(),
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::workflow(),
        }
    }

    /// Transport settings for the api crate.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            token: self.token.clone(),
        }
    }
}
