// ── Runtime connection configuration ──
//
// These types describe *how* to reach a firewall. They carry credential data
// and connection tuning, but never touch disk. The CLI resolves profiles
// into a `ShaperConfig` and hands it in.

use std::time::Duration;

use opnshaper_api::{ApiCredentials, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// API key and secret for basic auth.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: SecretString,
}

impl From<Credentials> for ApiCredentials {
    fn from(c: Credentials) -> Self {
        Self {
            key: c.key,
            secret: c.secret,
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (factory self-signed certificate).
    DangerAcceptInvalid,
}

/// Configuration for one firewall.
#[derive(Debug, Clone)]
pub struct ShaperConfig {
    /// Firewall URL (e.g., `https://10.0.0.1`).
    pub url: Url,
    /// `None` only for test doubles that skip authentication.
    pub credentials: Option<Credentials>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ShaperConfig {
    pub fn new(url: Url, credentials: Credentials) -> Self {
        Self {
            url,
            credentials: Some(credentials),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
