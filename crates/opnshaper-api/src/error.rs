use std::collections::BTreeMap;

use thiserror::Error;

/// Top-level error type for the `opnshaper-api` crate.
///
/// Covers every wire-level failure mode: transport, HTTP status, payload
/// shape, and the firewall's own `result` verdicts. `opnshaper-core` maps
/// these into domain errors that carry the operation context.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// API key/secret rejected by the firewall (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Firewall verdicts ───────────────────────────────────────────
    /// `add_*`/`set_*` answered `{"result": "failed", "validations": {...}}`.
    ///
    /// Keys are the firewall's field paths (e.g. `pipe.bandwidth`), values
    /// the messages exactly as returned.
    #[error("Validation failed: {}", format_validations(.messages))]
    Validation {
        messages: BTreeMap<String, Vec<String>>,
    },

    /// `set_*` answered a bare `{"result": "failed"}`: the identifier does
    /// not exist on the firewall.
    #[error("{command}/{id}: no such item")]
    NotFound { command: String, id: String },

    /// `del_*` refused because another object still depends on this one.
    #[error("{title}: {message}")]
    Conflict { title: String, message: String },

    /// The firewall answered with a `result` value this client does not know.
    #[error("Unexpected result '{result}'")]
    UnexpectedResult { result: String },
}

impl Error {
    /// HTTP status code, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the request hit the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Render validation messages as `field: message` pairs, in field order.
pub fn format_validations(messages: &BTreeMap<String, Vec<String>>) -> String {
    if messages.is_empty() {
        return "no field messages returned".into();
    }
    messages
        .iter()
        .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{field}: {m}")))
        .collect::<Vec<_>>()
        .join("; ")
}
