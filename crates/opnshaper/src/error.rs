//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use opnshaper_config::ConfigError;
use opnshaper_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{context}: could not reach the firewall")]
    #[diagnostic(
        code(opnshaper::connection_failed),
        help(
            "Check that the firewall is reachable and the URL is right.\n\
             Cause: {message}\n\
             Self-signed certificate? Use --insecure (-k) or set ca_cert in the profile."
        )
    )]
    ConnectionFailed { context: String, message: String },

    #[error("{context}: request timed out")]
    #[diagnostic(
        code(opnshaper::timeout),
        help("Increase the timeout with --timeout or check firewall responsiveness.")
    )]
    Timeout { context: String },

    #[error("{context}: firewall answered HTTP {status}")]
    #[diagnostic(code(opnshaper::http), help("{message}"))]
    Http {
        context: String,
        status: u16,
        message: String,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(opnshaper::auth_failed),
        help(
            "Verify the API key and secret (System > Access > Users on the firewall).\n\
             The user needs the traffic shaper privileges.\n\
             Run: opnshaper config set-secret"
        )
    )]
    AuthFailed { message: String },

    #[error("No {what} configured for profile '{profile}'")]
    #[diagnostic(
        code(opnshaper::no_credentials),
        help(
            "Configure credentials with: opnshaper config init\n\
             Or set OPNSHAPER_API_KEY and OPNSHAPER_API_SECRET."
        )
    )]
    NoCredentials { profile: String, what: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(opnshaper::not_found),
        help("Run: opnshaper {resource_type}s list")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("{message}")]
    #[diagnostic(code(opnshaper::unresolved_reference), help("{help}"))]
    UnresolvedReference { message: String, help: String },

    #[error("{message}")]
    #[diagnostic(
        code(opnshaper::conflict),
        help("Remove or retarget the entries that still refer to it first.")
    )]
    Conflict { message: String },

    // ── Firewall answers ─────────────────────────────────────────────
    #[error("{context}: rejected by firewall")]
    #[diagnostic(code(opnshaper::rejected), help("{details}"))]
    Rejected { context: String, details: String },

    #[error("{message}")]
    #[diagnostic(code(opnshaper::unexpected_response))]
    UnexpectedResponse { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(opnshaper::commit_failed),
        help("Staged changes are kept. Retry with: opnshaper reconfigure")
    )]
    CommitFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(opnshaper::invalid_input))]
    InvalidInput { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(opnshaper::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(opnshaper::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: opnshaper config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No firewall configured")]
    #[diagnostic(
        code(opnshaper::no_config),
        help(
            "Create a profile with: opnshaper config init\n\
             Expected at: {path}\n\
             Or pass --url together with --api-key and --api-secret."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(opnshaper::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(opnshaper::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(opnshaper::json))]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    #[diagnostic(code(opnshaper::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML: {0}")]
    #[diagnostic(code(opnshaper::toml))]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(opnshaper::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Http { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::UnresolvedReference { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Rejected { .. }
            | Self::InvalidInput { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Json(_)
            | Self::Yaml(_)
            | Self::Toml(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile, what } => Self::NoCredentials {
                profile,
                what: what.into(),
            },
            ConfigError::ProfileNotFound { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn list_hint(expected: &str) -> &'static str {
    match expected {
        "pipe" => "Run: opnshaper pipes list",
        "interface" => "Run: opnshaper interfaces",
        _ => "Run: opnshaper pipes list  or  opnshaper queues list",
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Transport {
                context,
                status,
                message,
            } => match status {
                Some(status) => Self::Http {
                    context: context.to_string(),
                    status,
                    message,
                },
                None if message.starts_with("request timed out") => Self::Timeout {
                    context: context.to_string(),
                },
                None => Self::ConnectionFailed {
                    context: context.to_string(),
                    message,
                },
            },

            CoreError::AuthenticationFailed { message, .. } => Self::AuthFailed { message },

            CoreError::NotFound { context } => Self::NotFound {
                resource_type: context
                    .kind
                    .map_or_else(|| "entry".into(), |k| k.to_string()),
                identifier: context.id.map(|id| id.to_string()).unwrap_or_default(),
            },

            CoreError::UnresolvedReference { expected, .. } => Self::UnresolvedReference {
                message,
                help: list_hint(expected).into(),
            },

            CoreError::Conflict { .. } => Self::Conflict { message },

            CoreError::Validation { context, messages } => Self::Rejected {
                context: context.to_string(),
                details: messages
                    .iter()
                    .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{field}: {m}")))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::UnknownEnumValue { .. } | CoreError::InvalidField { .. } => {
                Self::InvalidInput { message }
            }

            CoreError::Decode { .. } => Self::UnexpectedResponse { message },

            CoreError::CommitFailed { .. } => Self::CommitFailed { message },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}
