// ── Core error types ──
//
// Domain errors from opnshaper-core. Every fatal error names the operation
// that failed (entity kind, verb, identifier when known) so a failing
// mutation can be located in the desired-state input. `from_api` translates
// wire-level errors into these variants.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::EntityId;
use crate::registry::EnumKind;

// ── Operation context ────────────────────────────────────────────────

/// The three shaper entity types.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Pipe,
    Queue,
    Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
    #[strum(serialize = "list interfaces")]
    ListInterfaces,
    Reconfigure,
}

/// What was being attempted when an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpContext {
    pub operation: Operation,
    pub kind: Option<EntityKind>,
    pub id: Option<EntityId>,
}

impl OpContext {
    pub fn new(operation: Operation, kind: EntityKind) -> Self {
        Self {
            operation,
            kind: Some(kind),
            id: None,
        }
    }

    /// Context for the service-wide reconfigure, which targets no entity.
    pub fn reconfigure() -> Self {
        Self {
            operation: Operation::Reconfigure,
            kind: None,
            id: None,
        }
    }

    /// Context for the interface inventory lookup.
    pub fn interfaces() -> Self {
        Self {
            operation: Operation::ListInterfaces,
            kind: None,
            id: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &EntityId) -> Self {
        self.id = Some(id.clone());
        self
    }
}

impl fmt::Display for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        if let Some(kind) = self.kind {
            write!(f, " {kind}")?;
        }
        if let Some(id) = &self.id {
            write!(f, " {id}")?;
        }
        Ok(())
    }
}

fn prefix(context: &Option<OpContext>) -> String {
    context.as_ref().map(|c| format!("{c}: ")).unwrap_or_default()
}

// ── Error ────────────────────────────────────────────────────────────

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote failures ──────────────────────────────────────────────
    /// Connection, timeout, TLS or non-2xx HTTP status.
    #[error("{context}: transport error: {message}")]
    Transport {
        context: OpContext,
        status: Option<u16>,
        message: String,
    },

    #[error("{context}: authentication failed: {message}")]
    AuthenticationFailed { context: OpContext, message: String },

    /// Response body did not have the expected shape.
    #[error("{context}: unexpected response: {message}")]
    Decode { context: OpContext, message: String },

    /// The identifier does not exist on the firewall (read or update).
    #[error("{context}: not found on the firewall")]
    NotFound { context: OpContext },

    /// The firewall rejected the mutation; messages are verbatim per field.
    #[error(
        "{context}: rejected by firewall: {}",
        opnshaper_api::error::format_validations(.messages)
    )]
    Validation {
        context: OpContext,
        messages: BTreeMap<String, Vec<String>>,
    },

    /// Delete refused because the entity is still referenced.
    #[error("{context}: {message}")]
    Conflict { context: OpContext, message: String },

    // ── Local checks ─────────────────────────────────────────────────
    #[error("{context}: {field} '{reference}' does not resolve to an existing {expected}")]
    UnresolvedReference {
        context: OpContext,
        field: &'static str,
        reference: String,
        expected: &'static str,
    },

    #[error("{}unknown {kind} value '{value}'", prefix(.context))]
    UnknownEnumValue {
        kind: EnumKind,
        value: String,
        context: Option<OpContext>,
    },

    #[error("{}invalid {field}: {reason}", prefix(.context))]
    InvalidField {
        field: &'static str,
        reason: String,
        context: Option<OpContext>,
    },

    // ── Commit ───────────────────────────────────────────────────────
    /// An explicit reconfigure did not report success.
    #[error("reconfigure failed: {message}")]
    CommitFailed { message: String },

    // ── Configuration / internal ─────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn unknown_enum(kind: EnumKind, value: &str) -> Self {
        Self::UnknownEnumValue {
            kind,
            value: value.to_owned(),
            context: None,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
            context: None,
        }
    }

    /// Attach an operation context to errors raised before any remote call.
    #[must_use]
    pub fn with_context(self, ctx: &OpContext) -> Self {
        match self {
            Self::UnknownEnumValue {
                kind,
                value,
                context: None,
            } => Self::UnknownEnumValue {
                kind,
                value,
                context: Some(ctx.clone()),
            },
            Self::InvalidField {
                field,
                reason,
                context: None,
            } => Self::InvalidField {
                field,
                reason,
                context: Some(ctx.clone()),
            },
            other => other,
        }
    }

    /// Re-attribute a remote failure to the operation that needed it, e.g. an
    /// interface lookup made while creating a rule.
    #[must_use]
    pub fn within(self, ctx: &OpContext) -> Self {
        let context = ctx.clone();
        match self {
            Self::Transport {
                status, message, ..
            } => Self::Transport {
                context,
                status,
                message,
            },
            Self::AuthenticationFailed { message, .. } => {
                Self::AuthenticationFailed { context, message }
            }
            Self::Decode { message, .. } => Self::Decode { context, message },
            other => other,
        }
    }

    /// Translate a wire-level error raised while performing `ctx`.
    pub fn from_api(ctx: &OpContext, err: opnshaper_api::Error) -> Self {
        use opnshaper_api::Error as Api;

        let context = ctx.clone();
        match err {
            Api::Authentication { message } => Self::AuthenticationFailed { context, message },
            Api::Transport(ref e) => Self::Transport {
                context,
                status: err.status(),
                message: if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    e.to_string()
                },
            },
            Api::Http { status, message } => Self::Transport {
                context,
                status: Some(status),
                message: format!("HTTP {status}: {message}"),
            },
            Api::Tls(message) => Self::Transport {
                context,
                status: None,
                message: format!("TLS error: {message}"),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Deserialization { message, body: _ } => Self::Decode { context, message },
            Api::UnexpectedResult { result } => Self::Decode {
                context,
                message: format!("unexpected result '{result}'"),
            },
            Api::Serialization(e) => Self::Internal(format!("{context}: cannot encode body: {e}")),
            Api::Validation { messages } => Self::Validation { context, messages },
            Api::NotFound { .. } => Self::NotFound { context },
            Api::Conflict { title, message } => Self::Conflict {
                context,
                message: if message.is_empty() {
                    title
                } else {
                    format!("{title}: {message}")
                },
            },
        }
    }

    /// The operation context, when the error carries one.
    pub fn context(&self) -> Option<&OpContext> {
        match self {
            Self::Transport { context, .. }
            | Self::AuthenticationFailed { context, .. }
            | Self::Decode { context, .. }
            | Self::Validation { context, .. }
            | Self::Conflict { context, .. }
            | Self::NotFound { context }
            | Self::UnresolvedReference { context, .. } => Some(context),
            Self::UnknownEnumValue { context, .. } | Self::InvalidField { context, .. } => {
                context.as_ref()
            }
            Self::CommitFailed { .. }
            | Self::Config { .. }
            | Self::Internal(_) => None,
        }
    }
}
