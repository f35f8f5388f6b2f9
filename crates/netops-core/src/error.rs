// ── Core error types ──
//
// Domain-facing errors from netops-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<netops_api::Error>`
// impl folds transport-layer failures into these variants.

use thiserror::Error;

use crate::model::BreakdownStatus;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Access errors ────────────────────────────────────────────────
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: BreakdownStatus,
        to: BreakdownStatus,
    },

    #[error("Conflict on breakdown {id}: expected status {expected}, found {actual}")]
    Conflict {
        id: String,
        expected: BreakdownStatus,
        actual: BreakdownStatus,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Rejected by backend constraint: {message}")]
    Constraint {
        message: String,
        code: Option<String>,
    },

    #[error("Export failed: {message}")]
    Export { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Backend error code (e.g. a Postgres SQLSTATE).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

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

    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netops_api::Error> for CoreError {
    fn from(err: netops_api::Error) -> Self {
        match err {
            netops_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            netops_api::Error::PermissionDenied { message } => {
                CoreError::PermissionDenied { message }
            }
            netops_api::Error::Transport(ref e) => {
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
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            netops_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netops_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            netops_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            netops_api::Error::Constraint {
                message,
                code,
                details,
            } => CoreError::Constraint {
                message: match details {
                    Some(d) => format!("{message} ({d})"),
                    None => message,
                },
                code,
            },
            netops_api::Error::Api {
                status,
                message,
                code,
                hint,
                ..
            } => CoreError::Api {
                message: match hint {
                    Some(h) => format!("{message} (hint: {h})"),
                    None => message,
                },
                code,
                status: Some(status),
            },
            netops_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            netops_api::Error::ContentRange(raw) => {
                CoreError::Internal(format!("Unreadable row count: {raw:?}"))
            }
            netops_api::Error::UnfilteredWrite { verb, table } => {
                CoreError::Internal(format!("Refused unfiltered {verb} on {table}"))
            }
        }
    }
}
