//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netops_config::ConfigError;
use netops_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(netops::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(netops::auth_failed),
        help(
            "Verify the API key and access token of the active profile.\n\
             Run: netops config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(netops::no_credentials),
        help(
            "Configure credentials with: netops config init\n\
             Or set the NETOPS_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(netops::permission_denied),
        help(
            "Role-gated commands need an acting user with the right role.\n\
             Set one with --acting-user or: netops config set acting_user <profile-id>"
        )
    )]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netops::not_found),
        help("Run: netops {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Cannot move a breakdown from {from} to {to}")]
    #[diagnostic(
        code(netops::invalid_transition),
        help(
            "Allowed: open -> investigating -> in_progress -> resolved -> closed\n\
             (investigating may go straight to resolved)."
        )
    )]
    InvalidTransition { from: String, to: String },

    #[error("Breakdown {id} changed underneath you: expected {expected}, found {actual}")]
    #[diagnostic(
        code(netops::conflict),
        help("Re-read it with: netops breakdowns get {id}")
    )]
    Conflict {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Rejected by the backend: {message}")]
    #[diagnostic(code(netops::constraint))]
    Constraint { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(netops::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netops::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netops::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: netops config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(netops::no_config),
        help(
            "Create one with: netops config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(netops::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(netops::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(netops::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("Export failed: {message}")]
    #[diagnostic(code(netops::export))]
    Export { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidTransition { .. } | Self::Conflict { .. } | Self::Constraint { .. } => {
                exit_code::CONFLICT
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
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

            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type).into(),
                resource_type: entity_type,
                identifier,
            },

            CoreError::InvalidTransition { from, to } => CliError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            },

            CoreError::Conflict {
                id,
                expected,
                actual,
            } => CliError::Conflict {
                id,
                expected: expected.to_string(),
                actual: actual.to_string(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Constraint { message, code: _ } => CliError::Constraint { message },

            CoreError::Export { message } => CliError::Export { message },

            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown".into()),
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

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "breakdown" => "breakdowns list",
        "energy record" => "energy list",
        "user" => "users list",
        "site" => "sites list",
        "equipment" => "equipment list",
        _ => "dashboard",
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "run `netops config profiles`".into(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use netops_core::BreakdownStatus;

    use super::*;

    #[test]
    fn lifecycle_errors_exit_with_conflict() {
        let err = CliError::from(CoreError::InvalidTransition {
            from: BreakdownStatus::Open,
            to: BreakdownStatus::Closed,
        });
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(err.to_string(), "Cannot move a breakdown from open to closed");
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "breakdown".into(),
            identifier: "b-9".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(
            err,
            CliError::NotFound { ref list_command, .. } if list_command == "breakdowns list"
        ));
    }

    #[test]
    fn role_denial_is_permission_exit() {
        let err = CliError::from(CoreError::PermissionDenied {
            message: "admin only".into(),
        });
        assert_eq!(err.exit_code(), exit_code::PERMISSION);
    }
}
