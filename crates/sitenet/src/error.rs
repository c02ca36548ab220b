//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use sitenet_config::ConfigError;
use sitenet_core::{CoreError, FieldError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sitenet::not_found),
        help("Run: sitenet {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(sitenet::conflict))]
    Conflict { message: String },

    #[error("No project selected")]
    #[diagnostic(
        code(sitenet::no_project),
        help(
            "Pass --project <code>, set SITENET_PROJECT, or set default_project in {config_path}"
        )
    )]
    NoProject { config_path: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sitenet::validation))]
    Validation { field: String, reason: String },

    #[error("Could not read {}: {reason}", .path.display())]
    #[diagnostic(
        code(sitenet::invalid_file),
        help("Check the JSON file contents and try again.")
    )]
    InvalidFile { path: PathBuf, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(sitenet::config),
        help("Inspect the resolved configuration with: sitenet config show")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(sitenet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Processing ───────────────────────────────────────────────────
    #[error("Operation timed out")]
    #[diagnostic(
        code(sitenet::timeout),
        help("Raise sync.deadline_secs in config or pass --deadline.")
    )]
    Timeout,

    #[error("Device store failure: {message}")]
    #[diagnostic(code(sitenet::store))]
    Store { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(sitenet::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(sitenet::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NoProject { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

/// Field name shown to the operator for a failed normalizer.
pub fn field_name(err: FieldError) -> &'static str {
    match err {
        FieldError::Mac => "mac",
        FieldError::Ip => "ip",
        FieldError::DeviceType => "type",
        FieldError::Timestamp => "timestamp",
        FieldError::Entry => "entry",
    }
}

impl From<FieldError> for CliError {
    fn from(err: FieldError) -> Self {
        CliError::Validation {
            field: field_name(err).into(),
            reason: err.reason().into(),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidGatewayMac { raw } => CliError::Validation {
                field: "gatewayMac".into(),
                reason: format!("'{raw}' is not a MAC address"),
            },

            CoreError::ProjectNotFound { code } => CliError::NotFound {
                resource_type: "project".into(),
                identifier: code.to_string(),
                list_command: "projects list".into(),
            },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::Conflict { message } => CliError::Conflict { message },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "device".into(),
                reason: message,
            },

            CoreError::Field(field) => field.into(),

            CoreError::Timeout => CliError::Timeout,

            CoreError::Store(err) => CliError::Store {
                message: err.to_string(),
            },

            CoreError::Internal(message) => CliError::Store { message },
        }
    }
}
