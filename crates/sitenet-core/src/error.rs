// ── Core error types ──
//
// User-facing errors from sitenet-core. Storage adapters report
// `StoreError`; the `From` impl folds those into `CoreError` so the
// reconciler only ever deals with one type.

use thiserror::Error;

/// Soft failure of a single field validator.
///
/// The `Display` output doubles as the per-device failure reason reported
/// back to gateways, so the strings are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("mac invalid")]
    Mac,

    #[error("ip invalid")]
    Ip,

    #[error("type invalid")]
    DeviceType,

    #[error("timestamp invalid")]
    Timestamp,

    #[error("entry invalid")]
    Entry,
}

impl FieldError {
    /// Wire reason string, identical to the `Display` output.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Mac => "mac invalid",
            Self::Ip => "ip invalid",
            Self::DeviceType => "type invalid",
            Self::Timestamp => "timestamp invalid",
            Self::Entry => "entry invalid",
        }
    }
}

/// Errors raised by device store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MAC {mac} is already assigned to another device in this project")]
    DuplicateMac { mac: String },

    #[error("device store unavailable: {message}")]
    Unavailable { message: String },

    #[error("device store query failed: {message}")]
    Query { message: String },
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request errors ───────────────────────────────────────────────
    #[error("gateway MAC '{raw}' is invalid")]
    InvalidGatewayMac { raw: String },

    #[error("project not found")]
    ProjectNotFound { code: u8 },

    #[error("device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Business rules ───────────────────────────────────────────────
    #[error("{message}")]
    Conflict { message: String },

    #[error("validation failed: {message}")]
    ValidationFailed { message: String },

    #[error(transparent)]
    Field(#[from] FieldError),

    // ── Infrastructure ───────────────────────────────────────────────
    #[error("timeout")]
    Timeout,

    #[error(transparent)]
    Store(StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this error is a business-level outcome whose message is safe
    /// and meaningful to report back to the caller.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Internal(_))
    }

    /// Human-readable reason recorded against a failed device entry.
    pub fn failure_reason(&self) -> String {
        if self.is_domain() {
            self.to_string()
        } else {
            "unknown error".into()
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateMac { mac } => CoreError::Conflict {
                message: format!("MAC {mac} is already assigned to another device"),
            },
            other => CoreError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_render_wire_reasons() {
        assert_eq!(FieldError::Mac.to_string(), "mac invalid");
        assert_eq!(FieldError::DeviceType.to_string(), "type invalid");
        assert_eq!(FieldError::Ip.reason(), FieldError::Ip.to_string());
    }

    #[test]
    fn domain_errors_surface_their_message() {
        let err = CoreError::Conflict {
            message: "device is placed in a layout".into(),
        };
        assert_eq!(err.failure_reason(), "device is placed in a layout");
    }

    #[test]
    fn infrastructure_errors_are_masked() {
        let err = CoreError::from(StoreError::Unavailable {
            message: "connection reset".into(),
        });
        assert!(!err.is_domain());
        assert_eq!(err.failure_reason(), "unknown error");
    }

    #[test]
    fn duplicate_mac_becomes_conflict() {
        let err = CoreError::from(StoreError::DuplicateMac {
            mac: "00:11:22:33:44:55".into(),
        });
        assert!(matches!(err, CoreError::Conflict { .. }));
    }
}
