// ── Common types shared across the domain model ──

use serde::{Deserialize, Serialize};

/// Which path produced a device mutation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    /// Gateway snapshot reconciliation.
    Sync,
    /// A user acting through the inventory UI or CLI.
    Manual,
}

/// Who performed an action, for the activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<String>,
}

impl Actor {
    /// Actions performed by the system itself (snapshot sync, sweeps).
    pub fn system() -> Self {
        Self { user_id: None }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(id.into()),
        }
    }
}
