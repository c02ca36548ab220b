// ── Project domain types ──

use serde::{Deserialize, Serialize};

use super::entity_id::ProjectId;

/// Lifecycle status of a project. Only `Active` projects accept snapshots.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProjectStatus {
    #[default]
    Active,
    Suspended,
    Archived,
}

/// A construction site (or any other deployment) that owns a device inventory.
///
/// Gateways address projects by their short numeric `code`, which fits in a
/// single byte on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub code: u8,
    pub name: String,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Project {
    pub fn is_active(&self) -> bool {
        matches!(self.status, ProjectStatus::Active)
    }
}
