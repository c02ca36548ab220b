// ── Runtime engine configuration ──
//
// These types describe *how* the reconciler and topology builder behave.
// They never touch disk: sitenet-config loads a profile from TOML and the
// environment, then hands these in.

use std::time::Duration;

/// Tuning for snapshot reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Wall-clock budget for one snapshot. Entries still pending when it
    /// expires fail with `timeout` and the absence sweep is skipped.
    pub snapshot_deadline: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            snapshot_deadline: Duration::from_secs(30),
        }
    }
}

/// Tuning for the layered topology layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyConfig {
    /// Case-insensitive substring that marks a switch as backbone root.
    pub root_marker: String,
    /// Horizontal distance between adjacent depths.
    pub horizontal_spacing: f64,
    /// Vertical distance between adjacent leaves.
    pub vertical_spacing: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            root_marker: "ofc".into(),
            horizontal_spacing: 260.0,
            vertical_spacing: 120.0,
        }
    }
}
