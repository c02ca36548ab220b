// ── Unified domain model ──
//
// Every type in this module is the canonical representation of an
// inventory entity, shared by the reconciler, the registry, the topology
// builder, and external consumers (CLI, transport layers).

pub mod common;
pub mod entity_id;

pub mod device;
pub mod layout;
pub mod project;
pub mod snapshot;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use sitenet_core::model::*` gives you everything.

// Core identity
pub use entity_id::{DeviceId, MacAddress, ProjectId};

// Common building blocks
pub use common::{Actor, Source};

// Device
pub use device::{BridgeRole, Device, DeviceMetadata, DeviceStatus, DeviceType};

// Project
pub use project::{Project, ProjectStatus};

// Snapshot ingress
pub use snapshot::{FailedDevice, Snapshot, SnapshotDevice, SnapshotEntry, SyncOutcome};

// Layout
pub use layout::{Connection, ConnectionKind, ConnectionMetadata, Layout, LayoutElement};
