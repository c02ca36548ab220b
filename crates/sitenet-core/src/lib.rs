// sitenet-core: device inventory reconciliation and topology layout.
//
// Gateways post discovery snapshots; the reconciler folds them into one
// canonical device record per physical unit, marks silent devices offline,
// and the topology builder lays the wired/wireless graph out as a tree.
// Storage, audit and live updates are ports so callers choose the backing.

pub mod bridge_role;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod store;
pub mod sync;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SyncConfig, TopologyConfig};
pub use error::{CoreError, FieldError, StoreError};
pub use events::{
    ActivityAction, ActivityEntry, ActivityLog, BroadcastLiveUpdates, LiveUpdate, LiveUpdates,
    MemoryActivityLog, TracingActivityLog,
};
pub use registry::{DeviceEdit, DeviceRegistry, RegisterDevice, Registered};
pub use store::{
    DeviceStore, MemoryDeviceStore, MemoryPlacements, MemoryProjectDirectory, PlacementChecker,
    ProjectDirectory,
};
pub use filter::DeviceFilter;
pub use sync::{SnapshotReconciler, SweepReport};
pub use topology::{EmptyReason, TopologyTree, TreeEdge, TreeLayout, TreeNode, build_tree};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Core entities
    Device, DeviceId, DeviceMetadata, DeviceStatus, DeviceType, MacAddress, Project, ProjectId,
    ProjectStatus,
    // Supporting types
    Actor, BridgeRole, Source,
    // Snapshot ingress
    FailedDevice, Snapshot, SnapshotDevice, SnapshotEntry, SyncOutcome,
    // Layout
    Connection, ConnectionKind, ConnectionMetadata, Layout, LayoutElement,
};
