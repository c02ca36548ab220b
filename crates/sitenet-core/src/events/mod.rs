// ── Side-channel events ──
//
// Audit entries and live-update broadcasts. Both are best-effort: the
// registry logs a failed delivery and keeps going.

mod activity;
mod live;

pub use activity::{
    ActivityAction, ActivityEntry, ActivityLog, MemoryActivityLog, TracingActivityLog,
};
pub use live::{BroadcastLiveUpdates, LiveUpdate, LiveUpdates};
