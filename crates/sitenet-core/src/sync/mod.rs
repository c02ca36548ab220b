// ── Snapshot synchronization ──
//
// Turns gateway discovery reports into canonical device state: the
// reconciler applies each entry through the registry, then the sweeper
// marks everything the gateway did not report as offline.

mod reconciler;
mod sweep;

pub use reconciler::SnapshotReconciler;
pub use sweep::SweepReport;
