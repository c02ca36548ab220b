// ── Live updates ──
//
// Fan-out of device changes to connected dashboards.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::model::{Device, DeviceId, ProjectId};

const DEFAULT_CAPACITY: usize = 256;

/// A change pushed to live subscribers of a project.
#[derive(Debug, Clone)]
pub enum LiveUpdate {
    DeviceUpdated {
        project_id: ProjectId,
        device: Arc<Device>,
    },
    DevicesRemoved {
        project_id: ProjectId,
        ids: Vec<DeviceId>,
    },
}

impl LiveUpdate {
    pub fn project_id(&self) -> ProjectId {
        match self {
            Self::DeviceUpdated { project_id, .. } | Self::DevicesRemoved { project_id, .. } => {
                *project_id
            }
        }
    }
}

/// Publishes live updates. Delivery is fire-and-forget.
pub trait LiveUpdates: Send + Sync {
    fn publish(&self, update: LiveUpdate);
}

/// `tokio::sync::broadcast`-backed publisher.
///
/// Publishing with no subscribers is not an error; lagging subscribers
/// lose the oldest updates.
pub struct BroadcastLiveUpdates {
    tx: broadcast::Sender<LiveUpdate>,
}

impl BroadcastLiveUpdates {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveUpdate> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastLiveUpdates {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveUpdates for BroadcastLiveUpdates {
    fn publish(&self, update: LiveUpdate) {
        if self.tx.send(update).is_err() {
            tracing::trace!("live update dropped, no subscribers");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_updates() {
        let live = BroadcastLiveUpdates::new();
        let mut rx = live.subscribe();
        let project = ProjectId::new();
        let id = DeviceId::new();

        live.publish(LiveUpdate::DevicesRemoved {
            project_id: project,
            ids: vec![id],
        });

        match rx.recv().await.unwrap() {
            LiveUpdate::DevicesRemoved { project_id, ids } => {
                assert_eq!(project_id, project);
                assert_eq!(ids, vec![id]);
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let live = BroadcastLiveUpdates::new();
        live.publish(LiveUpdate::DevicesRemoved {
            project_id: ProjectId::new(),
            ids: Vec::new(),
        });
    }
}
