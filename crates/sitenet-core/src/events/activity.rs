// ── Activity (audit) log ──

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::model::ProjectId;

/// What an audit entry records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum ActivityAction {
    #[serde(rename = "device.sync")]
    #[strum(serialize = "device.sync")]
    DeviceSync,
    #[serde(rename = "device.create")]
    #[strum(serialize = "device.create")]
    DeviceCreate,
    #[serde(rename = "device.update")]
    #[strum(serialize = "device.update")]
    DeviceUpdate,
    #[serde(rename = "device.delete")]
    #[strum(serialize = "device.delete")]
    DeviceDelete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub project_id: ProjectId,
    /// `None` for system actions.
    pub user_id: Option<String>,
    pub action: ActivityAction,
    pub details: Value,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, entry: ActivityEntry) -> Result<(), StoreError>;
}

/// Writes audit entries as structured `tracing` events under the
/// `sitenet::activity` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLog;

#[async_trait]
impl ActivityLog for TracingActivityLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), StoreError> {
        tracing::info!(
            target: "sitenet::activity",
            project = %entry.project_id,
            user = entry.user_id.as_deref().unwrap_or("system"),
            action = %entry.action,
            details = %entry.details,
            "activity"
        );
        Ok(())
    }
}

/// Keeps audit entries in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    entries: Mutex<Vec<ActivityEntry>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().await.clone()
    }

    /// Entries with the given action, in insertion order.
    pub async fn with_action(&self, action: ActivityAction) -> Vec<ActivityEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), StoreError> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actions_use_dotted_names() {
        assert_eq!(ActivityAction::DeviceSync.to_string(), "device.sync");
        assert_eq!(
            "device.delete".parse::<ActivityAction>().unwrap(),
            ActivityAction::DeviceDelete
        );
        assert_eq!(
            serde_json::to_value(ActivityAction::DeviceUpdate).unwrap(),
            json!("device.update")
        );
    }

    #[tokio::test]
    async fn memory_log_keeps_order() {
        let log = MemoryActivityLog::new();
        let project = ProjectId::new();
        for action in [ActivityAction::DeviceCreate, ActivityAction::DeviceSync] {
            log.record(ActivityEntry {
                project_id: project,
                user_id: None,
                action,
                details: json!({}),
                at: Utc::now(),
            })
            .await
            .unwrap();
        }
        let entries = log.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].action, ActivityAction::DeviceSync);
        assert_eq!(log.with_action(ActivityAction::DeviceCreate).await.len(), 1);
    }
}
