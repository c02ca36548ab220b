// ── Absence sweep ──

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::model::{Actor, Device, DeviceId, DeviceMetadata, DeviceStatus, ProjectId, Source};
use crate::registry::{DeviceRegistry, RegisterDevice};

/// Ids and MACs reported by the snapshot being reconciled.
#[derive(Debug, Default)]
pub(crate) struct SeenDevices {
    ids: HashSet<DeviceId>,
    macs: HashSet<String>,
}

impl SeenDevices {
    pub(crate) fn record(&mut self, device: &Device) {
        self.ids.insert(device.id);
        if let Some(mac) = device.mac_key() {
            self.macs.insert(mac.to_owned());
        }
    }

    fn contains(&self, device: &Device) -> bool {
        self.ids.contains(&device.id) || device.mac_key().is_some_and(|m| self.macs.contains(m))
    }
}

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub marked_offline: usize,
    pub failed: usize,
    /// The deadline passed before every absent device was visited.
    pub timed_out: bool,
}

/// Mark every visible, not-yet-offline device of the project that the
/// snapshot did not report as offline. Failures are logged per device.
///
/// Stops at `deadline`; devices already demoted stay demoted and are
/// counted in the returned report.
pub(crate) async fn sweep_absent(
    registry: &DeviceRegistry,
    project: ProjectId,
    seen: &SeenDevices,
    at: DateTime<Utc>,
    deadline: Instant,
) -> SweepReport {
    let mut report = SweepReport::default();

    let devices = match timeout_at(deadline, registry.list(project)).await {
        Ok(Ok(devices)) => devices,
        Ok(Err(e)) => {
            warn!(project = %project, error = %e, "absence sweep could not list devices");
            return report;
        }
        Err(_) => {
            report.timed_out = true;
            return report;
        }
    };

    for device in devices {
        if seen.contains(&device) || device.is_hidden() || device.status == DeviceStatus::Offline
        {
            continue;
        }
        if Instant::now() >= deadline {
            report.timed_out = true;
            break;
        }

        let id = device.id;
        let patch = RegisterDevice {
            status: Some(DeviceStatus::Offline),
            metadata: DeviceMetadata {
                extra_statuses: Some(Vec::new()),
                ..DeviceMetadata::default()
            },
            last_seen_at: Some(at),
            ..RegisterDevice::new(device.device_type.clone())
        };

        let merged = timeout_at(
            deadline,
            registry.merge_into(device, patch, Source::Sync, &Actor::system()),
        )
        .await;

        match merged {
            Ok(Ok(_)) => {
                debug!(project = %project, device = %id, "marked offline");
                report.marked_offline += 1;
            }
            Ok(Err(e)) => {
                warn!(project = %project, device = %id, error = %e, "failed to mark device offline");
                report.failed += 1;
            }
            Err(_) => {
                report.timed_out = true;
                break;
            }
        }
    }

    if report.timed_out {
        warn!(
            project = %project,
            marked_offline = report.marked_offline,
            "snapshot deadline exceeded during absence sweep"
        );
    }

    report
}
