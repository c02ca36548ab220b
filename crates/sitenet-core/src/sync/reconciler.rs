// ── Snapshot reconciler ──

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use super::sweep::{SeenDevices, SweepReport, sweep_absent};
use crate::bridge_role::{BridgeHints, resolve_bridge_role};
use crate::config::SyncConfig;
use crate::error::{CoreError, FieldError};
use crate::events::ActivityAction;
use crate::model::{
    Actor, DeviceMetadata, FailedDevice, MacAddress, Snapshot, SnapshotDevice, SnapshotEntry,
    Source, SyncOutcome,
};
use crate::normalize::{
    normalize_ip, normalize_mac, normalize_text, normalize_timestamp, normalize_type,
    split_statuses,
};
use crate::registry::{DeviceRegistry, RegisterDevice};
use crate::store::ProjectDirectory;

const PROJECT_NOT_FOUND: &str = "project not found";
const TIMEOUT: &str = "timeout";

/// Applies gateway snapshots to a project's device inventory.
///
/// Entries are processed one at a time in submission order. A bad entry
/// fails alone; only an invalid gateway MAC rejects the whole snapshot.
pub struct SnapshotReconciler {
    registry: Arc<DeviceRegistry>,
    projects: Arc<dyn ProjectDirectory>,
    config: SyncConfig,
}

/// Gateway context shared by every entry of one snapshot.
struct GatewayContext {
    mac: MacAddress,
    ip: Option<String>,
    scanned_at: Option<DateTime<Utc>>,
    seen_at: DateTime<Utc>,
}

impl SnapshotReconciler {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        projects: Arc<dyn ProjectDirectory>,
        config: SyncConfig,
    ) -> Self {
        Self {
            registry,
            projects,
            config,
        }
    }

    pub async fn reconcile(&self, snapshot: &Snapshot) -> Result<SyncOutcome, CoreError> {
        let gateway_mac =
            normalize_mac(&snapshot.gateway_mac).map_err(|_| CoreError::InvalidGatewayMac {
                raw: snapshot.gateway_mac.clone(),
            })?;

        let project = match self.projects.find_by_code(snapshot.project_code).await? {
            Some(project) if project.is_active() => project,
            found => {
                warn!(
                    code = snapshot.project_code,
                    status = ?found.map(|p| p.status),
                    gateway = %gateway_mac,
                    "snapshot for unknown or inactive project"
                );
                return Ok(SyncOutcome {
                    processed: 0,
                    failed: snapshot
                        .devices
                        .iter()
                        .map(|entry| FailedDevice::new(entry.raw_mac(), PROJECT_NOT_FOUND))
                        .collect(),
                });
            }
        };

        let scanned_at = snapshot.scanned_at.as_deref().and_then(|raw| {
            normalize_timestamp(raw)
                .inspect_err(|_| warn!(raw, "unparsable scannedAt, using current time"))
                .ok()
        });
        let gateway = GatewayContext {
            mac: gateway_mac,
            ip: snapshot
                .gateway_ip
                .as_deref()
                .and_then(|raw| normalize_ip(raw).ok()),
            scanned_at,
            seen_at: scanned_at.unwrap_or_else(Utc::now),
        };

        let deadline = Instant::now() + self.config.snapshot_deadline;
        let mut outcome = SyncOutcome::default();
        let mut seen = SeenDevices::default();
        let mut timed_out = false;

        for entry in &snapshot.devices {
            let raw_mac = entry.raw_mac();
            if timed_out || Instant::now() >= deadline {
                timed_out = true;
                outcome.failed.push(FailedDevice::new(raw_mac, TIMEOUT));
                continue;
            }

            let request = match prepare_entry(entry, &gateway) {
                Ok(request) => request,
                Err(e) => {
                    debug!(mac = raw_mac, reason = %e, "rejected snapshot entry");
                    outcome.failed.push(FailedDevice::new(raw_mac, e.failure_reason()));
                    continue;
                }
            };

            let registered = timeout_at(
                deadline,
                self.registry
                    .register(project.id, request, Source::Sync, &Actor::system()),
            )
            .await;

            match registered {
                Ok(Ok(registered)) => {
                    outcome.processed += 1;
                    seen.record(&registered.device);
                }
                Ok(Err(e)) => {
                    warn!(mac = raw_mac, error = %e, "failed to apply snapshot entry");
                    outcome.failed.push(FailedDevice::new(raw_mac, e.failure_reason()));
                }
                Err(_) => {
                    timed_out = true;
                    outcome.failed.push(FailedDevice::new(raw_mac, TIMEOUT));
                }
            }
        }

        let sweep = if timed_out {
            warn!(project = %project.id, "snapshot deadline exceeded, skipping absence sweep");
            None
        } else {
            Some(sweep_absent(&self.registry, project.id, &seen, gateway.seen_at, deadline).await)
        };

        info!(
            project = %project.id,
            code = project.code,
            gateway = %gateway.mac,
            processed = outcome.processed,
            failed = outcome.failed.len(),
            marked_offline = sweep.map_or(0, |s| s.marked_offline),
            "snapshot reconciled"
        );

        self.registry
            .audit(
                project.id,
                &Actor::system(),
                ActivityAction::DeviceSync,
                sync_details(&gateway.mac, &outcome, sweep),
            )
            .await;

        Ok(outcome)
    }
}

/// Validate one entry and turn it into a registry payload.
fn prepare_entry(
    entry: &SnapshotEntry,
    gateway: &GatewayContext,
) -> Result<RegisterDevice, CoreError> {
    let entry = entry.as_device().ok_or(FieldError::Entry)?;
    let mac = normalize_mac(&entry.mac)?;
    let device_type = normalize_type(&entry.device_type)?;
    let name = normalize_text(entry.name.as_deref());
    let model = normalize_text(entry.model.as_deref());
    let ip = entry.ip.as_deref().and_then(|raw| normalize_ip(raw).ok());

    let statuses = entry.statuses.as_deref().unwrap_or_default();
    let (status, extra_statuses) = split_statuses(statuses);

    let bridge_role = if device_type.is_bridge() {
        resolve_bridge_role(&BridgeHints {
            bridge_role: entry.bridge_role.as_deref(),
            mode: entry.mode.as_deref(),
            role: entry.role.as_deref(),
            model: model.as_deref(),
            name: name.as_deref(),
            statuses,
        })
    } else {
        None
    };

    Ok(RegisterDevice {
        device_type,
        name,
        model,
        mac: Some(mac),
        ip,
        status: Some(status),
        metadata: DeviceMetadata {
            gateway_mac: Some(gateway.mac.clone()),
            gateway_ip: gateway.ip.clone(),
            scanned_at: gateway.scanned_at,
            metrics: collect_metrics(entry),
            bridge_role,
            extra_statuses: Some(extra_statuses),
            ..DeviceMetadata::default()
        },
        last_seen_at: Some(gateway.seen_at),
    })
}

/// Numeric link metrics: passthrough object fields first, then the
/// dedicated `latencyMs` / `packetLoss` fields. Non-numbers are dropped.
fn collect_metrics(entry: &SnapshotDevice) -> Option<BTreeMap<String, f64>> {
    let mut metrics = BTreeMap::new();

    if let Some(Value::Object(fields)) = &entry.metrics {
        for (key, value) in fields {
            if let Some(n) = finite(value) {
                metrics.insert(key.clone(), n);
            }
        }
    }
    if let Some(n) = entry.latency_ms.as_ref().and_then(finite) {
        metrics.insert("latencyMs".to_owned(), n);
    }
    if let Some(n) = entry.packet_loss.as_ref().and_then(finite) {
        metrics.insert("packetLoss".to_owned(), n);
    }

    (!metrics.is_empty()).then_some(metrics)
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn sync_details(gateway: &MacAddress, outcome: &SyncOutcome, sweep: Option<SweepReport>) -> Value {
    json!({
        "gatewayMac": gateway,
        "processed": outcome.processed,
        "failed": outcome.failed.len(),
        "markedOffline": sweep.map(|s| s.marked_offline),
        "sweepComplete": sweep.is_some_and(|s| !s.timed_out),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{BridgeRole, DeviceStatus, DeviceType};

    fn gateway() -> GatewayContext {
        GatewayContext {
            mac: MacAddress::parse("00:11:22:33:44:55").unwrap(),
            ip: Some("10.0.0.1".into()),
            scanned_at: None,
            seen_at: Utc::now(),
        }
    }

    fn entry(mac: &str, device_type: &str) -> SnapshotDevice {
        SnapshotDevice {
            mac: mac.into(),
            device_type: device_type.into(),
            ..SnapshotDevice::default()
        }
    }

    fn prepare(device: &SnapshotDevice) -> Result<RegisterDevice, CoreError> {
        prepare_entry(&SnapshotEntry::from(device.clone()), &gateway())
    }

    #[test]
    fn invalid_fields_map_to_wire_reasons() {
        let err = prepare(&entry("00:11", "camera")).unwrap_err();
        assert_eq!(err.failure_reason(), "mac invalid");

        let err = prepare(&entry("00:11:22:33:44:66", "printer")).unwrap_err();
        assert_eq!(err.failure_reason(), "type invalid");

        let malformed = SnapshotEntry::Malformed(json!({ "mac": "00:11:22:33:44:66", "name": 42 }));
        let err = prepare_entry(&malformed, &gateway()).unwrap_err();
        assert_eq!(err.failure_reason(), "entry invalid");
    }

    #[test]
    fn bridge_role_only_for_bridges() {
        let mut cam = entry("00:11:22:33:44:66", "camera");
        cam.bridge_role = Some("AP".into());
        let req = prepare(&cam).unwrap();
        assert_eq!(req.metadata.bridge_role, None);

        let mut bridge = entry("00:11:22:33:44:77", "bridge");
        bridge.mode = Some("station".into());
        let req = prepare(&bridge).unwrap();
        assert_eq!(req.device_type, DeviceType::Bridge);
        assert_eq!(req.metadata.bridge_role, Some(BridgeRole::St));
    }

    #[test]
    fn statuses_split_and_blank_text_dropped() {
        let mut cam = entry("00-11-22-33-44-66", "Camera");
        cam.name = Some("   ".into());
        cam.statuses = Some(vec!["WARNING".into(), "Signal-Weak".into()]);
        let req = prepare(&cam).unwrap();
        assert_eq!(req.name, None);
        assert_eq!(req.status, Some(DeviceStatus::Warning));
        assert_eq!(req.metadata.extra_statuses, Some(vec!["signal-weak".to_owned()]));
        assert_eq!(req.metadata.gateway_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn metrics_keep_finite_numbers_only() {
        let mut cam = entry("00:11:22:33:44:66", "camera");
        cam.metrics = Some(json!({ "rssi": -61, "label": "weak", "latencyMs": 5 }));
        cam.latency_ms = Some(json!(12.5));
        cam.packet_loss = Some(json!("n/a"));

        let metrics = collect_metrics(&cam).unwrap();
        assert_eq!(metrics.get("rssi"), Some(&-61.0));
        assert_eq!(metrics.get("latencyMs"), Some(&12.5));
        assert!(!metrics.contains_key("label"));
        assert!(!metrics.contains_key("packetLoss"));

        assert_eq!(collect_metrics(&entry("00:11:22:33:44:66", "camera")), None);
    }
}
