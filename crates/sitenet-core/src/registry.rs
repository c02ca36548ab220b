// ── Device registry ──
//
// Merge-or-create and the manual edit paths. Every mutation saves through
// the device store, then publishes a live update and writes an audit entry;
// neither side channel can fail the mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::events::{ActivityAction, ActivityEntry, ActivityLog, LiveUpdate, LiveUpdates};
use crate::model::{
    Actor, Device, DeviceId, DeviceMetadata, DeviceStatus, DeviceType, MacAddress, ProjectId,
    Source,
};
use crate::normalize::normalize_text;
use crate::store::{DeviceStore, PlacementChecker};
use crate::filter::DeviceFilter;

/// Payload for [`DeviceRegistry::register`].
///
/// Absent fields leave the stored value alone on a merge.
#[derive(Debug, Clone)]
pub struct RegisterDevice {
    pub device_type: DeviceType,
    pub name: Option<String>,
    pub model: Option<String>,
    pub mac: Option<MacAddress>,
    pub ip: Option<String>,
    pub status: Option<DeviceStatus>,
    pub metadata: DeviceMetadata,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl RegisterDevice {
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            device_type,
            name: None,
            model: None,
            mac: None,
            ip: None,
            status: None,
            metadata: DeviceMetadata::default(),
            last_seen_at: None,
        }
    }

    /// Display name used for new records and for the (type, name) lookup.
    fn synthesized_name(&self, now: DateTime<Utc>) -> String {
        if let Some(name) = normalize_text(self.name.as_deref()) {
            return name;
        }
        let label = self.device_type.label();
        if let Some(model) = normalize_text(self.model.as_deref()) {
            return format!("{label}-{model}");
        }
        if let Some(ip) = normalize_text(self.ip.as_deref()) {
            return format!("{label}-{ip}");
        }
        format!("{label}-{}", base36(now.timestamp_millis().unsigned_abs()))
    }
}

/// Fields a user may change on an existing device.
#[derive(Debug, Clone, Default)]
pub struct DeviceEdit {
    pub name: Option<String>,
    pub device_type: Option<DeviceType>,
    pub mac: Option<MacAddress>,
    pub ip: Option<String>,
}

/// Result of a merge-or-create.
#[derive(Debug, Clone)]
pub struct Registered {
    pub device: Device,
    pub created: bool,
}

pub struct DeviceRegistry {
    devices: Arc<dyn DeviceStore>,
    placements: Arc<dyn PlacementChecker>,
    activity: Arc<dyn ActivityLog>,
    live: Arc<dyn LiveUpdates>,
}

impl DeviceRegistry {
    pub fn new(
        devices: Arc<dyn DeviceStore>,
        placements: Arc<dyn PlacementChecker>,
        activity: Arc<dyn ActivityLog>,
        live: Arc<dyn LiveUpdates>,
    ) -> Self {
        Self {
            devices,
            placements,
            activity,
            live,
        }
    }

    // ── Merge-or-create ──────────────────────────────────────────────

    /// Merge the payload into the device it identifies, or create one.
    ///
    /// Identity is MAC-first: a known MAC always wins. Without a MAC match
    /// the IP, then (type, name), are tried, but a candidate that already
    /// carries a different MAC is never adopted.
    pub async fn register(
        &self,
        project: ProjectId,
        request: RegisterDevice,
        source: Source,
        actor: &Actor,
    ) -> Result<Registered, CoreError> {
        let now = Utc::now();
        match self.resolve_identity(project, &request, now).await? {
            Some(existing) => {
                let device = self.merge_into(existing, request, source, actor).await?;
                Ok(Registered {
                    device,
                    created: false,
                })
            }
            None => {
                let device = self.create(project, request, now, actor).await?;
                Ok(Registered {
                    device,
                    created: true,
                })
            }
        }
    }

    async fn resolve_identity(
        &self,
        project: ProjectId,
        request: &RegisterDevice,
        now: DateTime<Utc>,
    ) -> Result<Option<Device>, CoreError> {
        if let Some(mac) = &request.mac {
            if let Some(found) = self.devices.find_by_mac(project, mac).await? {
                return Ok(Some(found));
            }
        }

        let candidate = match normalize_text(request.ip.as_deref()) {
            Some(ip) => self.devices.find_by_ip(project, &ip).await?,
            None => {
                let name = request.synthesized_name(now);
                self.devices
                    .find_by_type_and_name(project, &request.device_type, &name)
                    .await?
            }
        };

        Ok(candidate.filter(|d| request.mac.is_none() || d.mac_address.is_none()))
    }

    /// Apply a payload to an existing record and save it.
    ///
    /// Sync never renames; a manual registration with a name does.
    pub(crate) async fn merge_into(
        &self,
        mut device: Device,
        request: RegisterDevice,
        source: Source,
        actor: &Actor,
    ) -> Result<Device, CoreError> {
        let RegisterDevice {
            device_type,
            name,
            model,
            mac,
            ip,
            status,
            mut metadata,
            last_seen_at,
        } = request;

        if source == Source::Manual {
            if let Some(name) = normalize_text(name.as_deref()) {
                device.name = name;
            }
        }
        if let Some(model) = normalize_text(model.as_deref()) {
            metadata.model = Some(model);
        }
        device.metadata.merge(metadata);
        device.device_type = device_type;
        if mac.is_some() {
            device.mac_address = mac;
        }
        if let Some(ip) = normalize_text(ip.as_deref()) {
            device.ip_address = Some(ip);
        }
        if let Some(status) = status {
            device.status = status;
        }
        if last_seen_at.is_some() {
            device.last_seen_at = last_seen_at;
        }
        device.updated_at = Utc::now();

        let saved = self.devices.save(device).await?;
        debug!(project = %saved.project_id, device = %saved.id, %source, "device merged");
        self.publish_updated(&saved);
        self.audit(
            saved.project_id,
            actor,
            ActivityAction::DeviceUpdate,
            json!({ "deviceId": saved.id, "source": source }),
        )
        .await;
        Ok(saved)
    }

    async fn create(
        &self,
        project: ProjectId,
        request: RegisterDevice,
        now: DateTime<Utc>,
        actor: &Actor,
    ) -> Result<Device, CoreError> {
        let name = request.synthesized_name(now);
        let RegisterDevice {
            device_type,
            model,
            mac,
            ip,
            status,
            metadata: patch,
            last_seen_at,
            ..
        } = request;

        let mut metadata = DeviceMetadata {
            model: normalize_text(model.as_deref()),
            ..DeviceMetadata::default()
        };
        metadata.merge(patch);

        let device = Device {
            id: DeviceId::new(),
            project_id: project,
            name,
            device_type,
            mac_address: mac,
            ip_address: normalize_text(ip.as_deref()),
            status: status.unwrap_or_default(),
            metadata,
            last_seen_at,
            hidden_at: None,
            created_at: now,
            updated_at: now,
        };

        let saved = self.devices.save(device).await?;
        debug!(project = %project, device = %saved.id, name = %saved.name, "device created");
        self.publish_updated(&saved);
        self.audit(
            project,
            actor,
            ActivityAction::DeviceCreate,
            json!({ "deviceId": saved.id, "name": saved.name, "type": saved.device_type }),
        )
        .await;
        Ok(saved)
    }

    // ── Manual edits ─────────────────────────────────────────────────

    /// Rename, retype or re-address a device.
    ///
    /// Type and MAC are locked while the device is placed in a layout.
    pub async fn update(
        &self,
        project: ProjectId,
        id: DeviceId,
        edit: DeviceEdit,
        actor: &Actor,
    ) -> Result<Device, CoreError> {
        let mut device = self.get(project, id).await?;

        let retyped = edit
            .device_type
            .as_ref()
            .is_some_and(|t| *t != device.device_type);
        let readdressed = edit
            .mac
            .as_ref()
            .is_some_and(|m| device.mac_address.as_ref() != Some(m));
        if (retyped || readdressed) && self.placements.is_placed(id).await? {
            return Err(CoreError::Conflict {
                message: format!(
                    "device '{}' is placed in a layout; remove it from the layout before changing its type or MAC",
                    device.name
                ),
            });
        }

        if let Some(name) = edit.name {
            device.name = normalize_text(Some(name.as_str())).ok_or_else(|| CoreError::ValidationFailed {
                message: "name must not be blank".into(),
            })?;
        }
        if let Some(device_type) = edit.device_type {
            device.device_type = device_type;
        }
        if edit.mac.is_some() {
            device.mac_address = edit.mac;
        }
        if let Some(ip) = edit.ip {
            device.ip_address = normalize_text(Some(ip.as_str()));
        }
        device.updated_at = Utc::now();

        let saved = self.devices.save(device).await?;
        self.publish_updated(&saved);
        self.audit(
            project,
            actor,
            ActivityAction::DeviceUpdate,
            json!({ "deviceId": saved.id, "source": Source::Manual }),
        )
        .await;
        Ok(saved)
    }

    /// Hide a device from sweeps and placement listings, or show it again.
    pub async fn set_hidden(
        &self,
        project: ProjectId,
        id: DeviceId,
        hidden: bool,
        actor: &Actor,
    ) -> Result<Device, CoreError> {
        let mut device = self.get(project, id).await?;
        if device.is_hidden() == hidden {
            return Ok(device);
        }

        let now = Utc::now();
        device.hidden_at = hidden.then_some(now);
        device.updated_at = now;

        let saved = self.devices.save(device).await?;
        self.publish_updated(&saved);
        self.audit(
            project,
            actor,
            ActivityAction::DeviceUpdate,
            json!({ "deviceId": saved.id, "hidden": hidden }),
        )
        .await;
        Ok(saved)
    }

    /// Delete devices. All-or-nothing: if any id is unknown or placed,
    /// nothing is deleted.
    pub async fn remove(
        &self,
        project: ProjectId,
        ids: &[DeviceId],
        actor: &Actor,
    ) -> Result<Vec<Device>, CoreError> {
        let mut placed = Vec::new();
        for id in ids {
            let device = self.get(project, *id).await?;
            if self.placements.is_placed(*id).await? {
                placed.push(device.name);
            }
        }
        if !placed.is_empty() {
            return Err(CoreError::Conflict {
                message: format!(
                    "devices placed in a layout cannot be removed: {}",
                    placed.join(", ")
                ),
            });
        }

        let removed = self.devices.delete(project, ids).await?;
        let removed_ids: Vec<DeviceId> = removed.iter().map(|d| d.id).collect();
        self.live.publish(LiveUpdate::DevicesRemoved {
            project_id: project,
            ids: removed_ids.clone(),
        });
        self.audit(
            project,
            actor,
            ActivityAction::DeviceDelete,
            json!({ "deviceIds": removed_ids }),
        )
        .await;
        Ok(removed)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn list(&self, project: ProjectId) -> Result<Vec<Device>, CoreError> {
        Ok(self.devices.list_by_project(project).await?)
    }

    pub async fn list_filtered(
        &self,
        project: ProjectId,
        filter: &DeviceFilter,
    ) -> Result<Vec<Device>, CoreError> {
        let mut devices = self.list(project).await?;
        devices.retain(|d| filter.matches(d));
        Ok(devices)
    }

    pub async fn get(&self, project: ProjectId, id: DeviceId) -> Result<Device, CoreError> {
        self.devices
            .find_by_id(project, id)
            .await?
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: id.to_string(),
            })
    }

    /// Devices a layout editor may still place: visible and not yet placed.
    pub async fn available_for_placement(
        &self,
        project: ProjectId,
    ) -> Result<Vec<Device>, CoreError> {
        let mut available = Vec::new();
        for device in self.list_filtered(project, &DeviceFilter::Visible).await? {
            if !self.placements.is_placed(device.id).await? {
                available.push(device);
            }
        }
        Ok(available)
    }

    // ── Side channels ────────────────────────────────────────────────

    fn publish_updated(&self, device: &Device) {
        self.live.publish(LiveUpdate::DeviceUpdated {
            project_id: device.project_id,
            device: Arc::new(device.clone()),
        });
    }

    /// Record an audit entry; failures are logged and swallowed.
    pub(crate) async fn audit(
        &self,
        project: ProjectId,
        actor: &Actor,
        action: ActivityAction,
        details: Value,
    ) {
        let entry = ActivityEntry {
            project_id: project,
            user_id: actor.user_id.clone(),
            action,
            details,
            at: Utc::now(),
        };
        if let Err(e) = self.activity.record(entry).await {
            warn!(project = %project, %action, error = %e, "failed to write activity entry");
        }
    }
}

fn base36(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        let digit = u32::try_from(n % 36)
            .ok()
            .and_then(|d| char::from_digit(d, 36))
            .unwrap_or('0');
        digits.push(digit);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}
