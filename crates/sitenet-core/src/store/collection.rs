// ── Device collection ──
//
// Lock-free concurrent storage with O(1) lookups by id and by
// (project, MAC).

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::StoreError;
use crate::model::{Device, DeviceId, MacAddress, ProjectId};

type MacKey = (ProjectId, MacAddress);

/// A lock-free collection of devices across all projects.
#[derive(Default)]
pub(crate) struct DeviceCollection {
    /// Primary storage: device id -> device.
    by_id: DashMap<DeviceId, Arc<Device>>,

    /// Secondary index enforcing one device per MAC within a project.
    by_mac: DashMap<MacKey, DeviceId>,
}

impl DeviceCollection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert or update a device. Returns `true` if the id was new.
    ///
    /// Fails without touching anything if another device in the same
    /// project already owns the MAC.
    pub(crate) fn upsert(&self, device: Device) -> Result<bool, StoreError> {
        if let Some(mac) = &device.mac_address {
            match self.by_mac.entry((device.project_id, mac.clone())) {
                Entry::Occupied(owner) if *owner.get() != device.id => {
                    return Err(StoreError::DuplicateMac {
                        mac: mac.to_string(),
                    });
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(device.id);
                }
            }
        }

        let id = device.id;
        let new_mac = device.mac_address.clone();
        let previous = self.by_id.insert(id, Arc::new(device));

        // Release the index slot of a MAC the device no longer carries.
        if let Some(prev) = &previous {
            if let Some(old_mac) = &prev.mac_address {
                if new_mac.as_ref() != Some(old_mac) {
                    self.by_mac
                        .remove_if(&(prev.project_id, old_mac.clone()), |_, owner| *owner == id);
                }
            }
        }

        Ok(previous.is_none())
    }

    /// Remove a device by id. Returns the removed device if it existed.
    pub(crate) fn remove(&self, id: &DeviceId) -> Option<Arc<Device>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if let Some(device) = &removed {
            if let Some(mac) = &device.mac_address {
                self.by_mac
                    .remove_if(&(device.project_id, mac.clone()), |_, owner| owner == id);
            }
        }
        removed
    }

    pub(crate) fn get(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn get_by_mac(&self, project: ProjectId, mac: &MacAddress) -> Option<Arc<Device>> {
        let id = *self.by_mac.get(&(project, mac.clone()))?;
        self.get(&id)
    }

    /// All devices of one project, oldest first.
    pub(crate) fn project_devices(&self, project: ProjectId) -> Vec<Arc<Device>> {
        self.collect(|d| d.project_id == project)
    }

    /// Every device across all projects, oldest first.
    pub(crate) fn all(&self) -> Vec<Arc<Device>> {
        self.collect(|_| true)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    fn collect(&self, keep: impl Fn(&Device) -> bool) -> Vec<Arc<Device>> {
        let mut devices: Vec<Arc<Device>> = self
            .by_id
            .iter()
            .filter(|r| keep(r.value()))
            .map(|r| Arc::clone(r.value()))
            .collect();
        devices.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        devices
    }
}
