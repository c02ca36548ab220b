// ── In-memory adapters ──

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use super::collection::DeviceCollection;
use super::{DeviceStore, PlacementChecker, ProjectDirectory};
use crate::error::StoreError;
use crate::model::{Device, DeviceId, DeviceType, MacAddress, Project, ProjectId};

/// Device store held entirely in memory.
pub struct MemoryDeviceStore {
    devices: DeviceCollection,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            devices: DeviceCollection::new(),
        }
    }

    /// Seed a store from previously persisted devices.
    pub fn with_devices(devices: impl IntoIterator<Item = Device>) -> Result<Self, StoreError> {
        let store = Self::new();
        for device in devices {
            store.devices.upsert(device)?;
        }
        Ok(store)
    }

    /// Every device across all projects, oldest first.
    pub fn all(&self) -> Vec<Device> {
        self.devices
            .all()
            .iter()
            .map(|d| Device::clone(d))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.len() == 0
    }

    fn scan(&self, project: ProjectId, pred: impl Fn(&Device) -> bool) -> Option<Device> {
        self.devices
            .project_devices(project)
            .into_iter()
            .find(|d| pred(d.as_ref()))
            .map(|d| Device::clone(&d))
    }
}

impl Default for MemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn find_by_id(
        &self,
        project: ProjectId,
        id: DeviceId,
    ) -> Result<Option<Device>, StoreError> {
        Ok(self
            .devices
            .get(&id)
            .filter(|d| d.project_id == project)
            .map(|d| Device::clone(&d)))
    }

    async fn find_by_mac(
        &self,
        project: ProjectId,
        mac: &MacAddress,
    ) -> Result<Option<Device>, StoreError> {
        Ok(self
            .devices
            .get_by_mac(project, mac)
            .map(|d| Device::clone(&d)))
    }

    async fn find_by_ip(&self, project: ProjectId, ip: &str) -> Result<Option<Device>, StoreError> {
        Ok(self.scan(project, |d| d.ip_address.as_deref() == Some(ip)))
    }

    async fn find_by_type_and_name(
        &self,
        project: ProjectId,
        device_type: &DeviceType,
        name: &str,
    ) -> Result<Option<Device>, StoreError> {
        Ok(self.scan(project, |d| &d.device_type == device_type && d.name == name))
    }

    async fn save(&self, device: Device) -> Result<Device, StoreError> {
        self.devices.upsert(device.clone())?;
        Ok(device)
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Device>, StoreError> {
        Ok(self
            .devices
            .project_devices(project)
            .into_iter()
            .map(|d| Device::clone(&d))
            .collect())
    }

    async fn delete(
        &self,
        project: ProjectId,
        ids: &[DeviceId],
    ) -> Result<Vec<Device>, StoreError> {
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            let owned = self
                .devices
                .get(id)
                .is_some_and(|d| d.project_id == project);
            if owned {
                if let Some(device) = self.devices.remove(id) {
                    removed.push(Device::clone(&device));
                }
            }
        }
        Ok(removed)
    }
}

// ── Projects ─────────────────────────────────────────────────────────

/// Project directory keyed by gateway code.
#[derive(Default)]
pub struct MemoryProjectDirectory {
    by_code: DashMap<u8, Arc<Project>>,
}

impl MemoryProjectDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let dir = Self::new();
        for project in projects {
            dir.insert(project);
        }
        dir
    }

    /// Register a project, replacing any previous one with the same code.
    pub fn insert(&self, project: Project) {
        self.by_code.insert(project.code, Arc::new(project));
    }

    pub fn all(&self) -> Vec<Project> {
        let mut all: Vec<Project> = self
            .by_code
            .iter()
            .map(|r| Project::clone(r.value()))
            .collect();
        all.sort_by_key(|p| p.code);
        all
    }
}

#[async_trait]
impl ProjectDirectory for MemoryProjectDirectory {
    async fn find_by_code(&self, code: u8) -> Result<Option<Project>, StoreError> {
        Ok(self.by_code.get(&code).map(|r| Project::clone(r.value())))
    }
}

// ── Placements ───────────────────────────────────────────────────────

/// Set of devices currently placed on a layout.
#[derive(Default)]
pub struct MemoryPlacements {
    placed: DashSet<DeviceId>,
}

impl MemoryPlacements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placed(ids: impl IntoIterator<Item = DeviceId>) -> Self {
        let placements = Self::new();
        for id in ids {
            placements.place(id);
        }
        placements
    }

    pub fn place(&self, device: DeviceId) {
        self.placed.insert(device);
    }

    pub fn unplace(&self, device: DeviceId) -> bool {
        self.placed.remove(&device).is_some()
    }

    pub fn all(&self) -> Vec<DeviceId> {
        let mut all: Vec<DeviceId> = self.placed.iter().map(|r| *r).collect();
        all.sort();
        all
    }
}

#[async_trait]
impl PlacementChecker for MemoryPlacements {
    async fn is_placed(&self, device: DeviceId) -> Result<bool, StoreError> {
        Ok(self.placed.contains(&device))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceMetadata, DeviceStatus, ProjectStatus};
    use chrono::Utc;

    fn camera(project: ProjectId, mac: &str, ip: &str, name: &str) -> Device {
        let now = Utc::now();
        Device {
            id: DeviceId::new(),
            project_id: project,
            name: name.into(),
            device_type: DeviceType::Camera,
            mac_address: Some(MacAddress::parse(mac).unwrap()),
            ip_address: Some(ip.into()),
            status: DeviceStatus::Online,
            metadata: DeviceMetadata::default(),
            last_seen_at: Some(now),
            hidden_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lookups_are_scoped_to_project() {
        let store = MemoryDeviceStore::new();
        let project = ProjectId::new();
        let other = ProjectId::new();
        let cam = camera(project, "00:11:22:33:44:55", "10.0.0.5", "Gate");
        store.save(cam.clone()).await.unwrap();

        assert!(store.find_by_id(project, cam.id).await.unwrap().is_some());
        assert!(store.find_by_id(other, cam.id).await.unwrap().is_none());
        assert!(store.find_by_ip(other, "10.0.0.5").await.unwrap().is_none());

        let by_name = store
            .find_by_type_and_name(project, &DeviceType::Camera, "Gate")
            .await
            .unwrap();
        assert_eq!(by_name.map(|d| d.id), Some(cam.id));
        assert!(
            store
                .find_by_type_and_name(project, &DeviceType::Nvr, "Gate")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_ignores_foreign_ids() {
        let store = MemoryDeviceStore::new();
        let project = ProjectId::new();
        let cam = camera(project, "00:11:22:33:44:55", "10.0.0.5", "Gate");
        store.save(cam.clone()).await.unwrap();

        let removed = store.delete(ProjectId::new(), &[cam.id]).await.unwrap();
        assert!(removed.is_empty());
        let removed = store.delete(project, &[cam.id]).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn seeding_rejects_duplicate_macs() {
        let project = ProjectId::new();
        let res = MemoryDeviceStore::with_devices([
            camera(project, "00:11:22:33:44:55", "10.0.0.5", "Gate"),
            camera(project, "00-11-22-33-44-55", "10.0.0.6", "Yard"),
        ]);
        assert!(matches!(res, Err(StoreError::DuplicateMac { .. })));
    }

    #[tokio::test]
    async fn projects_resolve_by_code() {
        let dir = MemoryProjectDirectory::with_projects([Project {
            id: ProjectId::new(),
            code: 9,
            name: "North Yard".into(),
            status: ProjectStatus::Active,
        }]);
        assert!(dir.find_by_code(9).await.unwrap().is_some());
        assert!(dir.find_by_code(10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn placements_track_membership() {
        let placements = MemoryPlacements::new();
        let id = DeviceId::new();
        assert!(!placements.is_placed(id).await.unwrap());
        placements.place(id);
        assert!(placements.is_placed(id).await.unwrap());
        assert!(placements.unplace(id));
        assert!(!placements.is_placed(id).await.unwrap());
    }
}
