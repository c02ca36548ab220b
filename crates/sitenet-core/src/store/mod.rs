// ── Persistence ports ──
//
// The reconciler and registry talk to storage only through these traits.
// Production deployments back them with a database; the memory adapters
// in this module back the CLI and the test suite.

mod collection;
mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Device, DeviceId, DeviceType, MacAddress, Project, ProjectId};

pub use memory::{MemoryDeviceStore, MemoryPlacements, MemoryProjectDirectory};

/// Device persistence, scoped to a project on every query.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn find_by_id(
        &self,
        project: ProjectId,
        id: DeviceId,
    ) -> Result<Option<Device>, StoreError>;

    async fn find_by_mac(
        &self,
        project: ProjectId,
        mac: &MacAddress,
    ) -> Result<Option<Device>, StoreError>;

    async fn find_by_ip(&self, project: ProjectId, ip: &str) -> Result<Option<Device>, StoreError>;

    async fn find_by_type_and_name(
        &self,
        project: ProjectId,
        device_type: &DeviceType,
        name: &str,
    ) -> Result<Option<Device>, StoreError>;

    /// Insert or replace a device by id.
    ///
    /// Must reject a MAC already owned by another device of the same
    /// project with [`StoreError::DuplicateMac`].
    async fn save(&self, device: Device) -> Result<Device, StoreError>;

    /// All devices of a project, oldest first.
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Device>, StoreError>;

    /// Delete devices by id, returning the ones that existed.
    async fn delete(&self, project: ProjectId, ids: &[DeviceId])
    -> Result<Vec<Device>, StoreError>;
}

/// Lookup of projects by the short code gateways use.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn find_by_code(&self, code: u8) -> Result<Option<Project>, StoreError>;
}

/// Answers whether a device is referenced by any saved layout.
#[async_trait]
pub trait PlacementChecker: Send + Sync {
    async fn is_placed(&self, device: DeviceId) -> Result<bool, StoreError>;
}
