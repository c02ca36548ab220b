// ── Filter predicates for device collections ──
//
// Used by listings to narrow a project's inventory without re-querying.

use crate::model::{Device, DeviceStatus, DeviceType};

/// Filter predicate for device collections.
pub enum DeviceFilter {
    All,
    ByType(DeviceType),
    ByStatus(DeviceStatus),
    Visible,
    Hidden,
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        match self {
            Self::All => true,
            Self::ByType(dt) => device.device_type == *dt,
            Self::ByStatus(status) => device.status == *status,
            Self::Visible => !device.is_hidden(),
            Self::Hidden => device.is_hidden(),
        }
    }
}
