// ── Device domain types ──

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity_id::{DeviceId, MacAddress, ProjectId};

/// Canonical device type.
///
/// Gateway snapshots only ever produce the four known kinds; manual
/// registration may carry any free-text type, kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Camera,
    Nvr,
    Bridge,
    Switch,
    Other(String),
}

impl DeviceType {
    pub fn label(&self) -> &str {
        match self {
            Self::Camera => "Camera",
            Self::Nvr => "NVR",
            Self::Bridge => "Bridge",
            Self::Switch => "Switch",
            Self::Other(s) => s,
        }
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self, Self::Bridge)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for DeviceType {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "camera" => Self::Camera,
            "nvr" => Self::Nvr,
            "bridge" => Self::Bridge,
            "switch" => Self::Switch,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for DeviceType {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<DeviceType> for String {
    fn from(t: DeviceType) -> Self {
        match t {
            DeviceType::Other(s) => s,
            known => known.label().to_owned(),
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Device operational status.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
    #[default]
    Unknown,
}

/// Operating mode of a wireless bridge.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum BridgeRole {
    /// Access point (master side of the link).
    #[serde(rename = "AP")]
    #[strum(serialize = "AP")]
    Ap,
    /// Station / client side of the link.
    #[serde(rename = "ST")]
    #[strum(serialize = "ST")]
    St,
}

/// Open metadata bag attached to a device.
///
/// The keys the reconciler understands are typed; anything else a caller
/// stores survives untouched in `extra`. Updates are shallow merges: a key
/// present in the patch replaces the stored value, absent keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_mac: Option<MacAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_role: Option<BridgeRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_statuses: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceMetadata {
    /// Shallow-merge `patch` into `self`.
    pub fn merge(&mut self, patch: DeviceMetadata) {
        let DeviceMetadata {
            model,
            gateway_mac,
            gateway_ip,
            scanned_at,
            metrics,
            bridge_role,
            extra_statuses,
            extra,
        } = patch;

        if model.is_some() {
            self.model = model;
        }
        if gateway_mac.is_some() {
            self.gateway_mac = gateway_mac;
        }
        if gateway_ip.is_some() {
            self.gateway_ip = gateway_ip;
        }
        if scanned_at.is_some() {
            self.scanned_at = scanned_at;
        }
        if metrics.is_some() {
            self.metrics = metrics;
        }
        if bridge_role.is_some() {
            self.bridge_role = bridge_role;
        }
        if extra_statuses.is_some() {
            self.extra_statuses = extra_statuses;
        }
        self.extra.extend(extra);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The canonical inventory record for one physical device in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub mac_address: Option<MacAddress>,
    pub ip_address: Option<String>,
    pub status: DeviceStatus,
    #[serde(default)]
    pub metadata: DeviceMetadata,
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hidden_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn is_hidden(&self) -> bool {
        self.hidden_at.is_some()
    }

    /// Lower-cased MAC string used for "seen" bookkeeping.
    pub fn mac_key(&self) -> Option<&str> {
        self.mac_address.as_ref().map(MacAddress::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn device_type_round_trips_known_and_free_text() {
        assert_eq!(DeviceType::from("nvr"), DeviceType::Nvr);
        assert_eq!(DeviceType::Nvr.to_string(), "NVR");
        assert_eq!(
            DeviceType::from("Access Controller"),
            DeviceType::Other("Access Controller".into())
        );
        let json = serde_json::to_string(&DeviceType::Camera).unwrap();
        assert_eq!(json, "\"Camera\"");
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("ONLINE".parse::<DeviceStatus>().unwrap(), DeviceStatus::Online);
        assert!("flapping".parse::<DeviceStatus>().is_err());
        assert_eq!(DeviceStatus::Warning.to_string(), "warning");
    }

    #[test]
    fn bridge_role_serializes_as_short_code() {
        assert_eq!(serde_json::to_value(BridgeRole::Ap).unwrap(), json!("AP"));
        assert_eq!("st".parse::<BridgeRole>().unwrap(), BridgeRole::St);
    }

    #[test]
    fn metadata_merge_is_shallow() {
        let mut stored: DeviceMetadata = serde_json::from_value(json!({
            "model": "DS-2CD",
            "gatewayIp": "10.0.0.1",
            "floor": 3,
            "extraStatuses": ["signal-weak"]
        }))
        .unwrap();

        stored.merge(DeviceMetadata {
            model: Some("DS-2DE".into()),
            extra_statuses: Some(Vec::new()),
            ..DeviceMetadata::default()
        });

        assert_eq!(stored.model.as_deref(), Some("DS-2DE"));
        assert_eq!(stored.gateway_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(stored.extra_statuses, Some(Vec::new()));
        assert_eq!(stored.extra.get("floor"), Some(&json!(3)));
    }

    #[test]
    fn metadata_keeps_unknown_keys_on_round_trip() {
        let raw = json!({ "model": "X", "installer": "crew-7" });
        let meta: DeviceMetadata = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&meta).unwrap(), raw);
    }
}
