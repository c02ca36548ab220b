// ── Snapshot ingress wire types ──
//
// Shapes posted by field gateways. Device entries are decoded one by one:
// a malformed entry fails only itself, never the whole batch.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One discovery report from a gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub project_code: u8,
    pub gateway_mac: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<String>,
    #[serde(default)]
    pub devices: Vec<SnapshotEntry>,
}

/// One element of [`Snapshot::devices`], kept even when it does not decode.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SnapshotEntry {
    Device(SnapshotDevice),
    /// Not an object, or a field of the wrong JSON type.
    Malformed(Value),
}

impl SnapshotEntry {
    /// The `mac` field exactly as sent, or `""` when there is none.
    pub fn raw_mac(&self) -> &str {
        match self {
            Self::Device(device) => &device.mac,
            Self::Malformed(raw) => raw.get("mac").and_then(Value::as_str).unwrap_or_default(),
        }
    }

    pub fn as_device(&self) -> Option<&SnapshotDevice> {
        match self {
            Self::Device(device) => Some(device),
            Self::Malformed(_) => None,
        }
    }
}

impl From<SnapshotDevice> for SnapshotEntry {
    fn from(device: SnapshotDevice) -> Self {
        Self::Device(device)
    }
}

impl<'de> Deserialize<'de> for SnapshotEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if !raw.is_object() {
            return Ok(Self::Malformed(raw));
        }
        match SnapshotDevice::deserialize(&raw) {
            Ok(device) => Ok(Self::Device(device)),
            Err(_) => Ok(Self::Malformed(raw)),
        }
    }
}

/// A single device entry inside a [`Snapshot`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDevice {
    #[serde(default)]
    pub mac: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_loss: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A device entry the reconciler could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDevice {
    /// The MAC exactly as the gateway sent it, when it sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    pub reason: String,
}

impl FailedDevice {
    pub fn new(raw_mac: &str, reason: impl Into<String>) -> Self {
        let mac = if raw_mac.trim().is_empty() {
            None
        } else {
            Some(raw_mac.to_owned())
        };
        Self {
            mac,
            reason: reason.into(),
        }
    }
}

/// Result of reconciling one snapshot, returned to the gateway verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub processed: usize,
    pub failed: Vec<FailedDevice>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wire_shape() {
        let snap: Snapshot = serde_json::from_value(json!({
            "projectCode": 9,
            "gatewayMac": "00-11-22-33-44-55",
            "devices": [
                { "mac": "00-11-22-33-44-66", "type": "camera", "latencyMs": "fast" }
            ]
        }))
        .unwrap();

        assert_eq!(snap.project_code, 9);
        assert_eq!(snap.devices.len(), 1);
        let device = snap.devices[0].as_device().unwrap();
        assert_eq!(device.latency_ms, Some(json!("fast")));
        assert!(snap.scanned_at.is_none());
    }

    #[test]
    fn missing_mac_does_not_fail_the_batch() {
        let snap: Snapshot = serde_json::from_value(json!({
            "projectCode": 1,
            "gatewayMac": "001122334455",
            "devices": [{ "type": "NVR" }]
        }))
        .unwrap();
        assert_eq!(snap.devices[0].raw_mac(), "");
        assert!(snap.devices[0].as_device().is_some());
    }

    #[test]
    fn mistyped_entry_is_kept_as_malformed() {
        let snap: Snapshot = serde_json::from_value(json!({
            "projectCode": 1,
            "gatewayMac": "001122334455",
            "devices": [
                { "mac": "00:11:22:33:44:01", "type": "camera" },
                { "mac": "00:11:22:33:44:02", "type": "camera", "name": 42 },
                { "mac": "00:11:22:33:44:03", "statuses": "online" },
                "camera",
                [ "00:11:22:33:44:05", "nvr" ]
            ]
        }))
        .unwrap();

        assert_eq!(snap.devices.len(), 5);
        assert!(snap.devices[0].as_device().is_some());
        for entry in &snap.devices[1..] {
            assert!(matches!(entry, SnapshotEntry::Malformed(_)), "{entry:?}");
        }
        assert_eq!(snap.devices[1].raw_mac(), "00:11:22:33:44:02");
        assert_eq!(snap.devices[3].raw_mac(), "");
    }

    #[test]
    fn project_code_must_fit_a_byte() {
        let res = serde_json::from_value::<Snapshot>(json!({
            "projectCode": 300,
            "gatewayMac": "001122334455"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn failed_device_omits_blank_mac() {
        let failed = FailedDevice::new("  ", "mac invalid");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "reason": "mac invalid" })
        );
    }
}
