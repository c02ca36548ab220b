// ── Layout domain types ──
//
// Elements are devices placed on a layout canvas; connections are the
// edges the layout editor draws between them. Both arrive from the editor,
// which references devices inconsistently (device id, MAC, element id), so
// everything here is kept as loose strings and resolved by the topology
// builder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A device placed on a layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutElement {
    pub id: String,
    /// Free-text category (`switch`, `camera`, `bridge`, `nvr`, ...).
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl LayoutElement {
    pub fn is_switch(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case("switch")
    }

    pub fn is_bridge(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case("bridge")
    }

    /// String value of a metadata key, if present and a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Physical medium of a connection.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConnectionKind {
    #[default]
    Wired,
    Wireless,
}

/// Display metadata attached to a connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An edge between two devices on a layout.
///
/// `from` and `to` may hold an element id, a device id, or a MAC in any
/// format the editor happened to store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub kind: ConnectionKind,
    #[serde(default)]
    pub metadata: ConnectionMetadata,
}

/// Everything the topology builder needs from one layout version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub elements: Vec<LayoutElement>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}
