// Topology layout over layouts shaped like the editor's saved JSON.

use pretty_assertions::assert_eq;
use serde_json::json;

use sitenet_core::bridge_role::DisplayRole;
use sitenet_core::{EmptyReason, Layout, TopologyConfig, TopologyTree, build_tree};

fn chain_layout(root_name: &str) -> Layout {
    serde_json::from_value(json!({
        "elements": [
            { "id": "e-sw", "category": "switch", "name": root_name, "deviceId": "d-sw" },
            { "id": "e-ba", "category": "bridge", "name": "Bridge A", "mac": "00:11:22:33:44:0a",
              "metadata": { "bridgeRole": "AP" } },
            { "id": "e-bb", "category": "bridge", "name": "Bridge B", "mac": "00:11:22:33:44:0b",
              "metadata": { "mode": "station" } },
            { "id": "e-cam", "category": "camera", "name": "Camera C", "deviceId": "d-cam" },
            { "id": "e-orphan", "category": "camera", "name": "Spare" }
        ],
        "connections": [
            { "from": "d-sw", "to": "00-11-22-33-44-0A" },
            { "id": "air-1", "from": "e-ba", "to": "00112233440b", "kind": "wireless",
              "metadata": { "bandwidth": 300, "status": "ok" } },
            { "from": "00:11:22:33:44:0b", "to": "d-cam" }
        ]
    }))
    .unwrap()
}

#[test]
fn test_chain_from_backbone_switch() {
    let config = TopologyConfig::default();
    let tree = build_tree(&chain_layout("SwitchOFC1"), &config);
    let layout = tree.layout().unwrap();

    let depths: Vec<(&str, usize)> = layout
        .nodes
        .iter()
        .map(|n| (n.element_id.as_str(), n.depth))
        .collect();
    assert_eq!(
        depths,
        vec![("e-sw", 0), ("e-ba", 1), ("e-bb", 2), ("e-cam", 3)]
    );
    assert_eq!(layout.edges.len(), 3);

    let node = |id: &str| layout.node(id).unwrap();
    assert_eq!(node("e-ba").bridge_role, Some(DisplayRole::Ap));
    assert_eq!(node("e-bb").bridge_role, Some(DisplayRole::St));
    assert_eq!(node("e-cam").parent.as_deref(), Some("e-bb"));
    assert!(layout.nodes.iter().all(|n| n.y.abs() < f64::EPSILON));
    assert!((layout.width - 3.0 * config.horizontal_spacing).abs() < f64::EPSILON);

    let air = &layout.edges[1];
    assert_eq!((air.from.as_str(), air.to.as_str()), ("e-ba", "e-bb"));
    assert_eq!(air.connection_id.as_deref(), Some("air-1"));
    assert_eq!(
        air.metadata.as_ref().and_then(|m| m.status.as_deref()),
        Some("ok")
    );
}

#[test]
fn test_without_backbone_marker_is_empty() {
    let tree = build_tree(&chain_layout("Switch1"), &TopologyConfig::default());
    assert_eq!(
        tree,
        TopologyTree::Empty {
            reason: EmptyReason::NoBackboneSwitch
        }
    );
}

#[test]
fn test_custom_marker() {
    let config = TopologyConfig {
        root_marker: "core".into(),
        ..TopologyConfig::default()
    };
    let tree = build_tree(&chain_layout("CORE-1"), &config);
    assert_eq!(tree.layout().unwrap().nodes.len(), 4);
}

#[test]
fn test_serialized_shape() {
    let tree = build_tree(&chain_layout("ofc"), &TopologyConfig::default());
    let value = serde_json::to_value(&tree).unwrap();
    assert_eq!(value["status"], json!("layout"));
    assert_eq!(value["nodes"][1]["bridgeRole"], json!("AP"));
    assert_eq!(value["edges"][1]["kind"], json!("wireless"));
    assert_eq!(value["nodes"][0].get("parent"), None);
}
