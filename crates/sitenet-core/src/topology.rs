// ── Topology tree layout ──
//
// Builds a layered left-to-right tree from a layout's elements and
// connections, rooted at the backbone ("OFC") switches. Pure and
// infallible: anything that cannot be resolved is dropped, and a layout
// with no usable root yields an explicit empty result.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use serde_json::Value;

use crate::bridge_role::{BridgeHints, DisplayRole, resolve_display_role};
use crate::config::TopologyConfig;
use crate::model::{Connection, ConnectionKind, ConnectionMetadata, Layout, LayoutElement, MacAddress};

/// Metadata keys that may carry another reference to the element's device.
const ALIAS_KEYS: &[&str] = &["deviceId", "mac", "macAddress", "deviceMac"];

/// Why no tree could be laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum EmptyReason {
    NoElements,
    NoBackboneSwitch,
}

/// Result of [`build_tree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TopologyTree {
    Empty { reason: EmptyReason },
    Layout(TreeLayout),
}

impl TopologyTree {
    pub fn layout(&self) -> Option<&TreeLayout> {
        match self {
            Self::Layout(layout) => Some(layout),
            Self::Empty { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    /// Nodes in breadth-first order, roots first.
    pub nodes: Vec<TreeNode>,
    pub edges: Vec<TreeEdge>,
    pub width: f64,
    pub height: f64,
}

impl TreeLayout {
    pub fn node(&self, element_id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.element_id == element_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub element_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub category: String,
    /// Only set for bridges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_role: Option<DisplayRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

/// A parent -> child tree link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEdge {
    pub from: String,
    pub to: String,
    pub kind: ConnectionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ConnectionMetadata>,
}

/// Lay out the spanning tree reachable from the backbone switches.
pub fn build_tree(layout: &Layout, config: &TopologyConfig) -> TopologyTree {
    let elements = &layout.elements;
    if elements.is_empty() {
        return TopologyTree::Empty {
            reason: EmptyReason::NoElements,
        };
    }

    let marker = config.root_marker.trim().to_lowercase();
    let roots: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, el)| is_backbone(el, &marker))
        .map(|(i, _)| i)
        .collect();
    if roots.is_empty() {
        return TopologyTree::Empty {
            reason: EmptyReason::NoBackboneSwitch,
        };
    }

    let aliases = alias_index(elements);
    let resolve = |endpoint: &str| -> Option<usize> {
        let trimmed = endpoint.trim();
        aliases.get(trimmed).copied().or_else(|| {
            MacAddress::parse(trimmed)
                .ok()
                .and_then(|mac| aliases.get(mac.as_str()).copied())
        })
    };

    // Undirected adjacency in connection order; each entry remembers the
    // connection that produced it.
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); elements.len()];
    for (ci, conn) in layout.connections.iter().enumerate() {
        let (Some(a), Some(b)) = (resolve(&conn.from), resolve(&conn.to)) else {
            continue;
        };
        if a == b {
            continue;
        }
        adjacency[a].push((b, ci));
        adjacency[b].push((a, ci));
    }

    // Multi-source BFS: every node is claimed once, by the first frontier
    // that reaches it.
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; elements.len()];
    let mut depth: Vec<usize> = vec![0; elements.len()];
    let mut visited = vec![false; elements.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); elements.len()];
    let mut order: Vec<usize> = Vec::with_capacity(elements.len());
    let mut queue: VecDeque<usize> = VecDeque::new();

    for &root in &roots {
        visited[root] = true;
        order.push(root);
        queue.push_back(root);
    }
    while let Some(node) = queue.pop_front() {
        for &(next, ci) in &adjacency[node] {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            parent[next] = Some((node, ci));
            depth[next] = depth[node] + 1;
            children[node].push(next);
            order.push(next);
            queue.push_back(next);
        }
    }

    let ys = assign_rows(&roots, &children, config.vertical_spacing);

    let nodes: Vec<TreeNode> = order
        .iter()
        .map(|&i| {
            let el = &elements[i];
            TreeNode {
                element_id: el.id.clone(),
                device_id: el.device_id.clone(),
                name: el.name.clone(),
                category: el.category.clone(),
                bridge_role: el.is_bridge().then(|| bridge_display_role(el)),
                parent: parent[i].map(|(p, _)| elements[p].id.clone()),
                depth: depth[i],
                x: as_coord(depth[i]) * config.horizontal_spacing,
                y: ys[i],
            }
        })
        .collect();

    let edges: Vec<TreeEdge> = order
        .iter()
        .filter_map(|&child| {
            let (p, ci) = parent[child]?;
            Some(tree_edge(&elements[p], &elements[child], &layout.connections[ci]))
        })
        .collect();

    let width = nodes.iter().map(|n| n.x).fold(0.0, f64::max);
    let height = nodes.iter().map(|n| n.y).fold(0.0, f64::max);

    TopologyTree::Layout(TreeLayout {
        nodes,
        edges,
        width,
        height,
    })
}

fn is_backbone(el: &LayoutElement, marker: &str) -> bool {
    if !el.is_switch() || marker.is_empty() {
        return false;
    }
    [el.name.as_deref(), el.model.as_deref()]
        .into_iter()
        .flatten()
        .any(|s| s.to_lowercase().contains(marker))
}

/// Every string an endpoint may use to refer to an element.
///
/// Element ids are indexed first so they always win over aliases; among
/// aliases the first element to claim one keeps it.
fn alias_index(elements: &[LayoutElement]) -> HashMap<String, usize> {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, el) in elements.iter().enumerate() {
        index.entry(el.id.trim().to_owned()).or_insert(i);
    }

    for (i, el) in elements.iter().enumerate() {
        let metadata_refs = ALIAS_KEYS.iter().filter_map(|k| el.metadata_str(k));
        for raw in [el.device_id.as_deref(), el.mac.as_deref()]
            .into_iter()
            .flatten()
            .chain(metadata_refs)
        {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            index.entry(raw.to_owned()).or_insert(i);
            if let Ok(mac) = MacAddress::parse(raw) {
                index.entry(mac.into()).or_insert(i);
            }
        }
    }
    index
}

/// Post-order row assignment over the BFS forest: leaves take consecutive
/// slots, parents sit at the mean of their children. Rows are shifted so
/// the smallest is zero.
fn assign_rows(roots: &[usize], children: &[Vec<usize>], spacing: f64) -> Vec<f64> {
    let mut ys = vec![0.0; children.len()];
    let mut next_slot = 0usize;
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();

    while let Some((node, expanded)) = stack.pop() {
        let kids = &children[node];
        if kids.is_empty() {
            ys[node] = as_coord(next_slot) * spacing;
            next_slot += 1;
        } else if expanded {
            let sum: f64 = kids.iter().map(|&k| ys[k]).sum();
            ys[node] = sum / as_coord(kids.len());
        } else {
            stack.push((node, true));
            stack.extend(kids.iter().rev().map(|&k| (k, false)));
        }
    }

    let min = roots
        .iter()
        .chain(children.iter().flatten())
        .map(|&i| ys[i])
        .fold(f64::INFINITY, f64::min);
    if min.is_finite() {
        for y in &mut ys {
            *y -= min;
        }
    }
    ys
}

fn bridge_display_role(el: &LayoutElement) -> DisplayRole {
    let statuses: Vec<String> = el
        .metadata
        .get("statuses")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    resolve_display_role(&BridgeHints {
        bridge_role: el.metadata_str("bridgeRole"),
        mode: el.metadata_str("mode"),
        role: el.metadata_str("role"),
        model: el.model.as_deref(),
        name: el.name.as_deref(),
        statuses: &statuses,
    })
}

fn tree_edge(from: &LayoutElement, to: &LayoutElement, conn: &Connection) -> TreeEdge {
    let metadata = (conn.metadata != ConnectionMetadata::default()).then(|| conn.metadata.clone());
    TreeEdge {
        from: from.id.clone(),
        to: to.id.clone(),
        kind: conn.kind,
        connection_id: conn.id.clone(),
        metadata,
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn as_coord(n: usize) -> f64 {
    n as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn element(id: &str, category: &str, name: &str) -> LayoutElement {
        LayoutElement {
            id: id.into(),
            category: category.into(),
            name: Some(name.into()),
            ..LayoutElement::default()
        }
    }

    fn connect(from: &str, to: &str) -> Connection {
        Connection {
            from: from.into(),
            to: to.into(),
            ..Connection::default()
        }
    }

    #[test]
    fn no_elements_is_empty() {
        let tree = build_tree(&Layout::default(), &TopologyConfig::default());
        assert_eq!(
            tree,
            TopologyTree::Empty {
                reason: EmptyReason::NoElements
            }
        );
    }

    #[test]
    fn branching_tree_centers_parents() {
        let layout = Layout {
            elements: vec![
                element("sw", "switch", "Core OFC"),
                element("a", "camera", "A"),
                element("b", "camera", "B"),
                element("c", "camera", "C"),
            ],
            connections: vec![connect("sw", "a"), connect("sw", "b"), connect("sw", "c")],
        };
        let config = TopologyConfig::default();
        let tree = build_tree(&layout, &config);
        let layout = tree.layout().unwrap();

        assert_eq!(layout.node("a").unwrap().y, 0.0);
        assert_eq!(layout.node("c").unwrap().y, 2.0 * config.vertical_spacing);
        assert_eq!(layout.node("sw").unwrap().y, config.vertical_spacing);
        assert_eq!(layout.node("b").unwrap().x, config.horizontal_spacing);
        assert_eq!(layout.height, 2.0 * config.vertical_spacing);
        assert_eq!(layout.width, config.horizontal_spacing);
    }

    #[test]
    fn endpoints_resolve_through_aliases() {
        let mut cam = element("el-cam", "camera", "Cam");
        cam.mac = Some("00:11:22:33:44:66".into());
        let mut nvr = element("el-nvr", "nvr", "NVR");
        nvr.metadata.insert("deviceId".into(), json!("dev-nvr"));

        let layout = Layout {
            elements: vec![element("sw", "switch", "OFC-1"), cam, nvr],
            connections: vec![
                connect("sw", "00-11-22-33-44-66"),
                connect("dev-nvr", "SW"),
                connect("sw", "dev-nvr"),
                connect("sw", "missing"),
            ],
        };
        let tree = build_tree(&layout, &TopologyConfig::default());
        let layout = tree.layout().unwrap();

        // "SW" matches nothing (ids are case-sensitive), "missing" is dropped.
        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.edges.len(), 2);
        assert_eq!(layout.node("el-cam").unwrap().parent.as_deref(), Some("sw"));
        assert_eq!(layout.node("el-nvr").unwrap().depth, 1);
    }

    #[test]
    fn cycles_are_visited_once() {
        let layout = Layout {
            elements: vec![
                element("sw", "switch", "ofc"),
                element("a", "bridge", "AP-1"),
                element("b", "bridge", "ST-1"),
            ],
            connections: vec![connect("sw", "a"), connect("a", "b"), connect("b", "sw")],
        };
        let tree = build_tree(&layout, &TopologyConfig::default());
        let layout = tree.layout().unwrap();
        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.edges.len(), 2);
        assert_eq!(layout.node("b").unwrap().depth, 1);
        assert_eq!(layout.node("a").unwrap().bridge_role, Some(DisplayRole::Ap));
        assert_eq!(layout.node("b").unwrap().bridge_role, Some(DisplayRole::St));
        assert_eq!(layout.node("sw").unwrap().bridge_role, None);
    }

    #[test]
    fn edges_carry_connection_metadata() {
        let mut wireless = connect("sw", "br");
        wireless.id = Some("c1".into());
        wireless.kind = ConnectionKind::Wireless;
        wireless.metadata.bandwidth = Some(json!("300Mbps"));

        let layout = Layout {
            elements: vec![element("sw", "switch", "OFC"), element("br", "bridge", "Link")],
            connections: vec![wireless],
        };
        let tree = build_tree(&layout, &TopologyConfig::default());
        let edge = &tree.layout().unwrap().edges[0];
        assert_eq!(edge.kind, ConnectionKind::Wireless);
        assert_eq!(edge.connection_id.as_deref(), Some("c1"));
        assert_eq!(
            edge.metadata.as_ref().unwrap().bandwidth,
            Some(json!("300Mbps"))
        );
    }

    #[test]
    fn marker_matches_model_too() {
        let mut sw = element("sw", "switch", "Core");
        sw.model = Some("S5720-OFC".into());
        let layout = Layout {
            elements: vec![sw],
            connections: Vec::new(),
        };
        let tree = build_tree(&layout, &TopologyConfig::default());
        assert_eq!(tree.layout().unwrap().nodes.len(), 1);
    }

    #[test]
    fn empty_result_serializes_with_reason() {
        let tree = TopologyTree::Empty {
            reason: EmptyReason::NoBackboneSwitch,
        };
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({ "status": "empty", "reason": "noBackboneSwitch" })
        );
    }
}
