//! `sitenet topology`: lay a saved layout out as a tree.

use tabled::Tabled;

use sitenet_core::{EmptyReason, Layout, TopologyTree, TreeLayout, TreeNode, build_tree};

use crate::cli::TopologyArgs;
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util;

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Depth")]
    depth: usize,
    #[tabled(rename = "X")]
    x: String,
    #[tabled(rename = "Y")]
    y: String,
}

impl From<&TreeNode> for NodeRow {
    fn from(n: &TreeNode) -> Self {
        Self {
            element: format!("{}{}", "  ".repeat(n.depth), n.element_id),
            name: n.name.clone().unwrap_or_default(),
            category: n.category.clone(),
            role: n.bridge_role.map(|r| r.to_string()).unwrap_or_default(),
            parent: n.parent.clone().unwrap_or_default(),
            depth: n.depth,
            x: format!("{:.0}", n.x),
            y: format!("{:.0}", n.y),
        }
    }
}

fn empty_message(reason: EmptyReason) -> &'static str {
    match reason {
        EmptyReason::NoElements => "No tree: the layout has no elements",
        EmptyReason::NoBackboneSwitch => "No tree: no backbone switch found in the layout",
    }
}

fn detail(tree: &TopologyTree) -> String {
    match tree {
        TopologyTree::Empty { reason } => empty_message(*reason).to_owned(),
        TopologyTree::Layout(layout) => {
            let rows: Vec<NodeRow> = layout.nodes.iter().map(NodeRow::from).collect();
            format!(
                "{}\n{} nodes, {} edges, {:.0} x {:.0}",
                output::render_table(&rows),
                layout.nodes.len(),
                layout.edges.len(),
                layout.width,
                layout.height
            )
        }
    }
}

fn element_ids(tree: &TopologyTree) -> String {
    tree.layout()
        .map(|layout: &TreeLayout| {
            layout
                .nodes
                .iter()
                .map(|n| n.element_id.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

pub fn handle(args: &TopologyArgs, ctx: &Context) -> Result<(), CliError> {
    let layout: Layout = util::read_json_file(&args.layout)?;

    let mut config = ctx.config.to_topology_config()?;
    if let Some(marker) = args.root_marker.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        marker.clone_into(&mut config.root_marker);
    }

    let tree = build_tree(&layout, &config);
    if let TopologyTree::Empty { reason } = &tree {
        tracing::info!(%reason, marker = %config.root_marker, "no tree to lay out");
    }

    let out = output::render_single(ctx.output, &tree, detail, element_ids)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
