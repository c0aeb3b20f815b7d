//! Collapse-aware hierarchical layout.
//!
//! Builds a transient arena of the currently visible nodes (traversal stops at
//! collapsed nodes), sizes it bottom-up, then packs siblings left-to-right.
//! Because an internal node's width equals the sum of its visible children's
//! widths, packing children edge-to-edge centers every parent over its
//! children's combined extent with no sibling overlap. The result is a pure
//! function of the tree plus its collapse flags.

use dstree_core::geom::{Size, size};
use dstree_core::{ConditionMarker, DsTreeConfig, OperatorTag, TreeNode};
use serde::Serialize;

use crate::sizing::compute_sizes;

/// Layout-positioned projection of one tree node. Rebuilt every pass; never
/// persisted across passes.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleNode {
    pub name: String,
    pub depth: usize,
    pub parent: Option<usize>,
    /// Arena indices of visible children (empty for collapsed nodes).
    pub children: Vec<usize>,
    pub collapsed: bool,
    /// Whether the underlying data node has children at all, collapsed or not.
    pub has_data_children: bool,
    pub condition_marker: ConditionMarker,
    pub logical_operators: Vec<OperatorTag>,
    /// Count of visible leaves under this node, >= 1.
    pub leaf_width: usize,
    pub width: f64,
    pub height: f64,
    /// Horizontal center.
    pub x: f64,
    /// Top edge (the connector bar row).
    pub y: f64,
}

impl VisibleNode {
    pub fn pixel_size(&self) -> Size {
        size(self.width, self.height)
    }

    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// One layout pass over the visible subset of a tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize)]
pub struct TreeLayout {
    pub nodes: Vec<VisibleNode>,
}

impl TreeLayout {
    pub fn find(&self, name: &str) -> Option<&VisibleNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

pub fn layout_tree(root: &TreeNode, config: &DsTreeConfig) -> TreeLayout {
    let mut nodes = Vec::new();
    push_visible(&mut nodes, root, None, 0);

    compute_sizes(&mut nodes, 0, config.unit_width, config.unit_height);
    position(&mut nodes, 0, 0.0, config.unit_height);

    // Translate so the minimum center/top over all visible nodes lands one
    // unit inside the canvas; nothing renders on the negative side.
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for n in nodes.iter() {
        min_x = min_x.min(n.x);
        min_y = min_y.min(n.y);
    }
    if min_x.is_finite() && min_y.is_finite() {
        let dx = config.unit_width - min_x;
        let dy = config.unit_height - min_y;
        for n in nodes.iter_mut() {
            n.x += dx;
            n.y += dy;
        }
    }

    let layout = TreeLayout { nodes };
    tracing::debug!(
        visible = layout.nodes.len(),
        root_leaf_width = layout.nodes[0].leaf_width,
        "computed dstree layout"
    );
    layout
}

fn push_visible(
    nodes: &mut Vec<VisibleNode>,
    node: &TreeNode,
    parent: Option<usize>,
    depth: usize,
) -> usize {
    let idx = nodes.len();
    nodes.push(VisibleNode {
        name: node.name.clone(),
        depth,
        parent,
        children: Vec::new(),
        collapsed: node.is_collapsed(),
        has_data_children: !node.children.is_empty(),
        condition_marker: node.condition_marker.clone(),
        logical_operators: node.logical_operators.clone(),
        leaf_width: 1,
        width: 0.0,
        height: 0.0,
        x: 0.0,
        y: 0.0,
    });

    for child in node.visible_children() {
        let child_idx = push_visible(nodes, child, Some(idx), depth + 1);
        nodes[idx].children.push(child_idx);
    }
    idx
}

fn position(nodes: &mut [VisibleNode], idx: usize, left: f64, unit_height: f64) {
    nodes[idx].x = left + nodes[idx].width / 2.0;
    nodes[idx].y = nodes[idx].depth as f64 * unit_height;

    let mut cursor = left;
    let children = nodes[idx].children.clone();
    for child in children {
        position(nodes, child, cursor, unit_height);
        cursor += nodes[child].width;
    }
}
