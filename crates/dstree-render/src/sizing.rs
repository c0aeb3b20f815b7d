//! Bottom-up size computation over the visible arena.
//!
//! Must run before positioning: the packer needs each node's pixel footprint
//! to keep sibling subtrees from overlapping.

use crate::layout::VisibleNode;

/// Computes `leaf_width` and the pixel size of every node in the subtree at
/// `idx`, returning the subtree's leaf width.
///
/// A node with no visible children (a data leaf, or a collapsed node) counts
/// as one leaf and gets the unit footprint. An internal node's leaf width is
/// the sum over its visible children; its pixel width is `unit_width` times
/// that, so children always tile their parent exactly.
pub fn compute_sizes(
    nodes: &mut [VisibleNode],
    idx: usize,
    unit_width: f64,
    unit_height: f64,
) -> usize {
    let children = nodes[idx].children.clone();
    if children.is_empty() {
        nodes[idx].leaf_width = 1;
        nodes[idx].width = unit_width;
        nodes[idx].height = unit_height;
        return 1;
    }

    let mut leaf_width = 0usize;
    for child in children {
        leaf_width += compute_sizes(nodes, child, unit_width, unit_height);
    }
    nodes[idx].leaf_width = leaf_width;
    nodes[idx].width = unit_width * leaf_width as f64;
    nodes[idx].height = unit_height;
    leaf_width
}
