#![forbid(unsafe_code)]

//! `dstree` renders a logical-expression tree (nodes joined by `AND`/`OR`
//! operators, optionally annotated with comparison markers) as an interactive
//! hierarchical diagram.
//!
//! Clicking a node's connector bar collapses or expands its subtree; the
//! engine re-lays-out and reconciles only the affected elements instead of
//! redrawing from scratch. A projection set of node names can be supplied to
//! force-expand and highlight the paths to those nodes.
//!
//! ```
//! use dstree::render::{IconHandle, IconSet, Surface, TreeView};
//! use dstree::{DsTreeConfig, OperatorTag, TreeModel};
//!
//! let model = TreeModel::from_json(
//!     r#"{ "name": "root", "logicalOperators": ["AND"],
//!          "children": [{ "name": "a" }, { "name": "b" }] }"#,
//! )
//! .unwrap();
//! let mut icons = IconSet::default();
//! icons.set_operator(OperatorTag::And, IconHandle::new("and.svg"));
//!
//! let mut view = TreeView::new(model, DsTreeConfig::default(), icons, Surface::new());
//! view.render(0.0);
//! assert_eq!(view.surface().len(), 4); // three nodes + one AND glyph
//! ```

pub use dstree_core::*;

pub mod render {
    pub use dstree_render::{
        Animator, DeterministicTextMeasurer, DiffOutcome, ElementKind, IconHandle, IconSet,
        Primitive, RenderOptions, SceneElement, Surface, TextMeasurer, TextMetrics, TextStyle,
        TreeLayout, TreeView, VisibleNode, layout_tree, reconcile,
    };
}

use dstree_render::{IconSet, Surface, TreeView};

/// Builds an interactive view from raw JSON tree data and a JSON options
/// object with the recognized keys (`unitWidth`, `unitHeight`,
/// `transitionMs`). The view owns a fresh, empty surface.
pub fn tree_view_from_json(
    data: &str,
    options: &serde_json::Value,
    icons: IconSet,
) -> Result<TreeView> {
    let model = TreeModel::from_json(data)?;
    let config = DsTreeConfig::from_value(options);
    Ok(TreeView::new(model, config, icons, Surface::new()))
}
