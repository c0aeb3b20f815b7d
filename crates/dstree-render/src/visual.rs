//! Builds the visual descriptors for one layout pass.
//!
//! Each visible node becomes one keyed element (connector paths, label,
//! optional marker icon, optional hit region) with primitives relative to the
//! node's translated origin; each rendered operator becomes one keyed glyph
//! element. The reconciler diffs these descriptors against the surface.

use dstree_core::{ConditionMarker, OperatorTag};
use rustc_hash::FxHashSet;

use crate::layout::{TreeLayout, VisibleNode};
use crate::surface::{
    ElementKind, HitRectPrimitive, IconPrimitive, IconSet, LabelPrimitive, PathPrimitive,
    Primitive,
};
use crate::text::{TextMeasurer, TextStyle};

pub const PADDING: f64 = 5.0;
pub const BAR_HEIGHT: f64 = 10.0;
pub const ARROW_SIZE: f64 = 5.0;
pub const TEXT_PADDING: f64 = 7.0;
pub const LABEL_FIT_RATIO: f64 = 0.75;
pub const MARKER_ICON_WIDTH: f64 = 40.0;
pub const MARKER_ICON_HEIGHT: f64 = 20.0;
pub const OPERATOR_ICON_SIZE: f64 = 20.0;
// Vertical tweak for marker icons, carried over from the reference styling.
const MARKER_ICON_DY: f64 = -2.7;
const HIT_RECT_RADIUS: f64 = 5.0;
const STROKE_WIDTH_DEFAULT: f64 = 1.0;
const STROKE_WIDTH_COLLAPSED: f64 = 2.5;

/// Target state for one surface element, produced fresh every pass.
#[derive(Debug, Clone)]
pub struct ElementDesc {
    pub key: String,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub primitives: Vec<Primitive>,
}

pub fn node_key(name: &str) -> String {
    format!("node:{name}")
}

/// Glyph identity: owning node name plus operator index.
pub fn glyph_key(parent: &str, index: usize) -> String {
    format!("op:{parent}_{index}")
}

pub fn node_name_of_key(key: &str) -> Option<&str> {
    key.strip_prefix("node:")
}

pub fn build_visuals(
    layout: &TreeLayout,
    highlight: &FxHashSet<String>,
    icons: &IconSet,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
) -> Vec<ElementDesc> {
    let mut out = Vec::with_capacity(layout.nodes.len() * 2);
    for node in &layout.nodes {
        out.push(node_visual(node, highlight, icons, measurer, style));
        push_operator_glyphs(&mut out, layout, node, icons);
    }
    out
}

fn node_visual(
    node: &VisibleNode,
    highlight: &FxHashSet<String>,
    icons: &IconSet,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
) -> ElementDesc {
    let w = node.width;
    let h = node.height;
    let mut primitives = Vec::with_capacity(6);

    // Top connector: horizontal bar with short ticks at both ends. A thicker
    // stroke marks a collapsed node.
    primitives.push(Primitive::Path(PathPrimitive {
        data: format!(
            "M {p} 0 H {r} M {p} 0 V {b} M {r} 0 V {b}",
            p = fmt(PADDING),
            r = fmt(w - PADDING),
            b = fmt(BAR_HEIGHT),
        ),
        stroke: "black".to_string(),
        stroke_width: if node.collapsed {
            STROKE_WIDTH_COLLAPSED
        } else {
            STROKE_WIDTH_DEFAULT
        },
        dash: None,
    }));

    // Dashed descenders with arrowheads toward the child row, only while the
    // children are actually visible.
    if !node.children.is_empty() {
        for (edge, inward) in [(PADDING, 1.0), (w - PADDING, -1.0)] {
            primitives.push(Primitive::Path(PathPrimitive {
                data: format!(
                    "M {e} {b} V {h} M {e} {h} l {back} {up} M {e} {h} l {fwd} {up}",
                    e = fmt(edge),
                    b = fmt(BAR_HEIGHT),
                    h = fmt(h),
                    back = fmt(-inward * ARROW_SIZE),
                    fwd = fmt(inward * ARROW_SIZE),
                    up = fmt(-ARROW_SIZE),
                ),
                stroke: "lightgray".to_string(),
                stroke_width: STROKE_WIDTH_DEFAULT,
                dash: Some("5,5".to_string()),
            }));
        }
    }

    // Centered label, uniformly scaled down when it would exceed the fit
    // ratio of the node's pixel width. The highlight backing rect shares the
    // measured bounds and the scale.
    let metrics = measurer.measure(&node.name, style);
    let scale = if metrics.width > LABEL_FIT_RATIO * w {
        LABEL_FIT_RATIO * w / metrics.width
    } else {
        1.0
    };
    primitives.push(Primitive::Label(LabelPrimitive {
        text: node.name.clone(),
        dx: w / 2.0,
        dy: TEXT_PADDING - h / 2.0,
        scale,
        anchor_dy: -h / 2.0,
        highlighted: highlight.contains(&node.name),
        text_width: metrics.width,
        text_height: metrics.height,
    }));

    if node.condition_marker != ConditionMarker::None {
        if let Some(handle) = icons.marker(&node.condition_marker) {
            primitives.push(Primitive::Icon(IconPrimitive {
                handle: handle.clone(),
                dx: w / 2.0 - MARKER_ICON_WIDTH / 2.0,
                dy: MARKER_ICON_DY,
                width: MARKER_ICON_WIDTH,
                height: MARKER_ICON_HEIGHT,
            }));
        }
    }

    // Click target over the connector area. Only nodes that have children in
    // the underlying data are toggleable.
    if node.has_data_children {
        primitives.push(Primitive::HitRect(HitRectPrimitive {
            dx: PADDING,
            dy: -5.0,
            width: w - 2.0 * PADDING,
            height: BAR_HEIGHT + 10.0,
            rx: HIT_RECT_RADIUS,
        }));
    }

    ElementDesc {
        key: node_key(&node.name),
        kind: ElementKind::Node,
        x: node.left(),
        y: node.y,
        primitives,
    }
}

/// One glyph per operator between adjacent visible children, centered at the
/// midpoint between the two children's horizontal centers and level with the
/// children's label row. Unrecognized tags and missing icon handles are
/// skipped, not errored.
fn push_operator_glyphs(
    out: &mut Vec<ElementDesc>,
    layout: &TreeLayout,
    node: &VisibleNode,
    icons: &IconSet,
) {
    if node.children.len() < 2 {
        return;
    }
    let count = (node.children.len() - 1).min(node.logical_operators.len());
    for i in 0..count {
        let tag = &node.logical_operators[i];
        if matches!(tag, OperatorTag::Other(_)) {
            continue;
        }
        let Some(handle) = icons.operator(tag) else {
            continue;
        };
        let first = &layout.nodes[node.children[i]];
        let second = &layout.nodes[node.children[i + 1]];
        let mid_x = (first.x + second.x) / 2.0;
        let y = node.y + node.height / 2.0 + TEXT_PADDING;

        out.push(ElementDesc {
            key: glyph_key(&node.name, i),
            kind: ElementKind::OperatorGlyph,
            x: mid_x,
            y,
            primitives: vec![Primitive::Icon(IconPrimitive {
                handle: handle.clone(),
                dx: -OPERATOR_ICON_SIZE / 2.0,
                dy: -OPERATOR_ICON_SIZE / 2.0,
                width: OPERATOR_ICON_SIZE,
                height: OPERATOR_ICON_SIZE,
            })],
        });
    }
}

/// Path-data numbers without a trailing `.0` for whole values, matching how
/// hand-written path strings read.
fn fmt(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
