//! Retained drawing surface.
//!
//! The engine fully owns one [`Surface`]: the first pass clears it, and every
//! later pass mutates only elements the engine created. Elements are keyed by
//! stable identity (node name, operator-glyph key) and kept in insertion
//! order, which doubles as paint order.

use dstree_core::geom::{Rect, point, size};
use dstree_core::{ConditionMarker, OperatorTag};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Opaque icon resource handle (an asset URL, sprite id, ...). Resolved by an
/// external asset layer; the engine never interprets its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconHandle(pub String);

impl IconHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

/// Maps operator tags and condition markers to icon handles. A missing entry
/// means the corresponding glyph is skipped, not an error.
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    operators: FxHashMap<OperatorTag, IconHandle>,
    markers: FxHashMap<ConditionMarker, IconHandle>,
}

impl IconSet {
    pub fn set_operator(&mut self, tag: OperatorTag, handle: IconHandle) -> &mut Self {
        self.operators.insert(tag, handle);
        self
    }

    pub fn set_marker(&mut self, marker: ConditionMarker, handle: IconHandle) -> &mut Self {
        self.markers.insert(marker, handle);
        self
    }

    pub fn operator(&self, tag: &OperatorTag) -> Option<&IconHandle> {
        self.operators.get(tag)
    }

    pub fn marker(&self, marker: &ConditionMarker) -> Option<&IconHandle> {
        self.markers.get(marker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Node,
    OperatorGlyph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPrimitive {
    /// SVG-style path data, coordinates relative to the element origin.
    pub data: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub dash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrimitive {
    pub text: String,
    pub dx: f64,
    pub dy: f64,
    /// Uniform scale applied around (`dx`, `anchor_dy`) so long labels fit.
    pub scale: f64,
    pub anchor_dy: f64,
    pub highlighted: bool,
    pub text_width: f64,
    pub text_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconPrimitive {
    pub handle: IconHandle,
    pub dx: f64,
    pub dy: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRectPrimitive {
    pub dx: f64,
    pub dy: f64,
    pub width: f64,
    pub height: f64,
    pub rx: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Path(PathPrimitive),
    Label(LabelPrimitive),
    Icon(IconPrimitive),
    HitRect(HitRectPrimitive),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub kind: ElementKind,
    /// Translated origin: top-left of a node's padded box, center of a glyph.
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
    /// Set while the element fades out; exiting elements are not hit-testable
    /// and are removed when their transition finishes.
    pub exiting: bool,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Default)]
pub struct Surface {
    elements: IndexMap<String, SceneElement>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&SceneElement> {
        self.elements.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut SceneElement> {
        self.elements.get_mut(key)
    }

    pub fn insert(&mut self, key: String, element: SceneElement) {
        self.elements.insert(key, element);
    }

    /// Removes an element without disturbing the paint order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<SceneElement> {
        self.elements.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SceneElement)> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Returns the key of the topmost (last painted) live element whose hit
    /// region contains the point. Deeper nodes paint later, so the deepest
    /// hit wins and the click never reaches an ancestor's region.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&str> {
        let target = point(x, y);
        for (key, element) in self.elements.iter().rev() {
            if element.exiting {
                continue;
            }
            for primitive in &element.primitives {
                let Primitive::HitRect(hit) = primitive else {
                    continue;
                };
                let rect = Rect::new(
                    point(element.x + hit.dx, element.y + hit.dy),
                    size(hit.width, hit.height),
                );
                if rect.contains(target) {
                    return Some(key.as_str());
                }
            }
        }
        None
    }
}
