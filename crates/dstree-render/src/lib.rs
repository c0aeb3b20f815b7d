#![forbid(unsafe_code)]

//! Headless layout and incremental rendering for logical-expression tree
//! diagrams.
//!
//! The pipeline per pass: build the visible-node arena (traversal stops at
//! collapsed nodes), size it bottom-up, pack it horizontally, turn it into
//! keyed element descriptors, then reconcile those against the retained
//! [`surface::Surface`] — entering, updating and exiting elements each get an
//! animated transition. [`view::TreeView`] wires the passes to click handling.

pub mod layout;
pub mod reconcile;
pub mod sizing;
pub mod surface;
pub mod text;
pub mod view;
pub mod visual;

pub use layout::{TreeLayout, VisibleNode, layout_tree};
pub use reconcile::{Animator, DiffOutcome, reconcile};
pub use surface::{ElementKind, IconHandle, IconSet, Primitive, SceneElement, Surface};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
pub use view::{RenderOptions, TreeView};
