//! Top-level controller tying model, layout and reconciliation together.

use std::sync::Arc;

use dstree_core::{DsTreeConfig, TreeModel, TreeNode};
use rustc_hash::FxHashSet;

use crate::layout::layout_tree;
use crate::reconcile::{Animator, DiffOutcome, reconcile};
use crate::surface::{IconSet, Surface};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use crate::visual::{build_visuals, node_name_of_key};

#[derive(Clone)]
pub struct RenderOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub text_style: TextStyle,
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("text_style", &self.text_style)
            .finish_non_exhaustive()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            text_style: TextStyle::default(),
        }
    }
}

/// Interactive diagram instance.
///
/// Owns the tree model, the drawing surface handed over at construction and
/// the in-flight transitions. Every interaction runs exactly one synchronous
/// layout + reconciliation pass; the embedder drives animation time by
/// calling [`TreeView::tick`] with its wall clock (milliseconds, any epoch).
#[derive(Debug)]
pub struct TreeView {
    model: TreeModel,
    config: DsTreeConfig,
    icons: IconSet,
    highlight: FxHashSet<String>,
    surface: Surface,
    animator: Animator,
    options: RenderOptions,
    first_pass: bool,
}

impl TreeView {
    /// Takes ownership of `surface`; the first pass clears whatever it holds,
    /// and from then on the view mutates only elements it created.
    pub fn new(model: TreeModel, config: DsTreeConfig, icons: IconSet, surface: Surface) -> Self {
        Self::with_options(model, config, icons, surface, RenderOptions::default())
    }

    pub fn with_options(
        model: TreeModel,
        config: DsTreeConfig,
        icons: IconSet,
        surface: Surface,
        options: RenderOptions,
    ) -> Self {
        Self {
            model,
            config,
            icons,
            highlight: FxHashSet::default(),
            surface,
            animator: Animator::default(),
            options,
            first_pass: true,
        }
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn config(&self) -> &DsTreeConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Replaces the projection set. The next pass force-expands the path to
    /// every named node and renders their labels highlighted.
    pub fn set_highlight_names(&mut self, names: impl IntoIterator<Item = String>) {
        self.highlight = names.into_iter().collect();
    }

    /// Replaces the tree data, carrying collapse state over by node name.
    pub fn refresh_data(&mut self, root: TreeNode) {
        self.model.refresh(root);
    }

    /// Runs one synchronous layout + reconciliation pass.
    pub fn render(&mut self, now_ms: f64) -> DiffOutcome {
        if self.first_pass {
            self.surface.clear();
            self.first_pass = false;
        }
        self.model.normalize();
        if !self.highlight.is_empty() && !self.model.expand_ancestors_of(&self.highlight) {
            tracing::debug!("projection names matched no nodes");
        }

        let layout = layout_tree(self.model.root(), &self.config);
        let descriptors = build_visuals(
            &layout,
            &self.highlight,
            &self.icons,
            self.options.text_measurer.as_ref(),
            &self.options.text_style,
        );
        reconcile(
            &mut self.surface,
            &mut self.animator,
            descriptors,
            now_ms,
            self.config.transition_ms,
        )
    }

    /// Advances in-flight transitions to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        self.animator.tick(&mut self.surface, now_ms);
    }

    pub fn is_animating(&self) -> bool {
        !self.animator.is_empty()
    }

    /// Click dispatch: hit-tests the toggle regions (deepest node wins, so a
    /// click never reaches an ancestor's region), flips that node's collapse
    /// flag and runs a fresh pass. Returns the toggled node's name.
    pub fn click_at(&mut self, x: f64, y: f64, now_ms: f64) -> Option<String> {
        let key = self.surface.hit_test(x, y)?.to_string();
        let name = node_name_of_key(&key)?.to_string();
        self.toggle_and_render(&name, now_ms).then_some(name)
    }

    /// Host-driven toggle by node name; runs one pass when the node exists.
    pub fn click(&mut self, name: &str, now_ms: f64) -> bool {
        self.toggle_and_render(name, now_ms)
    }

    fn toggle_and_render(&mut self, name: &str, now_ms: f64) -> bool {
        if !self.model.toggle(name) {
            return false;
        }
        self.render(now_ms);
        true
    }
}
