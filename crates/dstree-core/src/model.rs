use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Operator joining two adjacent children of a node.
///
/// Unknown strings are preserved as [`OperatorTag::Other`] so a tree carrying
/// tags we do not render still round-trips; the renderer skips their glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatorTag {
    And,
    Or,
    Other(String),
}

impl From<String> for OperatorTag {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "AND" => Self::And,
            "OR" => Self::Or,
            _ => Self::Other(raw),
        }
    }
}

impl From<OperatorTag> for String {
    fn from(tag: OperatorTag) -> Self {
        match tag {
            OperatorTag::And => "AND".to_string(),
            OperatorTag::Or => "OR".to_string(),
            OperatorTag::Other(raw) => raw,
        }
    }
}

/// Comparison marker drawn as an icon above a node. Serialized under the
/// legacy field name `sum`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionMarker {
    #[default]
    None,
    Equal,
    Less,
    Other(String),
}

impl From<String> for ConditionMarker {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "None" | "NONE" => Self::None,
            "EQUAL" => Self::Equal,
            "LESS" => Self::Less,
            _ => Self::Other(raw),
        }
    }
}

impl From<ConditionMarker> for String {
    fn from(marker: ConditionMarker) -> Self {
        match marker {
            ConditionMarker::None => "None".to_string(),
            ConditionMarker::Equal => "EQUAL".to_string(),
            ConditionMarker::Less => "LESS".to_string(),
            ConditionMarker::Other(raw) => raw,
        }
    }
}

/// One node of the logical-expression tree.
///
/// `name` is the stable identity used for diffing rendered elements across
/// passes; it must be unique within a tree. Duplicate names are a precondition
/// violation and are not defended against.
///
/// `logical_operators[i]` joins `children[i]` and `children[i + 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    #[serde(default)]
    pub logical_operators: Vec<OperatorTag>,
    #[serde(default, rename = "sum")]
    pub condition_marker: ConditionMarker,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    /// `None` means "never normalized"; [`TreeModel::normalize`] fills it in
    /// with `Some(false)` without touching flags that were already set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logical_operators: Vec::new(),
            condition_marker: ConditionMarker::None,
            children: Vec::new(),
            collapsed: None,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.unwrap_or(false)
    }

    /// Children that take part in sizing, layout and rendering. A collapsed
    /// node is treated as a leaf even when `children` is non-empty.
    pub fn visible_children(&self) -> &[TreeNode] {
        if self.is_collapsed() {
            &[]
        } else {
            &self.children
        }
    }
}

/// Owner of the tree and its collapse flags — the only mutable state that
/// survives between rendering passes.
#[derive(Debug, Clone)]
pub struct TreeModel {
    root: TreeNode,
}

impl TreeModel {
    pub fn new(root: TreeNode) -> Self {
        let mut model = Self { root };
        model.normalize();
        model
    }

    pub fn from_json(data: &str) -> crate::Result<Self> {
        let root: TreeNode = serde_json::from_str(data)?;
        Ok(Self::new(root))
    }

    pub fn from_value(data: serde_json::Value) -> crate::Result<Self> {
        let root: TreeNode = serde_json::from_value(data)?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Ensures every node carries a collapse flag, defaulting unset flags to
    /// `false`. Idempotent; flags that were already set are left alone, so a
    /// user's interaction state survives repeated passes.
    pub fn normalize(&mut self) {
        normalize_node(&mut self.root);
    }

    /// Forces open every node whose name is in `targets` and every ancestor on
    /// the path to it. Nodes not on a path to a match keep their collapse
    /// state. Returns whether any name matched.
    pub fn expand_ancestors_of(&mut self, targets: &FxHashSet<String>) -> bool {
        if targets.is_empty() {
            return false;
        }
        expand_matches(&mut self.root, targets)
    }

    /// Flips the collapse flag of the named node. Returns whether the node
    /// exists; the caller is responsible for triggering a new pass.
    pub fn toggle(&mut self, name: &str) -> bool {
        match find_node_mut(&mut self.root, name) {
            Some(node) => {
                node.collapsed = Some(!node.is_collapsed());
                true
            }
            None => false,
        }
    }

    /// Opt-in debugging aid. Name uniqueness is a precondition the engine
    /// relies on for diffing but does not enforce; this walks the tree once
    /// and reports the first violation.
    pub fn check_unique_names(&self) -> crate::Result<()> {
        let mut seen = FxHashSet::default();
        check_names(&self.root, &mut seen)
    }

    /// Replaces the tree data while carrying collapse flags over from the old
    /// tree by name, so an external data refresh does not reset the user's
    /// interaction state as long as node identities match.
    pub fn refresh(&mut self, new_root: TreeNode) {
        let old = std::mem::replace(&mut self.root, new_root);
        let mut collapsed = FxHashSet::default();
        collect_collapsed(&old, &mut collapsed);
        carry_flags(&mut self.root, &collapsed);
        self.normalize();
    }
}

fn normalize_node(node: &mut TreeNode) {
    if node.collapsed.is_none() {
        node.collapsed = Some(false);
    }
    for child in &mut node.children {
        normalize_node(child);
    }
}

fn expand_matches(node: &mut TreeNode, targets: &FxHashSet<String>) -> bool {
    let mut needs_expand = targets.contains(&node.name);
    for child in &mut node.children {
        if expand_matches(child, targets) {
            needs_expand = true;
        }
    }
    if needs_expand {
        node.collapsed = Some(false);
    }
    needs_expand
}

fn find_node_mut<'a>(node: &'a mut TreeNode, name: &str) -> Option<&'a mut TreeNode> {
    if node.name == name {
        return Some(node);
    }
    for child in &mut node.children {
        if let Some(found) = find_node_mut(child, name) {
            return Some(found);
        }
    }
    None
}

fn check_names<'a>(node: &'a TreeNode, seen: &mut FxHashSet<&'a str>) -> crate::Result<()> {
    if !seen.insert(node.name.as_str()) {
        return Err(crate::Error::DuplicateName {
            name: node.name.clone(),
        });
    }
    for child in &node.children {
        check_names(child, seen)?;
    }
    Ok(())
}

fn collect_collapsed(node: &TreeNode, out: &mut FxHashSet<String>) {
    if node.is_collapsed() {
        out.insert(node.name.clone());
    }
    for child in &node.children {
        collect_collapsed(child, out);
    }
}

fn carry_flags(node: &mut TreeNode, collapsed: &FxHashSet<String>) {
    if node.collapsed.is_none() && collapsed.contains(&node.name) {
        node.collapsed = Some(true);
    }
    for child in &mut node.children {
        carry_flags(child, collapsed);
    }
}
