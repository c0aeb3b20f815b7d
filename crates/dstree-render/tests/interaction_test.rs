use dstree_core::{ConditionMarker, DsTreeConfig, OperatorTag, TreeModel};
use dstree_render::surface::{ElementKind, HitRectPrimitive, Primitive, SceneElement};
use dstree_render::{IconHandle, IconSet, Surface, TreeView};
use serde_json::json;

fn icons() -> IconSet {
    let mut icons = IconSet::default();
    icons
        .set_operator(OperatorTag::And, IconHandle::new("and.svg"))
        .set_operator(OperatorTag::Or, IconHandle::new("or.svg"))
        .set_marker(ConditionMarker::Equal, IconHandle::new("equal.svg"))
        .set_marker(ConditionMarker::Less, IconHandle::new("less.svg"));
    icons
}

fn sample_view() -> TreeView {
    let model = TreeModel::from_value(json!({
        "name": "root",
        "logicalOperators": ["AND"],
        "children": [
            {
                "name": "a",
                "logicalOperators": ["OR"],
                "children": [
                    { "name": "a1" },
                    { "name": "a2", "children": [{ "name": "a2x" }] }
                ]
            },
            { "name": "b", "sum": "LESS" }
        ]
    }))
    .unwrap();
    TreeView::new(model, DsTreeConfig::default(), icons(), Surface::new())
}

#[test]
fn first_render_populates_nodes_and_glyphs() {
    let mut view = sample_view();
    let outcome = view.render(0.0);
    // Six visible nodes plus the root AND and the a OR glyph.
    assert_eq!(outcome.entered.len(), 8);
    assert!(outcome.updated.is_empty() && outcome.exited.is_empty());
    assert!(view.surface().contains("node:a2x"));
    assert!(view.surface().contains("op:root_0"));
    assert!(view.surface().contains("op:a_0"));
}

#[test]
fn first_render_clears_foreign_surface_content() {
    let model = TreeModel::from_value(json!({ "name": "solo" })).unwrap();
    let mut surface = Surface::new();
    surface.insert("leftover".to_string(), SceneElement {
        kind: ElementKind::Node,
        x: 0.0,
        y: 0.0,
        opacity: 1.0,
        exiting: false,
        primitives: vec![Primitive::HitRect(HitRectPrimitive {
            dx: 0.0,
            dy: 0.0,
            width: 10.0,
            height: 10.0,
            rx: 0.0,
        })],
    });

    let mut view = TreeView::new(model, DsTreeConfig::default(), IconSet::default(), surface);
    view.render(0.0);
    assert!(!view.surface().contains("leftover"));
    assert!(view.surface().contains("node:solo"));
}

#[test]
fn collapsing_a_node_exits_all_of_its_descendants() {
    let mut view = sample_view();
    view.render(0.0);
    let before = view.surface().len();

    // "a" has three descendants in the data; all of them leave the visible
    // set, along with the OR glyph between a1 and a2.
    assert!(view.click("a", 100.0));
    for gone in ["node:a1", "node:a2", "node:a2x", "op:a_0"] {
        assert!(
            view.surface().get(gone).unwrap().exiting,
            "{gone} should be fading out"
        );
    }
    // Finishing the transitions removes them.
    view.tick(600.0);
    assert_eq!(view.surface().len(), before - 4);
    assert!(!view.is_animating());
}

#[test]
fn expanding_again_re_enters_descendants_without_touching_survivors() {
    let mut view = sample_view();
    view.render(0.0);
    view.click("a", 100.0);
    view.tick(600.0);

    assert!(view.click("a", 700.0));
    assert!(view.surface().contains("node:a1"));
    assert!(view.surface().contains("node:a2x"));
    // Glyphs fade in; nodes appear at full opacity immediately.
    assert_eq!(view.surface().get("op:a_0").unwrap().opacity, 0.0);
    assert_eq!(view.surface().get("node:a1").unwrap().opacity, 1.0);
    view.tick(1200.0);
    assert_eq!(view.surface().get("op:a_0").unwrap().opacity, 1.0);
}

#[test]
fn click_at_toggles_the_deepest_hit_region() {
    let mut view = sample_view();
    view.render(0.0);

    // Root spans three units starting one unit in, so its connector bar sits
    // at y = 42 around x = 200.
    let toggled = view.click_at(200.0, 42.0, 50.0);
    assert_eq!(toggled.as_deref(), Some("root"));
    assert!(view.model().root().is_collapsed());

    // A click in empty space does nothing.
    assert_eq!(view.click_at(5000.0, 5000.0, 60.0), None);

    // Leaves have no toggle region at their bar: "b" is the childless leaf
    // centered at x = 300 on the y = 84 row.
    let mut view = sample_view();
    view.render(0.0);
    assert_eq!(view.click_at(300.0, 84.0, 70.0), None);
    // Its sibling "a" does have one on the same row.
    assert_eq!(view.click_at(150.0, 84.0, 80.0).as_deref(), Some("a"));
}

#[test]
fn projection_force_expands_the_path_and_highlights_the_target() {
    let model = TreeModel::from_value(json!({
        "name": "root",
        "children": [
            {
                "name": "l1",
                "children": [
                    { "name": "l2", "children": [
                        { "name": "l3", "children": [{ "name": "X" }] }
                    ] },
                    { "name": "sibling", "children": [{ "name": "hidden" }] }
                ]
            }
        ]
    }))
    .unwrap();
    let mut view = TreeView::new(model, DsTreeConfig::default(), icons(), Surface::new());
    // Collapse everything on and off the path, then project onto X.
    for name in ["l1", "l2", "l3", "sibling"] {
        view.click(name, 0.0);
    }
    view.set_highlight_names(["X".to_string()]);
    view.render(100.0);

    assert!(view.surface().contains("node:X"));
    let root = view.model().root();
    assert!(!root.is_collapsed());
    assert!(!root.children[0].is_collapsed());
    assert!(!root.children[0].children[0].is_collapsed());
    assert!(!root.children[0].children[0].children[0].is_collapsed());
    // The off-path sibling keeps its collapsed state.
    assert!(root.children[0].children[1].is_collapsed());
    assert!(!view.surface().contains("node:hidden"));

    let element = view.surface().get("node:X").unwrap();
    let highlighted = element.primitives.iter().any(|p| match p {
        Primitive::Label(label) => label.highlighted,
        _ => false,
    });
    assert!(highlighted, "projected node label should be highlighted");
}

#[test]
fn repeated_renders_of_an_unchanged_tree_only_update() {
    let mut view = sample_view();
    view.render(0.0);
    let outcome = view.render(50.0);
    assert!(outcome.entered.is_empty());
    assert!(outcome.exited.is_empty());
    assert_eq!(outcome.updated.len(), 8);
}
