//! Keyed reconciliation and animated transitions.
//!
//! Each pass produces a fresh set of element descriptors; diffing them against
//! the surface by key partitions every element into entering, updating or
//! exiting. Entering nodes appear directly at final geometry, entering
//! operator glyphs fade in, updating elements animate position and connector
//! path data, exiting elements fade out and are then removed.
//!
//! Transitions are plain interpolation tasks keyed by element: scheduling a
//! new task on a key replaces any in-flight one, so a later pass supersedes a
//! still-running animation without any cancellation machinery. The embedder
//! drives time by calling [`Animator::tick`] with its wall clock.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::surface::{ElementKind, Primitive, SceneElement, Surface};
use crate::visual::ElementDesc;

/// Per-pass classification of element keys, in descriptor order.
#[derive(Debug, Clone, Default)]
pub struct DiffOutcome {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

#[derive(Debug, Clone)]
struct PathTween {
    /// Primitive index in the element this tween writes to.
    index: usize,
    from: String,
    to: String,
}

#[derive(Debug, Clone)]
struct Transition {
    start_ms: f64,
    duration_ms: f64,
    from_x: f64,
    from_y: f64,
    to_x: f64,
    to_y: f64,
    from_opacity: f64,
    to_opacity: f64,
    paths: Vec<PathTween>,
    remove_on_end: bool,
}

/// Time-based interpolation tasks, one per element key, linear easing.
#[derive(Debug, Default)]
pub struct Animator {
    transitions: IndexMap<String, Transition>,
}

impl Animator {
    pub fn is_animating(&self, key: &str) -> bool {
        self.transitions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    fn schedule(&mut self, key: String, transition: Transition) {
        // Later pass wins: any in-flight task on the same key is replaced.
        self.transitions.insert(key, transition);
    }

    /// Advances every transition to `now_ms`, writing interpolated geometry
    /// into the surface. Finished exit transitions remove their element.
    pub fn tick(&mut self, surface: &mut Surface, now_ms: f64) {
        let mut finished = Vec::new();
        for (key, t) in &self.transitions {
            let progress = if t.duration_ms <= 0.0 {
                1.0
            } else {
                ((now_ms - t.start_ms) / t.duration_ms).clamp(0.0, 1.0)
            };
            if let Some(element) = surface.get_mut(key) {
                element.x = lerp(t.from_x, t.to_x, progress);
                element.y = lerp(t.from_y, t.to_y, progress);
                element.opacity = lerp(t.from_opacity, t.to_opacity, progress);
                for tween in &t.paths {
                    if let Some(Primitive::Path(path)) = element.primitives.get_mut(tween.index) {
                        path.data = interpolate_path_data(&tween.from, &tween.to, progress);
                    }
                }
            }
            if progress >= 1.0 {
                finished.push(key.clone());
            }
        }
        for key in finished {
            if let Some(t) = self.transitions.shift_remove(&key) {
                if t.remove_on_end {
                    surface.remove(&key);
                }
            }
        }
    }
}

/// Applies one pass worth of descriptors to the surface.
pub fn reconcile(
    surface: &mut Surface,
    animator: &mut Animator,
    descriptors: Vec<ElementDesc>,
    now_ms: f64,
    duration_ms: f64,
) -> DiffOutcome {
    let mut outcome = DiffOutcome::default();
    let new_keys: FxHashSet<String> = descriptors.iter().map(|d| d.key.clone()).collect();

    for desc in descriptors {
        // A key still fading out that reappears re-enters from scratch.
        if surface.get(&desc.key).is_some_and(|el| el.exiting) {
            surface.remove(&desc.key);
            animator.transitions.shift_remove(&desc.key);
        }

        match surface.get_mut(&desc.key) {
            Some(element) => {
                let key = desc.key.clone();
                update_element(animator, &key, element, desc, now_ms, duration_ms);
                outcome.updated.push(key);
            }
            None => {
                enter_element(surface, animator, desc, now_ms, duration_ms, &mut outcome);
            }
        }
    }

    // Keys present only on the surface exit: fade out, then remove.
    let stale: Vec<String> = surface
        .iter()
        .filter(|(key, element)| !new_keys.contains(*key) && !element.exiting)
        .map(|(key, _)| key.to_string())
        .collect();
    for key in stale {
        let Some(element) = surface.get_mut(&key) else {
            continue;
        };
        element.exiting = true;
        animator.schedule(key.clone(), Transition {
            start_ms: now_ms,
            duration_ms,
            from_x: element.x,
            from_y: element.y,
            to_x: element.x,
            to_y: element.y,
            from_opacity: element.opacity,
            to_opacity: 0.0,
            paths: Vec::new(),
            remove_on_end: true,
        });
        outcome.exited.push(key);
    }

    outcome
}

fn enter_element(
    surface: &mut Surface,
    animator: &mut Animator,
    desc: ElementDesc,
    now_ms: f64,
    duration_ms: f64,
    outcome: &mut DiffOutcome,
) {
    // Nodes enter directly at final geometry; only operator glyphs fade in.
    let fade_in = desc.kind == ElementKind::OperatorGlyph;
    let element = SceneElement {
        kind: desc.kind,
        x: desc.x,
        y: desc.y,
        opacity: if fade_in { 0.0 } else { 1.0 },
        exiting: false,
        primitives: desc.primitives,
    };
    surface.insert(desc.key.clone(), element);
    if fade_in {
        animator.schedule(desc.key.clone(), Transition {
            start_ms: now_ms,
            duration_ms,
            from_x: desc.x,
            from_y: desc.y,
            to_x: desc.x,
            to_y: desc.y,
            from_opacity: 0.0,
            to_opacity: 1.0,
            paths: Vec::new(),
            remove_on_end: false,
        });
    }
    outcome.entered.push(desc.key);
}

fn update_element(
    animator: &mut Animator,
    key: &str,
    element: &mut SceneElement,
    desc: ElementDesc,
    now_ms: f64,
    duration_ms: f64,
) {
    let from_x = element.x;
    let from_y = element.y;
    let from_opacity = element.opacity;

    // Pair path primitives by ordinal between the old and new primitive sets;
    // paired paths start from their old data and tween toward the new.
    // Everything else (labels, icons, hit rects, stroke widths) snaps to the
    // new descriptor immediately.
    let old_paths: Vec<String> = element
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Path(path) => Some(path.data.clone()),
            _ => None,
        })
        .collect();

    element.primitives = desc.primitives;
    let mut tweens = Vec::new();
    let mut ordinal = 0usize;
    for (index, primitive) in element.primitives.iter_mut().enumerate() {
        if let Primitive::Path(path) = primitive {
            if let Some(old) = old_paths.get(ordinal) {
                tweens.push(PathTween {
                    index,
                    from: old.clone(),
                    to: path.data.clone(),
                });
                path.data = old.clone();
            }
            ordinal += 1;
        }
    }

    animator.schedule(key.to_string(), Transition {
        start_ms: now_ms,
        duration_ms,
        from_x,
        from_y,
        to_x: desc.x,
        to_y: desc.y,
        from_opacity,
        to_opacity: 1.0,
        paths: tweens,
        remove_on_end: false,
    });
}

fn lerp(a: f64, b: f64, p: f64) -> f64 {
    a + (b - a) * p
}

#[derive(Debug, Clone)]
enum Token {
    Num(f64),
    Text(String),
}

fn tokenize(data: &str) -> Vec<Token> {
    let chars: Vec<char> = data.chars().collect();
    let mut out = Vec::new();
    let mut text = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let starts_number = c.is_ascii_digit()
            || ((c == '-' || c == '.')
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()));
        if !starts_number {
            text.push(c);
            i += 1;
            continue;
        }
        if !text.is_empty() {
            out.push(Token::Text(std::mem::take(&mut text)));
        }
        let start = i;
        if chars[i] == '-' {
            i += 1;
        }
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i < chars.len() && chars[i] == '.' {
            i += 1;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
        let literal: String = chars[start..i].iter().collect();
        out.push(Token::Num(literal.parse().unwrap_or(0.0)));
    }
    if !text.is_empty() {
        out.push(Token::Text(text));
    }
    out
}

fn fmt_num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Numeric-token interpolation between two path strings. When the token
/// structure differs (different command shapes), the data snaps to the new
/// string instead of producing garbage.
pub fn interpolate_path_data(from: &str, to: &str, progress: f64) -> String {
    if progress >= 1.0 {
        return to.to_string();
    }
    if progress <= 0.0 {
        return from.to_string();
    }
    let a = tokenize(from);
    let b = tokenize(to);
    if a.len() != b.len() {
        return to.to_string();
    }
    let mut out = String::with_capacity(to.len());
    for (ta, tb) in a.iter().zip(b.iter()) {
        match (ta, tb) {
            (Token::Num(x), Token::Num(y)) => out.push_str(&fmt_num(lerp(*x, *y, progress))),
            (Token::Text(x), Token::Text(y)) if x == y => out.push_str(x),
            _ => return to.to_string(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ElementKind, PathPrimitive};

    fn node_desc(key: &str, x: f64, data: &str) -> ElementDesc {
        ElementDesc {
            key: key.to_string(),
            kind: ElementKind::Node,
            x,
            y: 42.0,
            primitives: vec![Primitive::Path(PathPrimitive {
                data: data.to_string(),
                stroke: "black".to_string(),
                stroke_width: 1.0,
                dash: None,
            })],
        }
    }

    fn glyph_desc(key: &str, x: f64) -> ElementDesc {
        ElementDesc {
            key: key.to_string(),
            kind: ElementKind::OperatorGlyph,
            x,
            y: 10.0,
            primitives: Vec::new(),
        }
    }

    #[test]
    fn path_interpolation_lerps_numbers_and_keeps_commands() {
        let half = interpolate_path_data("M 0 0 H 100", "M 10 0 H 200", 0.5);
        assert_eq!(half, "M 5 0 H 150");
    }

    #[test]
    fn path_interpolation_snaps_on_structural_mismatch() {
        let out = interpolate_path_data("M 0 0", "M 0 0 V 10", 0.5);
        assert_eq!(out, "M 0 0 V 10");
    }

    #[test]
    fn nodes_enter_at_final_geometry_and_glyphs_fade_in() {
        let mut surface = Surface::new();
        let mut animator = Animator::default();
        let outcome = reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 50.0, "M 5 0 H 95"), glyph_desc("op:a_0", 70.0)],
            0.0,
            500.0,
        );
        assert_eq!(outcome.entered, vec!["node:a", "op:a_0"]);
        assert_eq!(surface.get("node:a").unwrap().opacity, 1.0);
        assert_eq!(surface.get("op:a_0").unwrap().opacity, 0.0);
        assert!(!animator.is_animating("node:a"));

        animator.tick(&mut surface, 250.0);
        assert_eq!(surface.get("op:a_0").unwrap().opacity, 0.5);
        animator.tick(&mut surface, 500.0);
        assert_eq!(surface.get("op:a_0").unwrap().opacity, 1.0);
        assert!(animator.is_empty());
    }

    #[test]
    fn updates_animate_position_and_path_data() {
        let mut surface = Surface::new();
        let mut animator = Animator::default();
        reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 100.0, "M 5 0 H 95")],
            0.0,
            500.0,
        );
        let outcome = reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 200.0, "M 5 0 H 195")],
            0.0,
            500.0,
        );
        assert_eq!(outcome.updated, vec!["node:a"]);
        assert!(outcome.entered.is_empty() && outcome.exited.is_empty());

        animator.tick(&mut surface, 250.0);
        let el = surface.get("node:a").unwrap();
        assert_eq!(el.x, 150.0);
        let Primitive::Path(path) = &el.primitives[0] else {
            panic!("expected a path");
        };
        assert_eq!(path.data, "M 5 0 H 145");
    }

    #[test]
    fn a_later_pass_supersedes_an_in_flight_transition() {
        let mut surface = Surface::new();
        let mut animator = Animator::default();
        reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 0.0, "M 0 0")],
            0.0,
            500.0,
        );
        reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 100.0, "M 0 0")],
            0.0,
            500.0,
        );
        // Halfway to 100, then a new pass retargets to 400 from wherever the
        // element currently is.
        animator.tick(&mut surface, 250.0);
        reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 400.0, "M 0 0")],
            250.0,
            500.0,
        );
        animator.tick(&mut surface, 750.0);
        assert_eq!(surface.get("node:a").unwrap().x, 400.0);
        assert_eq!(animator.len(), 0);
    }

    #[test]
    fn exits_fade_out_and_are_removed_when_done() {
        let mut surface = Surface::new();
        let mut animator = Animator::default();
        reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 0.0, "M 0 0"), node_desc("node:b", 100.0, "M 0 0")],
            0.0,
            500.0,
        );
        let outcome = reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 0.0, "M 0 0")],
            0.0,
            500.0,
        );
        assert_eq!(outcome.exited, vec!["node:b"]);
        assert!(surface.get("node:b").unwrap().exiting);

        animator.tick(&mut surface, 250.0);
        assert_eq!(surface.get("node:b").unwrap().opacity, 0.5);
        animator.tick(&mut surface, 500.0);
        assert!(surface.get("node:b").is_none());
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn a_key_in_both_sets_is_updating_never_entering_or_exiting() {
        let mut surface = Surface::new();
        let mut animator = Animator::default();
        reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 0.0, "M 0 0")],
            0.0,
            500.0,
        );
        let outcome = reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 10.0, "M 0 0")],
            100.0,
            500.0,
        );
        assert_eq!(outcome.updated, vec!["node:a"]);
        assert!(!outcome.entered.contains(&"node:a".to_string()));
        assert!(!outcome.exited.contains(&"node:a".to_string()));
    }

    #[test]
    fn an_exiting_key_that_reappears_re_enters() {
        let mut surface = Surface::new();
        let mut animator = Animator::default();
        reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 0.0, "M 0 0")],
            0.0,
            500.0,
        );
        reconcile(&mut surface, &mut animator, Vec::new(), 0.0, 500.0);
        assert!(surface.get("node:a").unwrap().exiting);

        let outcome = reconcile(
            &mut surface,
            &mut animator,
            vec![node_desc("node:a", 50.0, "M 0 0")],
            100.0,
            500.0,
        );
        assert_eq!(outcome.entered, vec!["node:a"]);
        let el = surface.get("node:a").unwrap();
        assert!(!el.exiting);
        assert_eq!(el.opacity, 1.0);
        // The superseded exit task is gone; ticking past its end must not
        // remove the re-entered element.
        animator.tick(&mut surface, 600.0);
        assert!(surface.get("node:a").is_some());
    }
}
