//! # Tree Normalizer (C2)
//!
//! Destructively rewrites a node tree bottom-up into canonical form. Every
//! rewrite here is semantics-preserving (the geometry a subtree evaluates
//! to is unchanged) and the whole pass is idempotent: `normalize(normalize(T))
//! == normalize(T)`.

use glam::DMat4;

use crate::node::{BooleanOp, ModInst, Node, NodeKind};

/// Normalizes `root` in place, then renumbers the surviving tree's indices
/// consecutively from 1.
///
/// If any descendant carries the root-mark tag, the tree is first pruned to
/// only root-marked subtrees (plus their ancestors), per §4.1's "show this
/// subtree only" rule.
pub fn normalize(root: &mut Node) {
    if subtree_has_root_mark(root) {
        prune_to_root_marked(root);
    }
    normalize_node(root);
    root.renumber(1);
}

fn subtree_has_root_mark(node: &Node) -> bool {
    node.modinst.root_mark || node.children.iter().any(subtree_has_root_mark)
}

/// Drops every child subtree that contains no root-marked node, keeping
/// ancestors of root-marked nodes and root-marked nodes themselves.
fn prune_to_root_marked(node: &mut Node) {
    node.children.retain_mut(|child| {
        if subtree_has_root_mark(child) {
            prune_to_root_marked(child);
            true
        } else {
            false
        }
    });
}

/// Applies all four rewrites, post-order, until the node's own shape no
/// longer changes (a node introduced by flattening/unwrapping a child may
/// itself need another pass of the same rewrites).
fn normalize_node(node: &mut Node) {
    for child in &mut node.children {
        normalize_node(child);
    }
    flatten_associative(node);
    push_transforms_down(node);
    push_colors_down(node);
    unwrap_single_child(node);
}

/// Rewrite 2: children of a `union`/`intersection` node that are themselves
/// the same operator are flattened into the parent (not done for
/// `difference`, which is non-commutative). `List`/`Group` flatten into
/// each other when the parent is a union-type node.
fn flatten_associative(node: &mut Node) {
    let flattenable_op = match &node.kind {
        NodeKind::CsgOp(op @ (BooleanOp::Union | BooleanOp::Intersection)) => Some(*op),
        _ => None,
    };
    let is_union_type = node.kind.is_union_type();

    let mut flattened = Vec::with_capacity(node.children.len());
    for child in node.children.drain(..) {
        let adopt = match (&flattenable_op, &child.kind) {
            (Some(op), NodeKind::CsgOp(child_op)) if op == child_op && !child.modinst.is_tagged() => true,
            _ if is_union_type
                && matches!(child.kind, NodeKind::List | NodeKind::Group)
                && !child.modinst.is_tagged() =>
            {
                true
            }
            _ => false,
        };
        if adopt {
            flattened.extend(child.children);
        } else {
            flattened.push(child);
        }
    }
    node.children = flattened;
}

/// Rewrite 3: push a multi-child (or transform/color-child) `Transform`
/// down onto each child, composing matrices, and moving inside any `Color`
/// child (color wraps transform).
fn push_transforms_down(node: &mut Node) {
    let NodeKind::Transform(m) = node.kind else {
        return;
    };
    let should_push = node.children.len() > 1
        || node
            .children
            .first()
            .is_some_and(|c| matches!(c.kind, NodeKind::Transform(_) | NodeKind::Color(_)));
    if !should_push {
        return;
    }

    let children = std::mem::take(&mut node.children);
    let pushed: Vec<Node> = children
        .into_iter()
        .map(|child| wrap_with_transform(child, m))
        .collect();

    // This node becomes a transparent union of the newly-wrapped children.
    node.kind = NodeKind::Group;
    node.children = pushed;
    // A wrapped child may itself now be `Color -> Transform -> ...`: the
    // `Transform` landed one level below `Color`, where this function's own
    // `NodeKind::Transform(m) = node.kind` guard never looks, so a single
    // call here would leave it uncombined with the inner transform it was
    // just merged above. Re-running full normalization on each new child
    // re-descends through any such wrapper to a fixed point.
    for child in &mut node.children {
        normalize_node(child);
    }
}

fn wrap_with_transform(mut child: Node, m: DMat4) -> Node {
    match child.kind {
        NodeKind::Transform(existing) => {
            child.kind = NodeKind::Transform(m * existing);
            child
        }
        NodeKind::Color(rgba) => {
            // Color wraps transform: push `m` below the color, onto a new
            // Transform node wrapping the color's own children.
            let grandchildren = std::mem::take(&mut child.children);
            let inner = Node::new(0, NodeKind::Transform(m), grandchildren);
            child.children = vec![inner];
            child
        }
        _ => Node::new(0, NodeKind::Transform(m), vec![child]),
    }
}

/// Rewrite 4: push a multi-child `Color` down onto each child; nested
/// `Color` keeps the outermost (first-assigned) color.
fn push_colors_down(node: &mut Node) {
    let NodeKind::Color(rgba) = node.kind else {
        return;
    };
    if node.children.len() <= 1 {
        return;
    }
    let children = std::mem::take(&mut node.children);
    let pushed: Vec<Node> = children
        .into_iter()
        .map(|child| wrap_with_color(child, rgba))
        .collect();
    node.kind = NodeKind::Group;
    node.children = pushed;
}

fn wrap_with_color(mut child: Node, rgba: [f32; 4]) -> Node {
    if let NodeKind::Color(_) = child.kind {
        // Outermost (first-assigned) color wins: leave the child's own
        // color as-is rather than overwriting it.
        child
    } else {
        Node::new(0, NodeKind::Color(rgba), vec![child])
    }
}

/// Rewrite 1: a `Group`/`Root`/`List`/`CsgOp` with exactly one untagged
/// child is replaced by that child; a tagged parent keeps its tags by
/// moving them onto the surviving child (tags are never dropped).
fn unwrap_single_child(node: &mut Node) {
    if node.children.len() != 1 || !node.kind.is_structural_or_boolean() {
        return;
    }
    if node.modinst.is_tagged() {
        // Preserve tags: merge them onto the child instead of dropping
        // this node outright.
        let mut only_child = node.children.pop().expect("length checked above");
        only_child.modinst = merge_modinst(node.modinst, only_child.modinst);
        *node = only_child;
    } else {
        *node = node.children.pop().expect("length checked above");
    }
}

fn merge_modinst(outer: ModInst, inner: ModInst) -> ModInst {
    ModInst {
        background: outer.background || inner.background,
        highlight: outer.highlight || inner.highlight,
        root_mark: outer.root_mark || inner.root_mark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Primitive3DKind;

    fn cube() -> Node {
        Node::new(
            0,
            NodeKind::Primitive3D(Primitive3DKind::Cube {
                size: glam::DVec3::ONE,
                center: false,
            }),
            vec![],
        )
    }

    #[test]
    fn test_unwraps_single_child_group() {
        let mut root = Node::new(1, NodeKind::Group, vec![cube()]);
        normalize(&mut root);
        assert!(matches!(root.kind, NodeKind::Primitive3D(_)));
    }

    #[test]
    fn test_flattens_nested_unions() {
        let inner = Node::new(2, NodeKind::CsgOp(BooleanOp::Union), vec![cube(), cube()]);
        let mut root = Node::new(
            1,
            NodeKind::CsgOp(BooleanOp::Union),
            vec![inner, cube()],
        );
        normalize(&mut root);
        assert_eq!(root.children.len(), 3);
    }

    #[test]
    fn test_does_not_flatten_difference() {
        let inner = Node::new(
            2,
            NodeKind::CsgOp(BooleanOp::Difference),
            vec![cube(), cube()],
        );
        let mut root = Node::new(1, NodeKind::CsgOp(BooleanOp::Union), vec![inner, cube()]);
        normalize(&mut root);
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inner = Node::new(2, NodeKind::CsgOp(BooleanOp::Union), vec![cube(), cube()]);
        let mut once = Node::new(1, NodeKind::CsgOp(BooleanOp::Union), vec![inner, cube()]);
        normalize(&mut once);
        let mut twice = once.clone();
        normalize(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_deeply_nested_unions_collapse_to_depth_one() {
        let mut tree = cube();
        for i in 0..100u32 {
            tree = Node::new(i + 10, NodeKind::CsgOp(BooleanOp::Union), vec![tree]);
        }
        let mut root = Node::new(1, NodeKind::Root, vec![tree]);
        normalize(&mut root);
        assert!(matches!(root.kind, NodeKind::Primitive3D(_)));
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_transform_push_down_composes_matrices() {
        let m1 = DMat4::from_translation(glam::DVec3::new(1.0, 0.0, 0.0));
        let m2 = DMat4::from_translation(glam::DVec3::new(0.0, 2.0, 0.0));
        let inner = Node::new(3, NodeKind::Transform(m2), vec![cube()]);
        let mut root = Node::new(1, NodeKind::Transform(m1), vec![inner]);
        normalize(&mut root);
        // push_transforms_down only activates for >1 children or a
        // transform/color child; here the single Transform child triggers it.
        let NodeKind::Transform(composed) = root.children[0].kind else {
            panic!("expected pushed transform");
        };
        assert_eq!(composed, m1 * m2);
    }

    #[test]
    fn test_transform_push_down_combines_through_intervening_color() {
        let m1 = DMat4::from_translation(glam::DVec3::new(1.0, 0.0, 0.0));
        let m2 = DMat4::from_translation(glam::DVec3::new(0.0, 2.0, 0.0));
        let colored = Node::new(
            2,
            NodeKind::Color([1.0, 0.0, 0.0, 1.0]),
            vec![Node::new(3, NodeKind::Transform(m2), vec![cube()])],
        );
        let mut once = Node::new(1, NodeKind::Transform(m1), vec![colored]);
        normalize(&mut once);

        let NodeKind::Color(_) = once.kind else {
            panic!("expected Color to stay outermost, got {:?}", once.kind);
        };
        let NodeKind::Transform(composed) = once.children[0].kind else {
            panic!("expected the two transforms combined under Color");
        };
        assert_eq!(composed, m1 * m2);

        let mut twice = once.clone();
        normalize(&mut twice);
        assert_eq!(once, twice, "normalize must be idempotent");
    }

    #[test]
    fn test_root_mark_prunes_unmarked_siblings() {
        let mut marked = cube();
        marked.modinst.root_mark = true;
        let root = Node::new(1, NodeKind::Root, vec![cube(), marked]);
        let mut root = root;
        normalize(&mut root);
        // After pruning, only the root-marked cube remains (and may have
        // been unwrapped since it was the sole surviving child).
        assert!(!matches!(root.kind, NodeKind::Root) || root.children.len() == 1);
    }
}
