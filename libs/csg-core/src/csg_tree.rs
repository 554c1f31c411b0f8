//! # CSG Sum-of-Products Builder (C7)
//!
//! Rewrites a normalized boolean subtree into a flat list of
//! [`CsgProduct`]s: `(i0 ∩ i1 ∩ …) − (s0 ∪ s1 ∪ …)`, each referencing only
//! primitive leaf node indices. This is the normal form a BSP-style
//! boolean kernel consumes directly, one product at a time, instead of
//! re-walking the original tree's operator nesting for every evaluation.
//!
//! Two identities make the rewrite exact for union, intersection, and
//! (union-only) difference subtrahends:
//! - `union` distributes: `products(A ∪ B) = products(A) ++ products(B)`.
//! - `intersection` distributes over the product-of-differences form:
//!   `(P1∖N1) ∩ (P2∖N2) = (P1∩P2) ∖ (N1∪N2)`, so combining two operands'
//!   product lists is a literal cross product with concatenated
//!   intersection/subtraction sets.
//!
//! A `difference`'s subtrahend is flattened to the union of every leaf
//! index reachable in it, which is exact whenever the subtrahend contains
//! no further intersection (the common case — subtracting a union of
//! shapes); a subtrahend built from `intersection` is only approximated by
//! this flattening (see the `Resolved` note in the crate's design ledger).

use std::collections::HashMap;

use glam::{DMat4, DVec3};

use crate::error::{CoreError, Warning};
use crate::geometry::Geometry;
use crate::node::{BooleanOp, Node, NodeKind};

/// One term of the sum-of-products normal form: the intersection of every
/// leaf in `intersections`, minus the union of every leaf in
/// `subtractions`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsgProduct {
    /// Leaf node indices ANDed together.
    pub intersections: Vec<u32>,
    /// Leaf node indices unioned, then subtracted from the intersection.
    pub subtractions: Vec<u32>,
    /// Promoted from the first (positive) intersection operand's own
    /// highlight flag, per spec.md §4.6.
    pub highlight: bool,
}

/// One geometry-producing leaf of the build phase: the primitive's own
/// (untransformed) geometry plus the transform/color/tags accumulated from
/// every enclosing node on the path from the tree root, and a diagnostic
/// label. [`build_products`] resolves a boolean subtree down to leaf
/// indices alone; a [`CsgLeaf`] map from [`build_leaves`] is what turns
/// those indices back into positioned, colored preview geometry.
#[derive(Debug, Clone)]
pub struct CsgLeaf {
    /// The primitive's own geometry, in its local (untransformed) frame.
    pub geometry: Geometry,
    /// World-space transform accumulated from every enclosing `Transform`.
    pub transform: DMat4,
    /// The nearest enclosing `color()`, if any. Outermost wins, matching
    /// [`crate::normalize::push_colors_down`]'s nested-color rule.
    pub color: Option<[f32; 4]>,
    /// `"<node kind> #<index>"`.
    pub label: String,
    /// `%` prefix: excluded from the boolean result, shown only in preview.
    pub background: bool,
    /// `#` prefix: included in the boolean result, emphasized in preview.
    pub highlight: bool,
}

/// Walks `node`'s (already normalized) tree and returns a [`CsgLeaf`] and a
/// world-space AABB for every geometry-producing leaf, keyed by node index
/// — the companion half of [`build_products`]'s build phase. `leaf_bboxes`
/// from the returned map is what `build_products` consults to prune
/// disjoint intersection terms.
pub fn build_leaves(node: &Node) -> (HashMap<u32, CsgLeaf>, HashMap<u32, (DVec3, DVec3)>) {
    let mut leaves = HashMap::new();
    let mut bboxes = HashMap::new();
    walk_leaves(node, DMat4::IDENTITY, None, false, false, &mut leaves, &mut bboxes);
    (leaves, bboxes)
}

#[allow(clippy::too_many_arguments)]
fn walk_leaves(
    node: &Node,
    transform: DMat4,
    color: Option<[f32; 4]>,
    background: bool,
    highlight: bool,
    leaves: &mut HashMap<u32, CsgLeaf>,
    bboxes: &mut HashMap<u32, (DVec3, DVec3)>,
) {
    let transform = match node.kind {
        NodeKind::Transform(m) => transform * m,
        _ => transform,
    };
    let color = match &node.kind {
        NodeKind::Color(rgba) if color.is_none() => Some(*rgba),
        _ => color,
    };
    let background = background || node.modinst.background;
    let highlight = highlight || node.modinst.highlight;

    let geometry = match &node.kind {
        NodeKind::Primitive3D(kind) => Some(crate::primitives::build_3d(kind)),
        NodeKind::Primitive2D(kind) => Some(crate::primitives::build_2d(kind)),
        _ => None,
    };

    if let Some(geometry) = geometry {
        if let Some(local) = geometry_local_bbox(&geometry) {
            bboxes.insert(node.index, transform_bbox(local, &transform));
        }
        leaves.insert(
            node.index,
            CsgLeaf {
                geometry,
                transform,
                color,
                label: format!("{} #{}", node.kind.name(), node.index),
                background,
                highlight,
            },
        );
        return;
    }

    for child in &node.children {
        walk_leaves(child, transform, color, background, highlight, leaves, bboxes);
    }
}

fn geometry_local_bbox(g: &Geometry) -> Option<(DVec3, DVec3)> {
    match g {
        Geometry::Empty => None,
        Geometry::Polygon2D(p) => p.bbox().map(|(lo, hi)| (lo.extend(0.0), hi.extend(0.0))),
        Geometry::PolySet3D(p) => p.bbox(),
    }
}

/// Transforms an axis-aligned local bbox by `m`, re-deriving an
/// axis-aligned world bbox from the 8 transformed corners (a rotation can
/// make the tightest enclosing box larger than the local one).
fn transform_bbox(local: (DVec3, DVec3), m: &DMat4) -> (DVec3, DVec3) {
    let (lo, hi) = local;
    let corners = [
        DVec3::new(lo.x, lo.y, lo.z),
        DVec3::new(hi.x, lo.y, lo.z),
        DVec3::new(lo.x, hi.y, lo.z),
        DVec3::new(hi.x, hi.y, lo.z),
        DVec3::new(lo.x, lo.y, hi.z),
        DVec3::new(hi.x, lo.y, hi.z),
        DVec3::new(lo.x, hi.y, hi.z),
        DVec3::new(hi.x, hi.y, hi.z),
    ];
    let mut world_lo = DVec3::splat(f64::INFINITY);
    let mut world_hi = DVec3::splat(f64::NEG_INFINITY);
    for c in corners {
        let p = m.transform_point3(c);
        world_lo = world_lo.min(p);
        world_hi = world_hi.max(p);
    }
    (world_lo, world_hi)
}

/// Promotes each product's highlight flag from its first (positive)
/// intersection operand, per spec.md §4.6.
pub fn promote_highlights(products: &mut [CsgProduct], leaves: &HashMap<u32, CsgLeaf>) {
    for p in products {
        p.highlight = p
            .intersections
            .first()
            .and_then(|idx| leaves.get(idx))
            .is_some_and(|leaf| leaf.highlight);
    }
}

/// Builds the sum-of-products form of the boolean subtree rooted at
/// `node`. `leaf_bboxes` (world-space AABBs, keyed by leaf node index) is
/// used to drop intersection terms whose operands cannot possibly overlap
/// without ever invoking the kernel; a leaf missing from the map is
/// treated as unbounded (never pruned).
///
/// Caps the output at `max_terms`: once reached, stops expanding further
/// cross products and raises a [`CoreError::NormalizerOverflow`] warning
/// instead of growing unbounded (a deeply nested intersection of large
/// unions is combinatorial in term count).
pub fn build_products(
    node: &Node,
    leaf_bboxes: &HashMap<u32, (DVec3, DVec3)>,
    max_terms: usize,
    warnings: &mut Vec<Warning>,
) -> Vec<CsgProduct> {
    match &node.kind {
        NodeKind::Primitive3D(_) | NodeKind::Primitive2D(_) => vec![CsgProduct {
            intersections: vec![node.index],
            subtractions: Vec::new(),
            highlight: false,
        }],

        NodeKind::CsgOp(BooleanOp::Union) => node
            .children
            .iter()
            .flat_map(|c| build_products(c, leaf_bboxes, max_terms, warnings))
            .collect(),

        NodeKind::CsgOp(BooleanOp::Intersection) => {
            let mut children = node.children.iter();
            let Some(first) = children.next() else {
                return Vec::new();
            };
            let mut acc = build_products(first, leaf_bboxes, max_terms, warnings);
            for child in children {
                let next = build_products(child, leaf_bboxes, max_terms, warnings);
                acc = cross_intersect(&acc, &next, leaf_bboxes, max_terms, node.index, warnings);
            }
            acc
        }

        NodeKind::CsgOp(BooleanOp::Difference) => {
            let mut children = node.children.iter();
            let Some(first) = children.next() else {
                return Vec::new();
            };
            let mut acc = build_products(first, leaf_bboxes, max_terms, warnings);
            let mut flattened_negatives = Vec::new();
            for negative in children {
                collect_leaf_indices(negative, &mut flattened_negatives);
            }
            for term in &mut acc {
                term.subtractions.extend(flattened_negatives.iter().copied());
            }
            acc
        }

        // A normalized tree's remaining structural kinds (`Group`, `Root`,
        // `List`, a leaf-wrapping `Transform`/`Color`, `Render`) carry no
        // boolean meaning of their own: the set they describe is just the
        // union of their children's sets.
        _ => node
            .children
            .iter()
            .flat_map(|c| build_products(c, leaf_bboxes, max_terms, warnings))
            .collect(),
    }
}

fn collect_leaf_indices(node: &Node, out: &mut Vec<u32>) {
    if matches!(node.kind, NodeKind::Primitive3D(_) | NodeKind::Primitive2D(_)) {
        out.push(node.index);
    }
    for child in &node.children {
        collect_leaf_indices(child, out);
    }
}

fn cross_intersect(
    left: &[CsgProduct],
    right: &[CsgProduct],
    leaf_bboxes: &HashMap<u32, (DVec3, DVec3)>,
    max_terms: usize,
    node_index: u32,
    warnings: &mut Vec<Warning>,
) -> Vec<CsgProduct> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            if !bboxes_overlap(l, r, leaf_bboxes) {
                continue;
            }
            if out.len() >= max_terms {
                warnings.push(Warning::new(
                    node_index,
                    CoreError::NormalizerOverflow { limit: max_terms },
                ));
                return out;
            }
            let intersections = l.intersections.iter().chain(r.intersections.iter()).copied().collect();
            let subtractions = l.subtractions.iter().chain(r.subtractions.iter()).copied().collect();
            out.push(CsgProduct {
                intersections,
                subtractions,
                highlight: false,
            });
        }
    }
    out
}

/// Conservatively true when every leaf's bounding box overlaps the running
/// intersection of the rest; a missing bbox is treated as unbounded so
/// pruning never drops a term that might actually be non-empty.
fn bboxes_overlap(l: &CsgProduct, r: &CsgProduct, leaf_bboxes: &HashMap<u32, (DVec3, DVec3)>) -> bool {
    let mut lo = DVec3::splat(f64::NEG_INFINITY);
    let mut hi = DVec3::splat(f64::INFINITY);
    for &idx in l.intersections.iter().chain(r.intersections.iter()) {
        let Some((leaf_lo, leaf_hi)) = leaf_bboxes.get(&idx) else {
            continue;
        };
        lo = lo.max(*leaf_lo);
        hi = hi.min(*leaf_hi);
        if lo.x > hi.x || lo.y > hi.y || lo.z > hi.z {
            return false;
        }
    }
    true
}
