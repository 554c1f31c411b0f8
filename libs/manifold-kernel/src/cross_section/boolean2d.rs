//! # 2D Polygon Boolean Engine
//!
//! Union, intersection, and difference of [`Polygon2D`] values via even-odd
//! polygon clipping: every edge of both operands is split at its
//! intersections with the other operand, each resulting sub-segment is
//! classified by testing whether its midpoint lies inside the other
//! polygon (even-odd point-in-polygon), and the kept sub-segments are
//! chained back into closed outlines by matching endpoints.
//!
//! This mirrors the `manifold` module's BSP boolean pattern one dimension
//! down: "keep A outside B, keep B outside A" for union, "keep both inside"
//! for intersection, "keep A outside B, keep B inside A reversed" for
//! difference — instead of splitting against a BSP tree of planes, each
//! operand is split against the other's edge list directly.

use csg_core::geometry::{Outline2D, Polygon2D};
use glam::DVec2;

/// Snapping grid for chaining sub-segments back into closed loops;
/// endpoints within this distance of each other are treated as the same
/// vertex. Matches the scale used elsewhere in this crate for vertex
/// welding.
const WELD_EPSILON: f64 = 1e-7;

/// Unions every polygon in `polys` together, left to right.
pub fn union_2d(polys: &[Polygon2D]) -> Polygon2D {
    let mut iter = polys.iter().filter(|p| !p.is_empty());
    let Some(first) = iter.next() else {
        return Polygon2D::empty();
    };
    let mut acc = first.clone();
    for next in iter {
        acc = boolean_op(&acc, next, Op::Union);
    }
    acc
}

/// Intersection of `a` and `b`.
pub fn intersect_2d(a: &Polygon2D, b: &Polygon2D) -> Polygon2D {
    if a.is_empty() || b.is_empty() {
        return Polygon2D::empty();
    }
    boolean_op(a, b, Op::Intersect)
}

/// Difference `a - b`.
pub fn difference_2d(a: &Polygon2D, b: &Polygon2D) -> Polygon2D {
    if a.is_empty() {
        return Polygon2D::empty();
    }
    if b.is_empty() {
        return a.clone();
    }
    boolean_op(a, b, Op::Difference)
}

#[derive(Clone, Copy, PartialEq)]
enum Op {
    Union,
    Intersect,
    Difference,
}

fn boolean_op(a: &Polygon2D, b: &Polygon2D, op: Op) -> Polygon2D {
    let split_a = split_against(a, b);
    let split_b = split_against(b, a);

    let (a_inside, b_inside) = match op {
        Op::Union => (false, false),
        Op::Intersect => (true, true),
        Op::Difference => (false, true),
    };

    let mut kept: Vec<(DVec2, DVec2)> = clip_segments(split_a, b, a_inside);
    let mut kept_b = clip_segments(split_b, a, b_inside);
    if op == Op::Difference {
        // B's retained (inside-A) boundary forms the cavity wall; reversing
        // it flips which side is "solid" when the loops are re-chained.
        for seg in &mut kept_b {
            std::mem::swap(&mut seg.0, &mut seg.1);
        }
    }
    kept.append(&mut kept_b);

    chain_segments(kept)
}

/// Every edge of `poly`, split at each point where it crosses an edge of
/// `other`.
fn split_against(poly: &Polygon2D, other: &Polygon2D) -> Vec<(DVec2, DVec2)> {
    let other_edges = all_edges(other);
    let mut result = Vec::new();
    for (start, end) in all_edges(poly) {
        let mut ts: Vec<f64> = vec![0.0, 1.0];
        for &(os, oe) in &other_edges {
            if let Some(t) = segment_intersection_param(start, end, os, oe) {
                ts.push(t);
            }
        }
        ts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        ts.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        for window in ts.windows(2) {
            let p0 = start.lerp(end, window[0]);
            let p1 = start.lerp(end, window[1]);
            if p0.distance(p1) > 1e-12 {
                result.push((p0, p1));
            }
        }
    }
    result
}

fn clip_segments(segments: Vec<(DVec2, DVec2)>, other: &Polygon2D, keep_inside: bool) -> Vec<(DVec2, DVec2)> {
    segments
        .into_iter()
        .filter(|(a, b)| point_in_polygon(a.lerp(*b, 0.5), other) == keep_inside)
        .collect()
}

fn all_edges(poly: &Polygon2D) -> Vec<(DVec2, DVec2)> {
    let mut edges = Vec::new();
    for outline in &poly.outlines {
        let n = outline.points.len();
        for i in 0..n {
            edges.push((outline.points[i], outline.points[(i + 1) % n]));
        }
    }
    edges
}

/// Even-odd point-in-polygon across every outline (outer boundaries and
/// holes alike contribute a crossing-parity toggle, so holes need no
/// special-casing).
pub fn point_in_polygon(p: DVec2, poly: &Polygon2D) -> bool {
    let mut inside = false;
    for outline in &poly.outlines {
        inside ^= point_in_ring(p, &outline.points);
    }
    inside
}

fn point_in_ring(p: DVec2, pts: &[DVec2]) -> bool {
    let n = pts.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Parametric intersection of segment `t ∈ [0,1]` along `(p0, p1)` with
/// `(q0, q1)`, or `None` for parallel/non-crossing segments.
fn segment_intersection_param(p0: DVec2, p1: DVec2, q0: DVec2, q1: DVec2) -> Option<f64> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let qp = q0 - p0;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Chains a bag of directed segments back into closed outlines by matching
/// each segment's end to the start of another, welding endpoints within
/// [`WELD_EPSILON`]. Leftover open chains (degenerate clips, coincident
/// edges) are dropped rather than emitted as malformed outlines.
pub(crate) fn chain_segments(segments: Vec<(DVec2, DVec2)>) -> Polygon2D {
    let scale = 1.0 / WELD_EPSILON;
    let key = |p: DVec2| -> (i64, i64) {
        ((p.x * scale).round() as i64, (p.y * scale).round() as i64)
    };

    let mut by_start: std::collections::HashMap<(i64, i64), Vec<usize>> = std::collections::HashMap::new();
    for (i, (a, _)) in segments.iter().enumerate() {
        by_start.entry(key(*a)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut outlines = Vec::new();

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        let mut points = vec![segments[start_idx].0];
        let mut current = start_idx;
        used[current] = true;
        loop {
            let end = segments[current].1;
            points.push(end);
            let end_key = key(end);
            let Some(next) = by_start
                .get(&end_key)
                .into_iter()
                .flatten()
                .copied()
                .find(|&i| !used[i])
            else {
                break;
            };
            if key(end) == key(points[0]) {
                break;
            }
            used[next] = true;
            current = next;
        }
        if points.len() > 1 && key(*points.last().unwrap()) == key(points[0]) {
            points.pop();
        }
        if points.len() >= 3 {
            outlines.push(points);
        }
    }

    let outlines = outlines
        .into_iter()
        .map(|points| {
            let outline = Outline2D {
                points,
                positive: false,
            };
            let positive = outline.signed_area() > 0.0;
            Outline2D { positive, ..outline }
        })
        .collect::<Vec<_>>();

    if outlines.is_empty() {
        Polygon2D::empty()
    } else {
        Polygon2D {
            outlines,
            sanitized: true,
            convexity: 1,
            color: None,
        }
    }
}
