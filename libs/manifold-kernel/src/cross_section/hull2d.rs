//! # 2D Convex Hull
//!
//! Andrew's monotone-chain algorithm, used when [`crate::kernel_impl`]'s
//! `hull()` combinator sees only 2D operands: the 3D QuickHull in
//! [`crate::manifold::hull`] expects a non-degenerate point cloud and
//! mishandles a coplanar (z=0) one, so an all-2D hull gets its own
//! dimension-appropriate algorithm instead.

use csg_core::geometry::{Outline2D, Polygon2D};
use glam::DVec2;

/// Convex hull of `points` as a single-outline [`Polygon2D`]. Fewer than 3
/// distinct points yields an empty result (no area to enclose).
pub fn hull_2d(points: &[DVec2]) -> Polygon2D {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap().then(a.y.partial_cmp(&b.y).unwrap()));
    pts.dedup_by(|a, b| a.distance(*b) < 1e-12);
    if pts.len() < 3 {
        return Polygon2D::empty();
    }

    let cross = |o: DVec2, a: DVec2, b: DVec2| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);

    let mut lower: Vec<DVec2> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<DVec2> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        return Polygon2D::empty();
    }

    Polygon2D {
        outlines: vec![Outline2D { points: lower, positive: true }],
        sanitized: true,
        convexity: 1,
        color: None,
    }
}
