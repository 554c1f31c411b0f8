//! # Cross-Section Module
//!
//! 2D polygon algorithms that sit alongside the 3D [`crate::manifold`]
//! module: a hand-rolled even-odd boolean clipper (no ready-made 2D
//! clipping crate is in this kernel's dependency stack) and the
//! `cut`/silhouette projection of a 3D mesh down to a 2D outline.
//!
//! ## Structure
//!
//! - `boolean2d`: union/intersection/difference on [`csg_core::geometry::Polygon2D`]
//! - `project`: 3D → 2D projection (`cut` plane-slice and full silhouette)

pub mod boolean2d;
pub mod hull2d;
pub mod project;
