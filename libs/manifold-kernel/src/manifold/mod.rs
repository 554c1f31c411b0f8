//! # Manifold Module
//!
//! 3D solid boolean algorithms operating directly on [`crate::mesh::Mesh`]:
//! the kernel's internal representation has no separate "Nef polyhedron"
//! layer, so [`crate::ManifoldKernel::Repr3D`] is `Mesh` itself.
//!
//! ## Structure
//!
//! - `boolean`: Union, Difference, Intersection (BSP tree)
//! - `hull`: Convex hull computation (QuickHull)
//! - `minkowski`: Minkowski sum (pairwise vertex sum + hull)
//! - `constructors` (test-only): cube/sphere/cylinder/polyhedron fixtures
//!   used by the algorithms above's own test suites.
//!
//! ## Algorithm Reference
//!
//! Based on [Manifold-3D](https://github.com/elalish/manifold):
//! - Guaranteed manifold output (watertight meshes)
//! - Robust boolean operations with exact predicates

pub mod boolean;
pub mod hull;
pub mod minkowski;

#[cfg(test)]
pub(crate) mod constructors;
