//! # Manifold Kernel
//!
//! Pure-Rust implementation of [`csg_core::geometry::GeometryKernel`]:
//! robust CSG boolean operations, convex hulls, Minkowski sums, 2D polygon
//! clipping, ear-clipping triangulation, and mesh export, with no C
//! dependencies and no WASI requirements.
//!
//! ## Architecture
//!
//! ```text
//! csg-core (Node tree, Evaluator, GeometryKernel trait)
//!       ↓
//! kernel_impl::ManifoldKernel (impl GeometryKernel)
//!       ↓
//! manifold (BSP booleans, QuickHull, Minkowski) / cross_section (2D clipping, projection)
//!       ↓
//! mesh::Mesh (flat vertex/index buffers) → export (STL/OFF/WRL/SVG)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use csg_core::node::{Node, NodeKind, Primitive3DKind};
//! use csg_core::{CacheContext, EvalConfig, Evaluator, FingerprintTable, Geometry};
//! use manifold_kernel::ManifoldKernel;
//!
//! let root = Node::new(
//!     1,
//!     NodeKind::Primitive3D(Primitive3DKind::Cube { size: glam::DVec3::splat(10.0), center: false }),
//!     vec![],
//! );
//! let fingerprints = FingerprintTable::build(&root);
//! let kernel = ManifoldKernel::new();
//! let caches = CacheContext::<ManifoldKernel>::default();
//! let evaluator = Evaluator::new(&kernel, &caches, &fingerprints, EvalConfig::default());
//! let result = evaluator.evaluate(&root);
//! assert!(matches!(result, Geometry::PolySet3D(_)));
//! ```
//!
//! ## Portability
//!
//! No C dependencies, no filesystem access beyond what [`export`] writes on
//! the caller's behalf, and no WASI requirements: every algorithm here
//! compiles to `wasm32-unknown-unknown`.

/// Error types for mesh and polygon operations.
pub mod error;

/// Geometry export to STL, OFF, WRL, and SVG text formats.
pub mod export;

/// The [`csg_core::geometry::GeometryKernel`] implementation.
pub mod kernel_impl;

/// 3D solid boolean algorithms (BSP), convex hull (QuickHull), and
/// Minkowski sum, operating on [`mesh::Mesh`].
pub mod manifold;

/// Output mesh format: flat vertex/index/normal/color buffers.
pub mod mesh;

/// 2D polygon boolean clipping and 3D→2D projection.
pub mod cross_section;

pub use error::ManifoldError;
pub use kernel_impl::ManifoldKernel;
pub use mesh::Mesh;
