//! # CSG Core
//!
//! The node-tree evaluation core of the OpenSCAD pipeline: takes a scene
//! graph built by a script evaluator, normalizes it into canonical form,
//! walks it with a caching geometry evaluator, and (optionally) rewrites a
//! boolean subtree into the sum-of-products normal form a BSP-style
//! boolean kernel consumes one term at a time.
//!
//! ## Architecture
//!
//! ```text
//! script evaluator → Node tree → normalize() → Evaluator<K> → Geometry
//!                                                   │    ↑
//!                                                   │    K: GeometryKernel
//!                                                   └──→ csg_products() → [CsgProduct] + CsgLeaf map
//! ```
//!
//! `Evaluator::csg_products` is the alternative exit from `evaluate()`: it
//! resolves the same normalized tree to the sum-of-products normal form
//! (`csg_tree`) instead of folding it through kernel booleans, for callers
//! (preview renderers, incremental re-evaluation) that want the algebra
//! without paying for a boolean on every edit.
//!
//! `csg-core` depends on no concrete boolean kernel; [`geometry::GeometryKernel`]
//! is the seam a crate like `manifold-kernel` implements.
//!
//! ## Example
//!
//! ```rust
//! use csg_core::cache::CacheContext;
//! use csg_core::evaluator::{EvalConfig, Evaluator};
//! use csg_core::fingerprint::FingerprintTable;
//! use csg_core::geometry::{Geometry, GeometryKernel, Polygon2D, PolySet3D};
//! use csg_core::node::{Node, NodeKind, Primitive3DKind};
//!
//! # struct NoopKernel;
//! # impl GeometryKernel for NoopKernel {
//! #     type Repr3D = PolySet3D;
//! #     fn nef_from_polyset(&self, ps: &PolySet3D) -> csg_core::error::CoreResult<Option<PolySet3D>> { Ok(Some(ps.clone())) }
//! #     fn polyset_from_nef(&self, nef: &PolySet3D) -> csg_core::error::CoreResult<PolySet3D> { Ok(nef.clone()) }
//! #     fn union_many(&self, nefs: &[PolySet3D]) -> csg_core::error::CoreResult<PolySet3D> { Ok(nefs.first().cloned().unwrap_or_else(PolySet3D::empty)) }
//! #     fn intersect(&self, a: &PolySet3D, _b: &PolySet3D) -> csg_core::error::CoreResult<PolySet3D> { Ok(a.clone()) }
//! #     fn difference(&self, a: &PolySet3D, _b: &PolySet3D) -> csg_core::error::CoreResult<PolySet3D> { Ok(a.clone()) }
//! #     fn minkowski(&self, a: &PolySet3D, _b: &PolySet3D) -> csg_core::error::CoreResult<PolySet3D> { Ok(a.clone()) }
//! #     fn hull(&self, geoms: &[Geometry]) -> csg_core::error::CoreResult<Geometry> { Ok(geoms.first().cloned().unwrap_or(Geometry::Empty)) }
//! #     fn project(&self, _nef: &PolySet3D, _cut: bool) -> csg_core::error::CoreResult<Polygon2D> { Ok(Polygon2D::empty()) }
//! #     fn union_2d(&self, polys: &[Polygon2D]) -> csg_core::error::CoreResult<Polygon2D> { Ok(polys.first().cloned().unwrap_or_else(Polygon2D::empty)) }
//! #     fn intersect_2d(&self, a: &Polygon2D, _b: &Polygon2D) -> csg_core::error::CoreResult<Polygon2D> { Ok(a.clone()) }
//! #     fn difference_2d(&self, a: &Polygon2D, _b: &Polygon2D) -> csg_core::error::CoreResult<Polygon2D> { Ok(a.clone()) }
//! # }
//!
//! let root = Node::new(
//!     1,
//!     NodeKind::Primitive3D(Primitive3DKind::Cube { size: glam::DVec3::splat(10.0), center: false }),
//!     vec![],
//! );
//! let fingerprints = FingerprintTable::build(&root);
//! let kernel = NoopKernel;
//! let caches = CacheContext::<NoopKernel>::default();
//! let evaluator = Evaluator::new(&kernel, &caches, &fingerprints, EvalConfig::default());
//! let result = evaluator.evaluate(&root);
//! assert!(matches!(result, Geometry::PolySet3D(_)));
//! ```

pub mod cache;
pub mod csg_tree;
pub mod error;
pub mod evaluator;
pub mod fingerprint;
pub mod geometry;
pub mod node;
pub mod normalize;
pub mod primitives;
pub mod traversal;

pub use cache::CacheContext;
pub use csg_tree::{CsgLeaf, CsgProduct};
pub use error::{CoreError, CoreResult, Warning};
pub use evaluator::{EvalConfig, Evaluator};
pub use fingerprint::{fingerprint, FingerprintTable};
pub use geometry::{Geometry, GeometryKernel, PolySet3D, Polygon2D};
pub use node::{Node, NodeKind};
pub use normalize::normalize;
pub use traversal::{CancellationToken, Control, TraversalState, Visitor};
