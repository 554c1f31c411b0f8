//! # Geometry Evaluator (C6)
//!
//! Walks a normalized node tree via the [`crate::traversal`] framework,
//! checking the geometry cache on the way down and combining children's
//! geometry into each node's own on the way back up. The actual per-kind
//! math lives in this module's children (`primitives`, `csg_ops`,
//! `transform`, `extrude`, `projection`, `adv_ops`); `Evaluator` itself is
//! just the dispatch and caching glue.

mod adv_ops;
mod csg_ops;
mod extrude;
mod projection;
mod transform;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::cache::CacheContext;
use crate::csg_tree::{self, CsgLeaf, CsgProduct};
use crate::error::{CoreError, Warning};
use crate::fingerprint::FingerprintTable;
use crate::geometry::{Geometry, GeometryKernel, Polygon2D};
use crate::node::{AdvOp, BooleanOp, Node, NodeKind};
use crate::traversal::{self, CancellationToken, Control, TraversalState, Visitor};

pub use csg_ops::Operand;

/// Tunables read once per evaluation.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Dispatch sibling subtrees to rayon's pool during traversal.
    pub parallel: bool,
    /// Upper bound on CSG product terms (consulted by [`crate::csg_tree`],
    /// carried here so one `EvalConfig` configures the whole pipeline).
    pub max_csg_terms: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_csg_terms: 100_000,
        }
    }
}

impl EvalConfig {
    /// Builds a config from the environment: `OPENSCAD_NO_PARALLEL` (any
    /// value, including empty) disables parallel traversal, mirroring the
    /// disable-by-presence convention of the OpenSCAD CLI's own env knobs.
    pub fn from_env() -> Self {
        Self {
            parallel: std::env::var_os("OPENSCAD_NO_PARALLEL").is_none(),
            ..Self::default()
        }
    }
}

/// Walks a normalized tree once, combining geometry bottom-up against a
/// kernel `K` and a [`CacheContext<K>`] shared across however many
/// `Evaluator`s the caller needs (tests, batch renders).
pub struct Evaluator<'a, K: GeometryKernel> {
    kernel: &'a K,
    caches: &'a CacheContext<K>,
    fingerprints: &'a FingerprintTable,
    config: EvalConfig,
    results: Mutex<HashMap<u32, Geometry>>,
    warnings: Mutex<Vec<Warning>>,
}

impl<'a, K: GeometryKernel> Evaluator<'a, K> {
    /// Builds an evaluator. `fingerprints` must cover every node in the
    /// tree `evaluate` will be called with (build it from the same,
    /// already-normalized root).
    pub fn new(
        kernel: &'a K,
        caches: &'a CacheContext<K>,
        fingerprints: &'a FingerprintTable,
        config: EvalConfig,
    ) -> Self {
        Self {
            kernel,
            caches,
            fingerprints,
            config,
            results: Mutex::new(HashMap::new()),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Evaluates `root`, returning its combined geometry. Warnings raised
    /// along the way are available afterward via [`Self::take_warnings`].
    pub fn evaluate(&self, root: &Node) -> Geometry {
        let cancel = CancellationToken::new();
        self.evaluate_cancellable(root, &cancel)
    }

    /// As [`Self::evaluate`], but cooperatively aborts when `cancel` fires,
    /// returning [`Geometry::Empty`].
    pub fn evaluate_cancellable(&self, root: &Node, cancel: &CancellationToken) -> Geometry {
        let state = TraversalState::default();
        let control = if self.config.parallel {
            traversal::traverse_parallel(self, root, &state, cancel)
        } else {
            traversal::traverse(self, root, &state, cancel)
        };
        if control == Control::Abort {
            return Geometry::Empty;
        }
        self.results
            .lock()
            .expect("results mutex poisoned")
            .remove(&root.index)
            .unwrap_or(Geometry::Empty)
    }

    /// Drains and returns every warning raised so far.
    pub fn take_warnings(&self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings.lock().expect("warnings mutex poisoned"))
    }

    /// Resolves `root` (already normalized) to its sum-of-products normal
    /// form (C7): one `CsgLeaf` per geometry-producing node, and the
    /// `CsgProduct` terms a preview renderer or the boolean pipeline would
    /// evaluate independently. Unlike [`Self::evaluate`], this does not run
    /// any kernel booleans itself — it only resolves the tree's algebra and
    /// each leaf's own positioned geometry.
    pub fn csg_products(&self, root: &Node) -> (Vec<CsgProduct>, HashMap<u32, CsgLeaf>) {
        let (leaves, bboxes) = csg_tree::build_leaves(root);
        let mut warnings = Vec::new();
        let mut products = csg_tree::build_products(root, &bboxes, self.config.max_csg_terms, &mut warnings);
        csg_tree::promote_highlights(&mut products, &leaves);
        self.warnings
            .lock()
            .expect("warnings mutex poisoned")
            .extend(warnings);
        (products, leaves)
    }

    fn take_operands(&self, node: &Node) -> Vec<Operand> {
        let mut results = self.results.lock().expect("results mutex poisoned");
        node.children
            .iter()
            .map(|c| Operand {
                geometry: results.remove(&c.index).unwrap_or(Geometry::Empty),
                background: c.modinst.background,
            })
            .collect()
    }

    fn take_children_geometry(&self, node: &Node) -> Vec<Geometry> {
        let mut results = self.results.lock().expect("results mutex poisoned");
        node.children
            .iter()
            .map(|c| results.remove(&c.index).unwrap_or(Geometry::Empty))
            .collect()
    }

    fn union_children(&self, node: &Node, warnings: &mut Vec<Warning>) -> Geometry {
        let operands = self.take_operands(node);
        if operands.is_empty() {
            return Geometry::Empty;
        }
        csg_ops::union(self.kernel, node.index, operands, warnings).unwrap_or(Geometry::Empty)
    }

    fn union_2d_children(&self, node: &Node, warnings: &mut Vec<Warning>) -> Polygon2D {
        match self.union_children(node, warnings) {
            Geometry::Polygon2D(p) => p,
            _ => Polygon2D::empty(),
        }
    }

    /// Dispatches on `node.kind`, combining already-computed children's
    /// geometry (looked up in `self.results`) into this node's own.
    fn combine(&self, node: &Node) -> Geometry {
        let mut warnings = Vec::new();
        let geometry = match &node.kind {
            NodeKind::Primitive3D(kind) => crate::primitives::build_3d(kind),
            NodeKind::Primitive2D(kind) => crate::primitives::build_2d(kind),

            NodeKind::CsgOp(BooleanOp::Union) => {
                let operands = self.take_operands(node);
                csg_ops::union(self.kernel, node.index, operands, &mut warnings)
                    .unwrap_or(Geometry::Empty)
            }
            NodeKind::CsgOp(op) => {
                let children = self.take_children_geometry(node);
                csg_ops::intersect_or_difference(self.kernel, node.index, *op, children, &mut warnings)
                    .unwrap_or(Geometry::Empty)
            }

            NodeKind::AdvCsgOp(AdvOp::Minkowski) => {
                let children = self.take_children_geometry(node);
                adv_ops::minkowski(self.kernel, node.index, children, &mut warnings)
                    .unwrap_or(Geometry::Empty)
            }
            NodeKind::AdvCsgOp(AdvOp::Hull) => {
                let children = self.take_children_geometry(node);
                adv_ops::hull(self.kernel, children).unwrap_or(Geometry::Empty)
            }
            NodeKind::AdvCsgOp(AdvOp::Resize { new_size, autosize }) => {
                let unioned = self.union_children(node, &mut warnings);
                adv_ops::resize(node.index, unioned, *new_size, *autosize, &mut warnings)
            }

            NodeKind::Transform(m) => {
                let unioned = self.union_children(node, &mut warnings);
                transform::apply_transform(node.index, *m, unioned, &mut warnings)
            }
            NodeKind::Color(rgba) => {
                let unioned = self.union_children(node, &mut warnings);
                color_geometry(unioned, *rgba)
            }

            NodeKind::LinearExtrude {
                height,
                twist,
                scale,
                slices,
                center,
            } => {
                let profile = self.union_2d_children(node, &mut warnings);
                Geometry::PolySet3D(extrude::linear_extrude(
                    node.index, profile, *height, *twist, *scale, *slices, *center, &mut warnings,
                ))
            }
            NodeKind::RotateExtrude { angle, segments } => {
                let profile = self.union_2d_children(node, &mut warnings);
                Geometry::PolySet3D(extrude::rotate_extrude(
                    node.index, profile, *angle, *segments, &mut warnings,
                ))
            }
            NodeKind::Projection { cut } => {
                let solid = self.union_children(node, &mut warnings);
                projection::project(self.kernel, solid, *cut)
                    .map(Geometry::Polygon2D)
                    .unwrap_or(Geometry::Empty)
            }

            NodeKind::Render | NodeKind::Root | NodeKind::Group | NodeKind::List => {
                self.union_children(node, &mut warnings)
            }
        };
        self.warnings
            .lock()
            .expect("warnings mutex poisoned")
            .extend(warnings);
        geometry
    }
}

fn color_geometry(geometry: Geometry, rgba: [f32; 4]) -> Geometry {
    match geometry {
        Geometry::Empty => Geometry::Empty,
        Geometry::Polygon2D(mut p) => {
            p.color = Some(rgba);
            Geometry::Polygon2D(p)
        }
        Geometry::PolySet3D(mut p) => {
            p.color = Some(rgba);
            Geometry::PolySet3D(p)
        }
    }
}

impl<'a, K: GeometryKernel> Visitor for Evaluator<'a, K> {
    fn prefix(&self, mut state: TraversalState, node: &Node) -> (Control, TraversalState) {
        state.prefer_kernel = state.prefer_kernel || matches!(node.kind, NodeKind::Render);

        let Some(fingerprint) = self.fingerprints.get(node.index) else {
            return (Control::Continue, state);
        };
        let mut cache = self.caches.geometry.lock().expect("geometry cache poisoned");
        if let Some(geometry) = cache.get(fingerprint) {
            drop(cache);
            self.results
                .lock()
                .expect("results mutex poisoned")
                .insert(node.index, geometry);
            return (Control::Prune, state);
        }
        (Control::Continue, state)
    }

    fn postfix(&self, _state: &TraversalState, node: &Node) -> Control {
        let geometry = self.combine(node);

        if let Some(fingerprint) = self.fingerprints.get(node.index) {
            if !geometry.is_empty() {
                let size = geometry.byte_size();
                let mut cache = self.caches.geometry.lock().expect("geometry cache poisoned");
                let budget = cache.max_bytes();
                if !cache.insert(fingerprint.to_string(), geometry.clone(), size) {
                    drop(cache);
                    self.warnings
                        .lock()
                        .expect("warnings mutex poisoned")
                        .push(Warning::new(node.index, CoreError::CacheOverflow { size, budget }));
                }
            }
        }

        self.results
            .lock()
            .expect("results mutex poisoned")
            .insert(node.index, geometry);
        Control::Continue
    }

    fn is_thread_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PolySet3D;
    use crate::node::{ModInst, Primitive3DKind};

    struct StubKernel;

    impl GeometryKernel for StubKernel {
        type Repr3D = PolySet3D;
        fn nef_from_polyset(&self, ps: &PolySet3D) -> crate::error::CoreResult<Option<Self::Repr3D>> {
            Ok(Some(ps.clone()))
        }
        fn polyset_from_nef(&self, nef: &Self::Repr3D) -> crate::error::CoreResult<PolySet3D> {
            Ok(nef.clone())
        }
        fn union_many(&self, nefs: &[Self::Repr3D]) -> crate::error::CoreResult<Self::Repr3D> {
            let mut faces = Vec::new();
            for n in nefs {
                faces.extend(n.faces.clone());
            }
            Ok(PolySet3D {
                faces,
                color: None,
                convexity: 1,
                is_2d_slab: false,
            })
        }
        fn intersect(&self, a: &Self::Repr3D, _b: &Self::Repr3D) -> crate::error::CoreResult<Self::Repr3D> {
            Ok(a.clone())
        }
        fn difference(&self, a: &Self::Repr3D, _b: &Self::Repr3D) -> crate::error::CoreResult<Self::Repr3D> {
            Ok(a.clone())
        }
        fn minkowski(&self, a: &Self::Repr3D, _b: &Self::Repr3D) -> crate::error::CoreResult<Self::Repr3D> {
            Ok(a.clone())
        }
        fn hull(&self, geoms: &[Geometry]) -> crate::error::CoreResult<Geometry> {
            Ok(geoms.first().cloned().unwrap_or(Geometry::Empty))
        }
        fn project(&self, _nef: &Self::Repr3D, _cut: bool) -> crate::error::CoreResult<Polygon2D> {
            Ok(Polygon2D::empty())
        }
        fn union_2d(&self, polys: &[Polygon2D]) -> crate::error::CoreResult<Polygon2D> {
            let mut outlines = Vec::new();
            for p in polys {
                outlines.extend(p.outlines.clone());
            }
            Ok(Polygon2D {
                outlines,
                sanitized: true,
                convexity: 1,
                color: None,
            })
        }
        fn intersect_2d(&self, a: &Polygon2D, _b: &Polygon2D) -> crate::error::CoreResult<Polygon2D> {
            Ok(a.clone())
        }
        fn difference_2d(&self, a: &Polygon2D, _b: &Polygon2D) -> crate::error::CoreResult<Polygon2D> {
            Ok(a.clone())
        }
    }

    fn cube(index: u32, size: f64) -> Node {
        Node::new(
            index,
            NodeKind::Primitive3D(Primitive3DKind::Cube {
                size: glam::DVec3::splat(size),
                center: false,
            }),
            vec![],
        )
    }

    #[test]
    fn test_single_cube_evaluates_to_six_faces() {
        let root = cube(1, 2.0);
        let fingerprints = FingerprintTable::build(&root);
        let caches = CacheContext::<StubKernel>::new(1024 * 1024, 1024 * 1024);
        let evaluator = Evaluator::new(&StubKernel, &caches, &fingerprints, EvalConfig::default());
        let result = evaluator.evaluate(&root);
        let Geometry::PolySet3D(ps) = result else {
            panic!("expected polyset")
        };
        assert_eq!(ps.faces.len(), 6);
    }

    #[test]
    fn test_union_excludes_background_child() {
        let root = Node::new(
            1,
            NodeKind::CsgOp(BooleanOp::Union),
            vec![
                cube(2, 2.0),
                Node::tagged(
                    3,
                    NodeKind::Primitive3D(Primitive3DKind::Cube {
                        size: glam::DVec3::splat(1.0),
                        center: false,
                    }),
                    vec![],
                    ModInst {
                        background: true,
                        highlight: false,
                        root_mark: false,
                    },
                ),
            ],
        );
        let fingerprints = FingerprintTable::build(&root);
        let caches = CacheContext::<StubKernel>::new(1024 * 1024, 1024 * 1024);
        let evaluator = Evaluator::new(&StubKernel, &caches, &fingerprints, EvalConfig::default());
        let result = evaluator.evaluate(&root);
        let Geometry::PolySet3D(ps) = result else {
            panic!("expected polyset")
        };
        assert_eq!(ps.faces.len(), 6);
    }

    #[test]
    fn test_repeated_evaluation_hits_geometry_cache() {
        let root = cube(1, 3.0);
        let fingerprints = FingerprintTable::build(&root);
        let caches = CacheContext::<StubKernel>::new(1024 * 1024, 1024 * 1024);
        let evaluator = Evaluator::new(&StubKernel, &caches, &fingerprints, EvalConfig::default());
        let _ = evaluator.evaluate(&root);
        assert_eq!(caches.geometry.lock().unwrap().len(), 1);
        let _ = evaluator.evaluate(&root);
        // Second pass is served entirely from cache; no new entries appear.
        assert_eq!(caches.geometry.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_eval_config_from_env_defaults_to_parallel() {
        // SAFETY: test-only; no other thread in this process reads or
        // writes this variable concurrently.
        unsafe {
            std::env::remove_var("OPENSCAD_NO_PARALLEL");
        }
        assert!(EvalConfig::from_env().parallel);
    }

    #[test]
    fn test_color_tag_applied_to_result() {
        let root = Node::new(1, NodeKind::Color([1.0, 0.0, 0.0, 1.0]), vec![cube(2, 1.0)]);
        let fingerprints = FingerprintTable::build(&root);
        let caches = CacheContext::<StubKernel>::new(1024 * 1024, 1024 * 1024);
        let evaluator = Evaluator::new(&StubKernel, &caches, &fingerprints, EvalConfig::default());
        let result = evaluator.evaluate(&root);
        let Geometry::PolySet3D(ps) = result else {
            panic!("expected polyset")
        };
        assert_eq!(ps.color, Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_extrude_square_profile_produces_solid() {
        let square = Node::new(
            2,
            NodeKind::Primitive2D(crate::node::Primitive2DKind::Square {
                size: glam::DVec2::ONE,
                center: false,
            }),
            vec![],
        );
        let root = Node::new(
            1,
            NodeKind::LinearExtrude {
                height: 5.0,
                twist: 0.0,
                scale: glam::DVec2::ONE,
                slices: 1,
                center: false,
            },
            vec![square],
        );
        let fingerprints = FingerprintTable::build(&root);
        let caches = CacheContext::<StubKernel>::new(1024 * 1024, 1024 * 1024);
        let evaluator = Evaluator::new(&StubKernel, &caches, &fingerprints, EvalConfig::default());
        let result = evaluator.evaluate(&root);
        assert!(result.is_3d());
        assert!(!result.is_empty());
    }

}
