//! # Minkowski Sum
//!
//! `kernel_impl::ManifoldKernel::minkowski` converts every `PolySet3D`
//! operand to a `Mesh` and folds them left-to-right through
//! `compute_minkowski`, matching the evaluator's n-ary `minkowski()` node.
//!
//! ## Algorithm
//!
//! For convex shapes A and B: `A ⊕ B = { a + b : a ∈ A, b ∈ B }`, computed
//! as the convex hull of the pairwise vertex sums.
//!
//! There is no convexity check and no decomposition step: every input,
//! convex or not, goes through the same vertex-sum-then-hull pipeline. For
//! convex operands this is exact. For non-convex operands it is an
//! over-approximation — the result is the hull of the sum, which contains
//! but does not equal the true (possibly non-convex) Minkowski sum.

use crate::error::ManifoldResult;
use crate::mesh::Mesh;
use super::hull::compute_hull;

// =============================================================================
// PUBLIC API
// =============================================================================

/// Compute Minkowski sum of multiple meshes.
///
/// Takes all vertices and computes pairwise sums, then convex hull.
///
/// ## Parameters
///
/// - `meshes`: Slice of meshes (at least 2 for meaningful result)
///
/// ## Returns
///
/// Minkowski sum mesh
///
/// ## Example
///
/// ```ignore
/// use manifold_kernel::mesh::Mesh;
/// use manifold_kernel::manifold::minkowski::compute_minkowski;
///
/// let mut cube1 = Mesh::new();
/// build_cube(&mut cube1, [10.0, 10.0, 10.0], true);
///
/// let mut cube2 = Mesh::new();
/// build_cube(&mut cube2, [2.0, 2.0, 2.0], true);
///
/// let result = compute_minkowski(&[cube1, cube2]).unwrap();
/// // Minkowski of two centered cubes produces a larger centered cube
/// assert!(!result.is_empty());
/// ```
pub fn compute_minkowski(meshes: &[Mesh]) -> ManifoldResult<Mesh> {
    if meshes.is_empty() {
        return Ok(Mesh::new());
    }
    
    if meshes.len() == 1 {
        return Ok(meshes[0].clone());
    }
    
    // Start with first mesh vertices
    let mut current_points: Vec<[f32; 3]> = Vec::new();
    for i in (0..meshes[0].vertices.len()).step_by(3) {
        current_points.push([
            meshes[0].vertices[i],
            meshes[0].vertices[i + 1],
            meshes[0].vertices[i + 2],
        ]);
    }
    
    // Add each subsequent mesh via pairwise sums
    for mesh in &meshes[1..] {
        let mut next_points: Vec<[f32; 3]> = Vec::new();
        
        // Collect vertices from current mesh
        let mut mesh_points: Vec<[f32; 3]> = Vec::new();
        for i in (0..mesh.vertices.len()).step_by(3) {
            mesh_points.push([
                mesh.vertices[i],
                mesh.vertices[i + 1],
                mesh.vertices[i + 2],
            ]);
        }
        
        // Compute pairwise sums
        for p1 in &current_points {
            for p2 in &mesh_points {
                next_points.push([
                    p1[0] + p2[0],
                    p1[1] + p2[1],
                    p1[2] + p2[2],
                ]);
            }
        }
        
        current_points = next_points;
    }
    
    // Convert points to mesh for hull computation
    let mut point_mesh = Mesh::new();
    for p in &current_points {
        point_mesh.add_vertex(p[0], p[1], p[2], 0.0, 0.0, 1.0);
    }
    
    // Take convex hull
    compute_hull(&[point_mesh])
}

// =============================================================================
// TESTS
// =============================================================================
