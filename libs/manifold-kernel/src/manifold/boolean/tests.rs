//! # Boolean Operations Tests
//!
//! Integration tests for `union_all`/`difference_all`/`intersection_all`
//! against the synthetic meshes `manifold::constructors` builds, exercising
//! the same code path `ManifoldKernel::union_many`/`intersect`/`difference`
//! call into.

use super::*;
use crate::manifold::constructors::{build_cube, build_sphere};
use crate::mesh::Mesh;

// =============================================================================
// UNION TESTS
// =============================================================================

/// Test union of two overlapping cubes.
///
/// ```text
///   +---+
///   |   +---+
///   +---|   |
///       +---+
/// ```
#[test]
fn test_union_cubes() {
    let mut mesh1 = Mesh::new();
    build_cube(&mut mesh1, [10.0, 10.0, 10.0], true);
    
    let mut mesh2 = Mesh::new();
    build_cube(&mut mesh2, [10.0, 10.0, 10.0], true);
    mesh2.translate(5.0, 0.0, 0.0);
    
    let result = union_all(&[mesh1, mesh2]).unwrap();
    
    assert!(!result.is_empty(), "Union should produce non-empty mesh");
    assert!(result.triangle_count() >= 12, "Union should have at least cube faces");
}

/// Test union of non-overlapping cubes.
#[test]
fn test_union_disjoint_cubes() {
    let mut mesh1 = Mesh::new();
    build_cube(&mut mesh1, [5.0, 5.0, 5.0], true);
    mesh1.translate(-10.0, 0.0, 0.0);
    
    let mut mesh2 = Mesh::new();
    build_cube(&mut mesh2, [5.0, 5.0, 5.0], true);
    mesh2.translate(10.0, 0.0, 0.0);
    
    let result = union_all(&[mesh1, mesh2]).unwrap();
    
    assert!(!result.is_empty());
    // Disjoint cubes should have 24 triangles (12 each)
    assert!(result.triangle_count() >= 24);
}

// =============================================================================
// DIFFERENCE TESTS
// =============================================================================

/// Test difference of two cubes (carving).
///
/// ```text
///   +-------+
///   |  +-+  |  →  +-------+
///   |  +-+  |     |  [ ]  |
///   +-------+     +-------+
/// ```
#[test]
fn test_difference_cubes() {
    let mut mesh1 = Mesh::new();
    build_cube(&mut mesh1, [10.0, 10.0, 10.0], true);
    
    let mut mesh2 = Mesh::new();
    build_cube(&mut mesh2, [5.0, 5.0, 5.0], true);
    
    let result = difference_all(&[mesh1, mesh2]).unwrap();
    
    assert!(!result.is_empty(), "Difference should produce non-empty mesh");
    assert!(result.triangle_count() > 12, "Carved cube should have more faces");
}

/// Test difference where subtracted mesh is outside (no effect).
#[test]
fn test_difference_no_overlap() {
    let mut mesh1 = Mesh::new();
    build_cube(&mut mesh1, [5.0, 5.0, 5.0], true);
    
    let mut mesh2 = Mesh::new();
    build_cube(&mut mesh2, [5.0, 5.0, 5.0], true);
    mesh2.translate(100.0, 0.0, 0.0); // Far away
    
    let result = difference_all(&[mesh1, mesh2]).unwrap();
    
    assert!(!result.is_empty());
    // Should be approximately original cube
    assert!(result.triangle_count() >= 12);
}

// =============================================================================
// INTERSECTION TESTS
// =============================================================================

/// Test intersection of two overlapping cubes.
///
/// ```text
///   +---+           
///   |   +---+  →  +-+
///   +---|   |     +-+
///       +---+
/// ```
#[test]
fn test_intersection_cubes() {
    let mut mesh1 = Mesh::new();
    build_cube(&mut mesh1, [10.0, 10.0, 10.0], true);
    
    let mut mesh2 = Mesh::new();
    build_cube(&mut mesh2, [10.0, 10.0, 10.0], true);
    mesh2.translate(5.0, 0.0, 0.0);
    
    let result = intersection_all(&[mesh1, mesh2]).unwrap();
    
    assert!(!result.is_empty(), "Intersection should produce non-empty mesh");
}

/// Test intersection of non-overlapping cubes (empty result).
#[test]
fn test_intersection_no_overlap() {
    let mut mesh1 = Mesh::new();
    build_cube(&mut mesh1, [5.0, 5.0, 5.0], true);
    mesh1.translate(-10.0, 0.0, 0.0);
    
    let mut mesh2 = Mesh::new();
    build_cube(&mut mesh2, [5.0, 5.0, 5.0], true);
    mesh2.translate(10.0, 0.0, 0.0);
    
    let result = intersection_all(&[mesh1, mesh2]).unwrap();
    
    // Disjoint meshes should have empty intersection
    assert!(result.is_empty() || result.triangle_count() == 0);
}

// =============================================================================
// CUBE + SPHERE TESTS
// =============================================================================

/// Test intersection of cube and sphere.
///
/// Creates a "spherical cube" - sphere with flat faces.
#[test]
fn test_intersection_cube_sphere() {
    let mut cube_mesh = Mesh::new();
    build_cube(&mut cube_mesh, [15.0, 15.0, 15.0], true);
    
    let mut sphere_mesh = Mesh::new();
    build_sphere(&mut sphere_mesh, 10.0, 16);
    
    let result = intersection_all(&[cube_mesh, sphere_mesh]).unwrap();
    
    assert!(!result.is_empty(), "Intersection should produce non-empty mesh");
    assert!(result.triangle_count() > 12, "Expected detailed intersection");
}

/// Test intersection where sphere is entirely inside cube.
#[test]
fn test_intersection_cube_contains_sphere() {
    let mut cube_mesh = Mesh::new();
    build_cube(&mut cube_mesh, [20.0, 20.0, 20.0], true);
    
    let mut sphere_mesh = Mesh::new();
    build_sphere(&mut sphere_mesh, 5.0, 16);
    
    let result = intersection_all(&[cube_mesh, sphere_mesh]).unwrap();
    
    assert!(!result.is_empty());
    assert!(result.triangle_count() > 50, "Expected full sphere triangles");
}

/// Test difference of cube minus sphere (carving a spherical hole).
#[test]
fn test_difference_cube_sphere() {
    let mut cube_mesh = Mesh::new();
    build_cube(&mut cube_mesh, [15.0, 15.0, 15.0], true);
    
    let mut sphere_mesh = Mesh::new();
    build_sphere(&mut sphere_mesh, 10.0, 16);
    
    let result = difference_all(&[cube_mesh, sphere_mesh]).unwrap();
    
    assert!(!result.is_empty(), "Difference should produce non-empty mesh");
    assert!(result.triangle_count() > 12, "Expected detailed difference");
    
    // Verify cube corners remain (distance > sphere radius)
    let has_far_vertices = result.vertices.chunks(6).any(|v| {
        let dist = (v[0]*v[0] + v[1]*v[1] + v[2]*v[2]).sqrt();
        dist > 10.1
    });
    assert!(has_far_vertices, "Should keep cube corners");
}

// =============================================================================
// EDGE CASES
// =============================================================================

/// Test empty input.
#[test]
fn test_empty_input() {
    let result = union_all(&[]).unwrap();
    assert!(result.is_empty());
    
    let result = difference_all(&[]).unwrap();
    assert!(result.is_empty());
    
    let result = intersection_all(&[]).unwrap();
    assert!(result.is_empty());
}

/// Test single mesh input (identity operation).
#[test]
fn test_single_mesh() {
    let mut mesh = Mesh::new();
    build_cube(&mut mesh, [10.0, 10.0, 10.0], true);
    let original_count = mesh.triangle_count();
    
    let result = union_all(&[mesh.clone()]).unwrap();
    assert_eq!(result.triangle_count(), original_count);
    
    let result = difference_all(&[mesh.clone()]).unwrap();
    assert_eq!(result.triangle_count(), original_count);
    
    let result = intersection_all(&[mesh]).unwrap();
    assert_eq!(result.triangle_count(), original_count);
}

// =============================================================================
// REGRESSION TESTS
// =============================================================================

/// Union of a cube and a sphere discretized through the evaluator's own
/// `SegmentParams`, the same fragment-count rule `evaluator::csg_ops` uses
/// for every sphere primitive.
///
/// BSP splits triangles along arbitrary planes rather than along exact
/// intersection curves, so the output carries more triangles than the input
/// fragment count alone would suggest; the bounds below are a sanity check
/// on that overhead, not an exactness claim.
#[test]
fn test_union_cube_sphere_with_evaluator_segment_params() {
    use csg_core::node::SegmentParams;

    let mut cube_mesh = Mesh::new();
    build_cube(&mut cube_mesh, [15.0, 15.0, 15.0], true);

    let params = SegmentParams::default();
    let segments = params.fragments(10.0);

    let mut sphere_mesh = Mesh::new();
    build_sphere(&mut sphere_mesh, 10.0, segments);

    let result = union_all(&[cube_mesh, sphere_mesh]).unwrap();

    let vertex_count = result.vertices.len() / 6;
    let triangle_count = result.triangle_count();

    assert!(!result.is_empty(), "Union should produce non-empty mesh");

    // BSP splitting overhead bound: well above the ~500-1000 triangles a
    // curve-exact boolean would produce for this input, but still finite.
    assert!(
        vertex_count < 800,
        "vertex count {vertex_count} exceeds the expected BSP-overhead bound (800)"
    );

    assert!(
        triangle_count < 1600,
        "triangle count {triangle_count} exceeds the expected BSP-overhead bound (1600)"
    );

    // Verify geometry correctness
    
    // Sphere bulge: vertices beyond cube face (7.5) up to sphere radius (10)
    let has_bulge = result.vertices.chunks(6).any(|v| {
        v[0].abs() > 7.6 || v[1].abs() > 7.6 || v[2].abs() > 7.6
    });
    assert!(has_bulge, "Should have sphere bulge vertices");
    
    // Cube corners: vertices at ~13 distance (beyond sphere radius)
    let has_corners = result.vertices.chunks(6).any(|v| {
        let dist = (v[0]*v[0] + v[1]*v[1] + v[2]*v[2]).sqrt();
        dist > 12.0
    });
    assert!(has_corners, "Should have cube corner vertices");
}

/// Test that multiple sequential operations work correctly.
#[test]
fn test_sequential_operations() {
    let mut cube1 = Mesh::new();
    build_cube(&mut cube1, [10.0, 10.0, 10.0], true);
    
    let mut cube2 = Mesh::new();
    build_cube(&mut cube2, [10.0, 10.0, 10.0], true);
    cube2.translate(5.0, 0.0, 0.0);
    
    let mut cube3 = Mesh::new();
    build_cube(&mut cube3, [5.0, 5.0, 5.0], true);
    
    // Union then difference: (cube1 ∪ cube2) - cube3
    let union_result = union_all(&[cube1.clone(), cube2.clone()]).unwrap();
    let final_result = difference_all(&[union_result, cube3]).unwrap();
    
    assert!(!final_result.is_empty());
    assert!(final_result.triangle_count() > 12);
}

/// Test three-way operations.
#[test]
fn test_three_way_union() {
    let mut cube1 = Mesh::new();
    build_cube(&mut cube1, [5.0, 5.0, 5.0], true);
    cube1.translate(-5.0, 0.0, 0.0);
    
    let mut cube2 = Mesh::new();
    build_cube(&mut cube2, [5.0, 5.0, 5.0], true);
    
    let mut cube3 = Mesh::new();
    build_cube(&mut cube3, [5.0, 5.0, 5.0], true);
    cube3.translate(5.0, 0.0, 0.0);
    
    let result = union_all(&[cube1, cube2, cube3]).unwrap();
    
    assert!(!result.is_empty());
    assert!(result.triangle_count() >= 12);
}
