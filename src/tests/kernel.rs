use approx::assert_abs_diff_eq;
use num_traits::ToPrimitive;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{DIMENSIONS, EarcutKernel, Kernel, KernelError, KernelOutput, Vertex};

use super::util::{self, VTest};

fn earcut<V: Vertex>(rings: &[&[V]]) -> KernelOutput<V::Coordinate> {
    EarcutKernel::new().triangulate_rings(rings, DIMENSIONS).expect("Triangulation failed")
}

/// Signed area of each triangle, after checking every index is in range
fn triangle_areas<V: Vertex>(rings: &[&[V]], output: &KernelOutput<V::Coordinate>) -> Vec<f64> {
    let vertices: Vec<[f64; 2]> = rings.iter()
        .flat_map(|ring| ring.iter().map(|v| [v.x(), v.y()]))
        .chain(output.added_vertices.iter().copied())
        .map(|[x, y]| [x.to_f64().unwrap(), y.to_f64().unwrap()])
        .collect();
    let indices = &output.indices;
    assert_eq!(indices.len() % 3, 0, "Partial triangle in {:?}", indices);
    indices.chunks_exact(3)
        .map(|t| {
            let [a, b, c] = [vertices[t[0]], vertices[t[1]], vertices[t[2]]];
            ((b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])) / 2.
        })
        .collect()
}

fn total_area(areas: &[f64]) -> f64 {
    areas.iter().map(|a| a.abs()).sum()
}

#[test]
fn square_with_hole() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::square(1.0, 1.0, 2.0);
    let rings = [&outer[..], &hole[..]];

    let output = earcut(&rings);
    assert_eq!(output.indices.len(), 8 * 3);
    assert!(output.added_vertices.is_empty());
    let areas = triangle_areas(&rings, &output);
    assert_abs_diff_eq!(total_area(&areas), 12.0);
    assert!(areas.iter().all(|&a| a > 0.0), "Triangles wound inconsistently: {:?}", areas);
}

#[test]
fn every_vertex_is_used() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::square(1.0, 1.0, 2.0);

    let mut indices = earcut(&[&outer[..], &hole[..]]).indices;
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices, (0..8).collect::<Vec<_>>());
}

#[test]
fn clockwise_outer_gives_clockwise_triangles() {
    let outer = util::polygon::reversed(&util::polygon::square(0.0, 0.0, 4.0));
    let hole = util::polygon::square(1.0, 1.0, 2.0);
    let rings = [&outer[..], &hole[..]];

    let areas = triangle_areas(&rings, &earcut(&rings));
    assert_abs_diff_eq!(total_area(&areas), 12.0);
    assert!(areas.iter().all(|&a| a < 0.0), "Triangles wound inconsistently: {:?}", areas);
}

#[test]
fn hole_orientation_is_ignored() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::square(1.0, 1.0, 2.0);
    let reversed_hole = util::polygon::reversed(&hole);

    for hole in [&hole, &reversed_hole] {
        let rings = [&outer[..], &hole[..]];
        let areas = triangle_areas(&rings, &earcut(&rings));
        assert_abs_diff_eq!(total_area(&areas), 12.0);
    }
}

#[test]
fn concave_outers() {
    let star = util::polygon::star();
    let star_hole = util::polygon::square(-0.5, -0.5, 1.0);
    let rings = [&star[..], &star_hole[..]];
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &earcut(&rings))), 7.0, epsilon = 1e-9);

    let comb = util::polygon::comb();
    let comb_hole = util::polygon::rectangle(1.0, 0.5, 9.0, 1.5);
    let rings = [&comb[..], &comb_hole[..]];
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &earcut(&rings))), 36.0, epsilon = 1e-9);
}

#[test]
fn many_holes() {
    let outer = util::polygon::square(0.0, 0.0, 10.0);
    let holes: Vec<Vec<VTest>> = (0..3)
        .flat_map(|i| (0..3).map(move |j| util::polygon::square(1.0 + 3.0 * i as f32, 1.0 + 3.0 * j as f32, 2.0)))
        .collect();
    let rings: Vec<&[VTest]> = std::iter::once(&outer[..]).chain(holes.iter().map(|h| &h[..])).collect();

    let areas = triangle_areas(&rings, &earcut(&rings));
    assert_abs_diff_eq!(total_area(&areas), 100.0 - 9.0 * 4.0, epsilon = 1e-9);
    assert!(areas.iter().all(|&a| a > 0.0));
}

#[test]
fn random_holes() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        // One hole per cell of a 4x4 grid, so holes never overlap
        let outer = util::polygon::square(0.0, 0.0, 40.0);
        let mut holes = Vec::new();
        let mut hole_area = 0.0;
        for i in 0..4 {
            for j in 0..4 {
                if rng.gen_bool(0.5) {
                    continue;
                }
                let (x, y) = (10.0 * i as f32, 10.0 * j as f32);
                let x_min = x + rng.gen_range(1.0..4.0);
                let y_min = y + rng.gen_range(1.0..4.0);
                let x_max = x + rng.gen_range(6.0..9.0);
                let y_max = y + rng.gen_range(6.0..9.0);
                hole_area += ((x_max - x_min) * (y_max - y_min)) as f64;
                holes.push(util::polygon::rectangle(x_min, y_min, x_max, y_max));
            }
        }
        let rings: Vec<&[VTest]> = std::iter::once(&outer[..]).chain(holes.iter().map(|h| &h[..])).collect();

        let areas = triangle_areas(&rings, &earcut(&rings));
        assert_abs_diff_eq!(total_area(&areas), 1600.0 - hole_area, epsilon = 1e-2);
    }
}

#[test]
fn z_order_curve() {
    let n = 200;
    let outer = util::polygon::regular_polygon(n, 100.0, [0.0, 0.0]);
    let hole = util::polygon::regular_polygon(8, 20.0, [10.0, -5.0]);
    let rings = [&outer[..], &hole[..]];
    let expected = util::polygon::regular_polygon_area(n, 100.0) - util::polygon::regular_polygon_area(8, 20.0);

    let hashed = EarcutKernel::new().triangulate_rings(&rings, DIMENSIONS).unwrap();
    let linear = EarcutKernel::new().hash_threshold(usize::MAX).triangulate_rings(&rings, DIMENSIONS).unwrap();

    assert_eq!(hashed.indices.len(), linear.indices.len());
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &hashed)), expected, epsilon = 1e-6);
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &linear)), expected, epsilon = 1e-6);
}

#[test]
fn z_order_curve_small_ring() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::square(1.0, 1.0, 2.0);
    let rings = [&outer[..], &hole[..]];

    let output = EarcutKernel::new().hash_threshold(0).triangulate_rings(&rings, DIMENSIONS).unwrap();
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 12.0);
}

#[test]
fn touching_hole_outside_is_ignored() {
    let outer = util::polygon::square(0.0, 0.0, 1.0);
    let hole = util::polygon::square(1.0, 1.0, 1.0);
    let rings = [&outer[..], &hole[..]];

    let output = earcut(&rings);
    assert_eq!(output.indices.len(), 2 * 3);
    assert!(output.indices.iter().all(|&i| i < 4));
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 1.0);
}

#[test]
fn disjoint_hole_is_ignored() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let far = util::polygon::square(10.0, 10.0, 1.0);
    let inner = util::polygon::square(1.0, 1.0, 1.0);
    let rings = [&outer[..], &far[..], &inner[..]];

    let output = earcut(&rings);
    // Indices of the ignored hole are skipped, not reused
    assert!(output.indices.iter().all(|&i| i < 4 || i >= 8));
    assert!(output.indices.iter().any(|&i| i >= 8));
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 15.0);
}

#[test]
fn covering_hole_removes_everything() {
    let outer = util::polygon::square(0.0, 0.0, 1.0);
    let hole = util::polygon::square(-1.0, -1.0, 3.0);
    assert!(earcut(&[&outer[..], &hole[..]]).indices.is_empty());

    let identical = util::polygon::reversed(&outer);
    assert!(earcut(&[&outer[..], &identical[..]]).indices.is_empty());
}

#[test]
fn degenerate_hole_is_ignored() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole: Vec<VTest> = vec![(1.0, 1.0).into(), (2.0, 2.0).into()];
    let rings = [&outer[..], &hole[..]];

    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &earcut(&rings))), 16.0);
}

#[test]
fn zero_area_outer() {
    let outer: Vec<VTest> = vec![(0.0, 0.0).into(), (1.0, 1.0).into(), (2.0, 2.0).into()];
    let hole = util::polygon::square(0.5, 0.5, 0.1);
    assert!(earcut(&[&outer[..], &hole[..]]).indices.is_empty());
}

#[test]
fn no_rings() {
    let rings: [&[VTest]; 0] = [];
    assert_eq!(earcut(&rings), KernelOutput::default());
}

#[test]
fn hole_crossing_boundary() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let inner = util::polygon::square(1.0, 1.0, 1.0);
    let crossing = util::polygon::square(3.0, 3.0, 2.0);
    let rings = [&outer[..], &inner[..], &crossing[..]];

    let output = earcut(&rings);
    // The crossing hole notches the corner, meeting the boundary at (4, 3) and (3, 4)
    let mut added = output.added_vertices.clone();
    added.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(added, vec![[3.0, 4.0], [4.0, 3.0]]);
    assert!(output.indices.iter().any(|&i| i >= 12));
    assert!(output.indices.iter().all(|&i| i < 14));

    let areas = triangle_areas(&rings, &output);
    assert_abs_diff_eq!(total_area(&areas), 16.0 - 1.0 - 1.0, epsilon = 1e-9);
    assert!(areas.iter().all(|&a| a > 0.0), "Triangles wound inconsistently: {:?}", areas);
}

#[test]
fn hole_crossing_one_edge() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::rectangle(3.0, 1.0, 5.0, 3.0);
    let rings = [&outer[..], &hole[..]];

    let output = earcut(&rings);
    assert_eq!(output.added_vertices.len(), 2);
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 14.0, epsilon = 1e-9);
}

#[test]
fn hole_splitting_outer() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::rectangle(1.0, -1.0, 3.0, 5.0);
    let rings = [&outer[..], &hole[..]];

    let output = earcut(&rings);
    assert_eq!(output.added_vertices.len(), 4);
    // Two 1x4 strips remain
    assert_eq!(output.indices.len(), 4 * 3);
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 8.0, epsilon = 1e-9);
}

#[test]
fn hole_along_outer_edge() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::rectangle(0.0, 1.0, 2.0, 3.0);
    let rings = [&outer[..], &hole[..]];

    let output = earcut(&rings);
    assert!(output.added_vertices.is_empty());
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 12.0, epsilon = 1e-9);
}

#[test]
fn nested_holes() {
    let outer = util::polygon::square(0.0, 0.0, 10.0);
    let large = util::polygon::square(2.0, 2.0, 6.0);
    let small = util::polygon::square(4.0, 4.0, 2.0);

    for (rings, small_indices) in [([&outer[..], &large[..], &small[..]], 8..12), ([&outer[..], &small[..], &large[..]], 4..8)] {
        let output = earcut(&rings);
        // The inner hole lies within the outer one and adds nothing
        assert!(output.indices.iter().all(|i| !small_indices.contains(i)), "{:?}", output.indices);
        assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 64.0, epsilon = 1e-9);
    }
}

#[test]
fn overlapping_holes() {
    let outer = util::polygon::square(0.0, 0.0, 10.0);
    let first = util::polygon::square(2.0, 2.0, 4.0);
    let second = util::polygon::square(4.0, 4.0, 4.0);
    let rings = [&outer[..], &first[..], &second[..]];

    let output = earcut(&rings);
    let mut added = output.added_vertices.clone();
    added.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(added, vec![[4.0, 6.0], [6.0, 4.0]]);
    let areas = triangle_areas(&rings, &output);
    assert_abs_diff_eq!(total_area(&areas), 100.0 - (16.0 + 16.0 - 4.0), epsilon = 1e-9);
    assert!(areas.iter().all(|&a| a > 0.0), "Triangles wound inconsistently: {:?}", areas);
}

#[test]
fn holes_sharing_an_edge() {
    let outer = util::polygon::square(0.0, 0.0, 10.0);
    let left = util::polygon::square(2.0, 2.0, 2.0);
    let right = util::polygon::square(4.0, 2.0, 2.0);
    let rings = [&outer[..], &left[..], &right[..]];

    let output = earcut(&rings);
    assert!(output.added_vertices.is_empty());
    let areas = triangle_areas(&rings, &output);
    assert_abs_diff_eq!(total_area(&areas), 92.0, epsilon = 1e-9);
    assert!(areas.iter().all(|&a| a > 0.0), "Triangles wound inconsistently: {:?}", areas);
}

#[test]
fn holes_sharing_part_of_an_edge() {
    let outer = util::polygon::square(0.0, 0.0, 10.0);
    let lower = util::polygon::rectangle(2.0, 2.0, 5.0, 4.0);
    let upper = util::polygon::rectangle(3.0, 4.0, 7.0, 6.0);
    let rings = [&outer[..], &lower[..], &upper[..]];

    let output = earcut(&rings);
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 100.0 - 6.0 - 8.0, epsilon = 1e-9);
}

#[test]
fn holes_touching_at_a_corner() {
    let outer = util::polygon::square(0.0, 0.0, 10.0);
    let first = util::polygon::square(2.0, 2.0, 2.0);
    let second = util::polygon::square(4.0, 4.0, 2.0);
    let rings = [&outer[..], &first[..], &second[..]];

    let output = earcut(&rings);
    assert!(output.added_vertices.is_empty());
    assert_abs_diff_eq!(total_area(&triangle_areas(&rings, &output)), 92.0, epsilon = 1e-9);
}

#[test]
fn holes_enclosing_an_island() {
    // Four overlapping bars form a frame, leaving a 4x4 island in the middle
    let outer = util::polygon::square(0.0, 0.0, 10.0);
    let bars = [
        util::polygon::rectangle(1.0, 1.0, 9.0, 3.0),
        util::polygon::rectangle(1.0, 7.0, 9.0, 9.0),
        util::polygon::rectangle(1.0, 1.0, 3.0, 9.0),
        util::polygon::rectangle(7.0, 1.0, 9.0, 9.0),
    ];
    let rings: Vec<&[VTest]> = std::iter::once(&outer[..]).chain(bars.iter().map(|b| &b[..])).collect();

    let output = earcut(&rings);
    let areas = triangle_areas(&rings, &output);
    assert_abs_diff_eq!(total_area(&areas), 100.0 - 48.0, epsilon = 1e-9);
    assert!(areas.iter().all(|&a| a > 0.0), "Triangles wound inconsistently: {:?}", areas);
}

#[test]
fn self_intersecting_rings() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let bow_tie: Vec<VTest> = vec![(1.0, 3.0).into(), (3.0, 3.0).into(), (1.0, 1.0).into(), (3.0, 1.0).into()];

    let result = EarcutKernel::new().triangulate_rings(&[&outer[..], &bow_tie[..]], DIMENSIONS);
    assert!(matches!(result, Err(KernelError::SelfIntersecting { ring: 1 })), "{:?}", result);

    // Crosses itself at (2, 2) but still encloses some area
    let crossed: Vec<VTest> = vec![(0.0, 0.0).into(), (4.0, 0.0).into(), (0.0, 4.0).into(), (6.0, 6.0).into()];
    let hole = util::polygon::square(1.0, 0.5, 0.5);
    let result = EarcutKernel::new().triangulate_rings(&[&crossed[..], &hole[..]], DIMENSIONS);
    assert!(matches!(result, Err(KernelError::SelfIntersecting { ring: 0 })), "{:?}", result);
}

#[test]
fn unsupported_dimensions() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let result = EarcutKernel::new().triangulate_rings(&[&outer[..]], 3);
    assert!(matches!(result, Err(KernelError::UnsupportedDimensions(3))), "{:?}", result);
}

#[test]
fn outer_needs_three_vertices() {
    let outer: Vec<VTest> = vec![(0.0, 0.0).into(), (1.0, 1.0).into()];
    let result = EarcutKernel::new().triangulate_rings(&[&outer[..]], DIMENSIONS);
    assert!(matches!(result, Err(KernelError::NotEnoughVertices { ring: 0, count: 2 })), "{:?}", result);
}

#[test]
fn non_finite_coordinates() {
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let mut hole = util::polygon::square(1.0, 1.0, 1.0);
    hole[2] = (f32::NAN, 1.5).into();

    let result = EarcutKernel::new().triangulate_rings(&[&outer[..], &hole[..]], DIMENSIONS);
    assert!(matches!(result, Err(KernelError::NonFiniteCoordinate { ring: 1, vertex: 2 })), "{:?}", result);

    let outer = vec![[0.0f64, 0.0], [f64::INFINITY, 0.0], [1.0, 1.0]];
    let result = EarcutKernel::new().triangulate_rings(&[&outer[..]], DIMENSIONS);
    assert!(matches!(result, Err(KernelError::NonFiniteCoordinate { ring: 0, vertex: 1 })), "{:?}", result);
}

#[test]
fn kernel_is_reusable() {
    let mut kernel = EarcutKernel::new();
    let outer = util::polygon::square(0.0, 0.0, 4.0);
    let hole = util::polygon::square(1.0, 1.0, 2.0);

    let first = kernel.triangulate_rings(&[&outer[..], &hole[..]], DIMENSIONS).unwrap();
    let second = kernel.triangulate_rings(&[&outer[..], &hole[..]], DIMENSIONS).unwrap();
    assert_eq!(first, second);
}
