use super::vtest::VTest;

/// Axis-aligned rectangle, counter-clockwise
pub fn rectangle(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Vec<VTest> {
    vec![
        (x_min, y_min).into(),
        (x_max, y_min).into(),
        (x_max, y_max).into(),
        (x_min, y_max).into(),
    ]
}

/// Axis-aligned square with its lower left corner at `(x, y)`, counter-clockwise
pub fn square(x: f32, y: f32, size: f32) -> Vec<VTest> {
    rectangle(x, y, x + size, y + size)
}

/// A concave, counter-clockwise star with an area of 8
pub fn star() -> Vec<VTest> {
    vec![
        (1.0, 0.0).into(),
        (2.0, 2.0).into(),
        (0.0, 1.0).into(),
        (-2.0, 2.0).into(),
        (-1.0, 0.0).into(),
        (-2.0, -2.0).into(),
        (0.0, -1.0).into(),
        (2.0, -2.0).into(),
    ]
}

/// A comb with 3 teeth pointing up from a 10x2 spine, counter-clockwise, with an area of 44
///
/// ```text
/// +-+ +-+ +-+
/// | | | | | |
/// | +-+ +-+ |
/// +---------+
/// ```
pub fn comb() -> Vec<VTest> {
    vec![
        (0.0, 0.0).into(),
        (10.0, 0.0).into(),
        (10.0, 6.0).into(),
        (8.0, 6.0).into(),
        (8.0, 2.0).into(),
        (6.0, 2.0).into(),
        (6.0, 6.0).into(),
        (4.0, 6.0).into(),
        (4.0, 2.0).into(),
        (2.0, 2.0).into(),
        (2.0, 6.0).into(),
        (0.0, 6.0).into(),
    ]
}

/// `n` points on a circle, counter-clockwise
pub fn regular_polygon(n: usize, radius: f64, center: [f64; 2]) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let theta = std::f64::consts::PI * 2. * (i as f64) / (n as f64);
            let (sin, cos) = theta.sin_cos();
            [center[0] + cos * radius, center[1] + sin * radius]
        })
        .collect()
}

/// The area of a regular polygon built by [regular_polygon]
pub fn regular_polygon_area(n: usize, radius: f64) -> f64 {
    let n = n as f64;
    n * radius * radius * (std::f64::consts::PI * 2. / n).sin() / 2.
}

pub fn reversed<V: Clone>(ring: &[V]) -> Vec<V> {
    ring.iter().rev().cloned().collect()
}
