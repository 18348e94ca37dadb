//! Orientation and containment predicates over rings.

use num_traits::Zero;

use crate::{Real, TriangleWinding, Vertex};

/// Where a point lies relative to a ring
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Location {
    /// Strictly within the area enclosed by the ring
    Inside,
    /// On one of the ring's edges or vertices
    Boundary,
    /// Strictly outside the area enclosed by the ring
    Outside,
}

fn two<C: Real>() -> C {
    C::one() + C::one()
}

/// The signed area of `ring`, positive when its vertices are listed counter-clockwise
/// (with the y axis pointing up).
pub fn signed_area<V: Vertex>(ring: &[V]) -> V::Coordinate {
    let mut sum = V::Coordinate::zero();
    for (a, b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
        sum = sum + (a.x() * b.y() - b.x() * a.y());
    }
    sum / two()
}

/// The signed area of the triangle `(a, b, c)`, positive when counter-clockwise
pub fn triangle_signed_area<V: Vertex>(a: &V, b: &V, c: &V) -> V::Coordinate {
    ((b.x() - a.x()) * (c.y() - a.y()) - (b.y() - a.y()) * (c.x() - a.x())) / two()
}

/// The orientation of `ring`, or `None` if it encloses no area
pub fn winding<V: Vertex>(ring: &[V]) -> Option<TriangleWinding> {
    let area = signed_area(ring);
    if area > V::Coordinate::zero() {
        Some(TriangleWinding::Counterclockwise)
    } else if area < V::Coordinate::zero() {
        Some(TriangleWinding::Clockwise)
    } else {
        None
    }
}

/// Locates `(x, y)` relative to `ring` using the crossing number. Points exactly on an edge
/// are reported as [Location::Boundary].
pub fn locate<V: Vertex>(ring: &[V], x: V::Coordinate, y: V::Coordinate) -> Location {
    let mut inside = false;
    for (a, b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
        let (ax, ay, bx, by) = (a.x(), a.y(), b.x(), b.y());

        let cross = (bx - ax) * (y - ay) - (by - ay) * (x - ax);
        if cross == V::Coordinate::zero() &&
           x >= ax.min(bx) && x <= ax.max(bx) &&
           y >= ay.min(by) && y <= ay.max(by) {
            return Location::Boundary;
        }

        if (ay > y) != (by > y) {
            let x_intercept = ax + (y - ay) * (bx - ax) / (by - ay);
            if x < x_intercept {
                inside = !inside;
            }
        }
    }

    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Vertices and edge midpoints of `ring`, in order
pub(crate) fn samples<V: Vertex>(ring: &[V]) -> impl Iterator<Item=(V::Coordinate, V::Coordinate)> + '_ {
    let two = two::<V::Coordinate>();
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .flat_map(move |(a, b)| [
            (a.x(), a.y()),
            ((a.x() + b.x()) / two, (a.y() + b.y()) / two),
        ])
}
