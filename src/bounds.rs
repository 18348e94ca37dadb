use crate::{Real, Vertex};

/// The axis-aligned bounding box of a ring.
///
/// Always satisfies `x_min <= x_max` and `y_min <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<C: Real> {
    pub x_min: C,
    pub x_max: C,
    pub y_min: C,
    pub y_max: C,
}

impl<C: Real> Bounds<C> {
    /// Computes the bounds of `ring`, or `None` if it has no vertices.
    pub fn of<V: Vertex<Coordinate=C>>(ring: &[V]) -> Option<Self> {
        let (first, rest) = ring.split_first()?;
        Some(rest.iter().fold(Self::point(first.x(), first.y()), |bounds, v| bounds.extend(v.x(), v.y())))
    }

    /// Degenerate bounds containing only `(x, y)`
    pub fn point(x: C, y: C) -> Self {
        Self {
            x_min: x,
            x_max: x,
            y_min: y,
            y_max: y,
        }
    }

    /// Grows the bounds to include `(x, y)`
    pub fn extend(self, x: C, y: C) -> Self {
        Self {
            x_min: self.x_min.min(x),
            x_max: self.x_max.max(x),
            y_min: self.y_min.min(y),
            y_max: self.y_max.max(y),
        }
    }

    /// Returns `true` if the two boxes overlap. Boxes which only touch along an edge or at a corner
    /// are considered overlapping.
    pub fn intersects(&self, other: &Self) -> bool {
        !(other.x_min > self.x_max ||
          other.y_min > self.y_max ||
          other.x_max < self.x_min ||
          other.y_max < self.y_min)
    }

    /// Returns `true` if `other` lies entirely within these bounds, boundary included.
    pub fn contains(&self, other: &Self) -> bool {
        other.x_min >= self.x_min &&
        other.x_max <= self.x_max &&
        other.y_min >= self.y_min &&
        other.y_max <= self.y_max
    }

    pub fn width(&self) -> C { self.x_max - self.x_min }
    pub fn height(&self) -> C { self.y_max - self.y_min }
}
