use std::fmt;

use crate::Vertex;

use super::Mesh;

/// Why a polygon was returned without being triangulated
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SkipReason {
    /// No outer ring was given
    MissingPolygon,
    /// The outer ring has fewer than 3 vertices
    TooFewVertices(usize),
    /// No hole list was given, or it was empty
    NoHoles,
    /// No hole's bounds intersect the outer ring's bounds
    NoEligibleHoles,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPolygon => write!(f, "no outer ring"),
            Self::TooFewVertices(count) => write!(f, "outer ring only has {} vertices", count),
            Self::NoHoles => write!(f, "no holes"),
            Self::NoEligibleHoles => write!(f, "no hole overlaps the outer ring's bounds"),
        }
    }
}

/// The outcome of [Triangulator::triangulate](crate::Triangulator::triangulate)
#[derive(Clone)]
pub enum Triangulation<'a, V: Vertex> {
    /// The input was passed through unchanged
    Skipped {
        polygon: Option<&'a [V]>,
        reason: SkipReason,
    },
    Triangulated(Mesh<'a, V>),
}

impl<'a, V: Vertex + fmt::Debug> fmt::Debug for Triangulation<'a, V>
where
    V::Coordinate: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { polygon, reason } => f.debug_struct("Skipped")
                .field("polygon", polygon)
                .field("reason", reason)
                .finish(),
            Self::Triangulated(mesh) => f.debug_tuple("Triangulated").field(mesh).finish(),
        }
    }
}

impl<'a, V: Vertex> Triangulation<'a, V> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn mesh(&self) -> Option<&Mesh<'a, V>> {
        match self {
            Self::Triangulated(mesh) => Some(mesh),
            Self::Skipped { .. } => None,
        }
    }

    pub fn into_mesh(self) -> Option<Mesh<'a, V>> {
        match self {
            Self::Triangulated(mesh) => Some(mesh),
            Self::Skipped { .. } => None,
        }
    }

    /// The untouched outer ring, if the input was skipped
    pub fn skipped_polygon(&self) -> Option<&'a [V]> {
        match self {
            Self::Skipped { polygon, .. } => *polygon,
            Self::Triangulated(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped { reason, .. } => Some(*reason),
            Self::Triangulated(_) => None,
        }
    }
}
