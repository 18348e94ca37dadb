use std::error;

use crate::Vertex;

mod earcut;
pub use earcut::EarcutKernel;
mod overlay;

/// The dimensionality of the rings passed to a [Kernel]. Only planar coordinates are used.
pub const DIMENSIONS: usize = 2;

/// The triangles produced by a [Kernel].
///
/// `indices` refer to the concatenation of all rings (the outer ring's vertices first, then each
/// hole's, in order), followed by `added_vertices`. Each consecutive triple is one triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelOutput<C> {
    pub indices: Vec<usize>,
    /// Vertices the kernel introduced where rings cross. Index `n` of the concatenated rings'
    /// `n` vertices refers to the first of these.
    pub added_vertices: Vec<[C; 2]>,
}

impl<C> Default for KernelOutput<C> {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            added_vertices: Vec::new(),
        }
    }
}

impl<C> From<Vec<usize>> for KernelOutput<C> {
    fn from(indices: Vec<usize>) -> Self {
        Self {
            indices,
            added_vertices: Vec::new(),
        }
    }
}

/// A constrained triangulation algorithm over a set of rings.
///
/// `rings[0]` is the outer boundary, every following ring is a hole. The result is a
/// [KernelOutput]: a flat list of vertex indices, where each consecutive triple is one triangle.
///
/// Implementations must produce non-degenerate, non-overlapping triangles which exactly cover
/// the outer ring minus the union of the holes, all wound the same way as the outer ring. Holes
/// which do not overlap the outer ring must not affect the result.
pub trait Kernel {
    /// The error returned when the rings cannot be triangulated
    type Error: error::Error;

    /// Triangulates `rings`, whose coordinates have `dimensions` components
    fn triangulate_rings<V: Vertex>(&mut self, rings: &[&[V]], dimensions: usize) -> Result<KernelOutput<V::Coordinate>, Self::Error>;
}

impl<K: Kernel + ?Sized> Kernel for &mut K {
    type Error = K::Error;

    #[inline]
    fn triangulate_rings<V: Vertex>(&mut self, rings: &[&[V]], dimensions: usize) -> Result<KernelOutput<V::Coordinate>, Self::Error> {
        (**self).triangulate_rings(rings, dimensions)
    }
}
