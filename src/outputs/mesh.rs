use num_traits::{One, Zero};

use crate::{Real, Vertex};

/// Three indices into the concatenated vertices of a [Mesh]'s rings
pub type Triangle = [usize; 3];

/// A triangulated polygon: the rings handed to the [Kernel](crate::Kernel) and the triangles it produced.
///
/// Triangle indices refer to the concatenation of [Mesh::rings]: the outer ring's vertices first,
/// then each eligible hole's vertices in order, then [Mesh::added_vertices].
#[derive(Debug, Clone)]
pub struct Mesh<'a, V: Vertex> {
    rings: Vec<&'a [V]>,
    offsets: Vec<usize>,
    added_vertices: Vec<[V::Coordinate; 2]>,
    eligible_holes: Vec<usize>,
    triangles: Vec<Triangle>,
}

impl<'a, V: Vertex> Mesh<'a, V> {
    pub(crate) fn new(rings: Vec<&'a [V]>, added_vertices: Vec<[V::Coordinate; 2]>, eligible_holes: Vec<usize>, triangles: Vec<Triangle>) -> Self {
        let offsets = rings.iter()
            .scan(0, |offset, ring| {
                let start = *offset;
                *offset += ring.len();
                Some(start)
            })
            .collect();
        Self {
            rings,
            offsets,
            added_vertices,
            eligible_holes,
            triangles,
        }
    }

    /// The outer ring followed by every eligible hole
    pub fn rings(&self) -> &[&'a [V]] {
        &self.rings
    }

    /// The outer ring
    pub fn outer(&self) -> &'a [V] {
        self.rings[0]
    }

    /// For each hole in [Mesh::rings], its index in the hole list originally passed in
    pub fn eligible_holes(&self) -> &[usize] {
        &self.eligible_holes
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }

    /// Vertices the kernel added where a hole crosses the outer ring or another hole. The first
    /// has the index following the last vertex of [Mesh::rings].
    pub fn added_vertices(&self) -> &[[V::Coordinate; 2]] {
        &self.added_vertices
    }

    /// The number of vertices across all rings, plus the added vertices
    pub fn vertex_count(&self) -> usize {
        self.input_vertex_count() + self.added_vertices.len()
    }

    fn input_vertex_count(&self) -> usize {
        self.rings.iter().map(|ring| ring.len()).sum()
    }

    /// Resolves an index of the concatenated rings. Added vertices are not ring vertices, see
    /// [Mesh::position].
    pub fn vertex(&self, index: usize) -> Option<&'a V> {
        // Index of the last ring starting at or before `index`
        let ring = self.offsets.partition_point(|&offset| offset <= index).checked_sub(1)?;
        self.rings[ring].get(index - self.offsets[ring])
    }

    /// The coordinates of any triangle index, ring vertex or added
    pub fn position(&self, index: usize) -> Option<[V::Coordinate; 2]> {
        match self.vertex(index) {
            Some(v) => Some([v.x(), v.y()]),
            None => self.added_vertices.get(index.checked_sub(self.input_vertex_count())?).copied(),
        }
    }

    /// The corner coordinates of each triangle
    pub fn triangle_positions(&self) -> impl Iterator<Item=[[V::Coordinate; 2]; 3]> + '_ {
        self.triangles.iter().filter_map(move |&[a, b, c]| Some([self.position(a)?, self.position(b)?, self.position(c)?]))
    }

    /// The total area covered by the triangles
    pub fn area(&self) -> V::Coordinate {
        let two = V::Coordinate::one() + V::Coordinate::one();
        self.triangle_positions()
            .map(|[a, b, c]| (((b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])) / two).abs())
            .fold(V::Coordinate::zero(), |sum, area| sum + area)
    }
}
