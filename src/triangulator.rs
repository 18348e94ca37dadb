use smallvec::SmallVec;

use crate::{Bounds, EarcutKernel, Kernel, Mesh, SkipReason, Triangle, Triangulation, TriangulationError, Vertex, kernel::DIMENSIONS};

/// What to do when a [Kernel] returns an index count which is not a multiple of 3
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PartialTrianglePolicy {
    /// Drop the trailing indices and log a warning
    Truncate,
    /// Fail with [TriangulationError::IncompleteTriangle]
    Reject,
}

impl Default for PartialTrianglePolicy {
    fn default() -> Self {
        Self::Truncate
    }
}

/// Triangulates polygons with holes using a [Kernel].
///
/// Holes are pre-filtered by bounding box: only those whose bounds intersect (or touch) the
/// outer ring's bounds are passed on, in their original order. If there is nothing to cut out,
/// the polygon is returned untouched as [Triangulation::Skipped].
#[derive(Debug, Clone, Default)]
pub struct Triangulator<K: Kernel = EarcutKernel> {
    kernel: K,
    partial_triangles: PartialTrianglePolicy,
}

impl Triangulator {
    /// A triangulator using the [EarcutKernel]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Kernel> Triangulator<K> {
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            partial_triangles: PartialTrianglePolicy::default(),
        }
    }

    pub fn partial_triangles(mut self, policy: PartialTrianglePolicy) -> Self {
        self.partial_triangles = policy;
        self
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn into_kernel(self) -> K {
        self.kernel
    }

    /// Triangulates `outer` minus `holes`.
    ///
    /// Returns [Triangulation::Skipped] with the untouched outer ring when `outer` is missing or
    /// has fewer than 3 vertices, when there are no holes, or when no hole's bounds intersect the
    /// outer ring's bounds. Otherwise the kernel's output is grouped into triangles, indexing the
    /// outer ring's vertices followed by those of each eligible hole and any vertex the kernel
    /// added where rings cross.
    pub fn triangulate<'a, V: Vertex, H: AsRef<[V]>>(&mut self, outer: Option<&'a [V]>, holes: Option<&'a [H]>) -> Result<Triangulation<'a, V>, TriangulationError<K::Error>> {
        let outer = match outer {
            Some(outer) => outer,
            None => return Ok(skip(None, SkipReason::MissingPolygon)),
        };
        if outer.len() < 3 {
            return Ok(skip(Some(outer), SkipReason::TooFewVertices(outer.len())));
        }
        let holes = match holes {
            Some(holes) if !holes.is_empty() => holes,
            _ => return Ok(skip(Some(outer), SkipReason::NoHoles)),
        };

        let bounds = match Bounds::of(outer) {
            Some(bounds) => bounds,
            None => return Ok(skip(Some(outer), SkipReason::TooFewVertices(0))),
        };

        let mut rings: Vec<&'a [V]> = Vec::with_capacity(holes.len() + 1);
        rings.push(outer);
        let mut eligible_holes = Vec::with_capacity(holes.len());
        let mut filtered: SmallVec<[usize; 4]> = SmallVec::new();
        for (i, hole) in holes.iter().enumerate() {
            let hole = hole.as_ref();
            match Bounds::of(hole) {
                Some(hole_bounds) if hole_bounds.intersects(&bounds) => {
                    rings.push(hole);
                    eligible_holes.push(i);
                }
                _ => filtered.push(i),
            }
        }
        if !filtered.is_empty() {
            tracing::debug!("holes {:?} lie outside the outer ring's bounds", filtered.as_slice());
        }

        if eligible_holes.is_empty() {
            return Ok(skip(Some(outer), SkipReason::NoEligibleHoles));
        }

        let output = self.kernel.triangulate_rings(&rings, DIMENSIONS)?;
        let triangles = self.group_triangles(output.indices)?;

        let vertex_count = rings.iter().map(|ring| ring.len()).sum::<usize>() + output.added_vertices.len();
        if let Some(&index) = triangles.iter().flatten().find(|&&index| index >= vertex_count) {
            return Err(TriangulationError::IndexOutOfRange { index, vertex_count });
        }

        let mesh = Mesh::new(rings, output.added_vertices, eligible_holes, triangles);

        #[cfg(feature = "debugging")]
        crate::debug::svg::output_triangulation(&mesh, holes).map_err(TriangulationError::SvgOutput)?;

        Ok(Triangulation::Triangulated(mesh))
    }

    fn group_triangles(&self, indices: Vec<usize>) -> Result<Vec<Triangle>, TriangulationError<K::Error>> {
        let chunks = indices.chunks_exact(3);
        let remainder = chunks.remainder().len();
        if remainder != 0 {
            match self.partial_triangles {
                PartialTrianglePolicy::Truncate => tracing::warn!(
                    "kernel returned {} indices, dropping the trailing {}", indices.len(), remainder),
                PartialTrianglePolicy::Reject => return Err(TriangulationError::IncompleteTriangle { index_count: indices.len() }),
            }
        }
        Ok(chunks.map(|c| [c[0], c[1], c[2]]).collect())
    }
}

fn skip<V: Vertex>(polygon: Option<&[V]>, reason: SkipReason) -> Triangulation<'_, V> {
    tracing::debug!("skipping triangulation: {}", reason);
    Triangulation::Skipped { polygon, reason }
}

/// Triangulates `outer` minus `holes` with a default [Triangulator].
///
/// ```
/// let outer = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
/// let holes = [vec![[1.0, 1.0], [1.0, 3.0], [3.0, 3.0], [3.0, 1.0]]];
///
/// let triangulation = perforate::triangulate(Some(&outer[..]), Some(&holes[..])).unwrap();
/// let mesh = triangulation.mesh().unwrap();
/// assert_eq!(mesh.area(), 12.0);
/// ```
pub fn triangulate<'a, V: Vertex, H: AsRef<[V]>>(outer: Option<&'a [V]>, holes: Option<&'a [H]>) -> Result<Triangulation<'a, V>, TriangulationError<<EarcutKernel as Kernel>::Error>> {
    Triangulator::new().triangulate(outer, holes)
}
