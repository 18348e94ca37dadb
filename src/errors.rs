use std::{error, fmt};

use backtrace::Backtrace;

/// An invariant of a triangulation algorithm was broken; indicates a bug rather than bad input.
#[derive(Debug)]
pub struct InternalError {
    pub msg: String,
    pub backtrace: Backtrace,
}

impl InternalError {
    #[cold]
    #[inline(always)]
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            backtrace: Backtrace::new_unresolved(),
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{:?}", self.msg, self.backtrace)
    }
}

impl error::Error for InternalError { }

/// Describes an error raised by the [EarcutKernel](crate::EarcutKernel)
#[derive(Debug)]
#[non_exhaustive]
pub enum KernelError {
    /// The kernel only triangulates planar (2-dimensional) rings
    UnsupportedDimensions(usize),
    /// The outer ring has fewer than 3 vertices
    NotEnoughVertices { ring: usize, count: usize },
    /// A coordinate is NaN or infinite
    NonFiniteCoordinate { ring: usize, vertex: usize },
    /// Two edges of the same ring cross
    SelfIntersecting { ring: usize },
    /// No valid diagonal could be found to continue clipping; the rings are most likely self-intersecting
    Untriangulable { remaining: usize },
    /// A triangulation precondition was violated, or a triangulation bug was encountered.
    InternalError(InternalError),
}

impl KernelError {
    #[inline(always)]
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(InternalError::new(msg))
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDimensions(dimensions) => write!(f, "Rings with {} dimensions are not supported", dimensions),
            Self::NotEnoughVertices { ring, count } => write!(f, "Ring {} only contains {} vertices", ring, count),
            Self::NonFiniteCoordinate { ring, vertex } => write!(f, "Vertex {} of ring {} has a non-finite coordinate", vertex, ring),
            Self::SelfIntersecting { ring } => write!(f, "Ring {} intersects itself", ring),
            Self::Untriangulable { remaining } => write!(f, "Unable to triangulate the remaining {} vertices", remaining),
            Self::InternalError(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl error::Error for KernelError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InternalError(error) => Some(error),
            _ => None,
        }
    }
}

/// Describes an error which occurred during triangulation
#[derive(Debug)]
#[non_exhaustive]
pub enum TriangulationError<KError: error::Error> {
    /// The [Kernel](crate::Kernel) failed. The error is passed through as-is.
    Kernel(KError),
    /// The kernel returned an index count which is not a multiple of 3, and the
    /// [Triangulator](crate::Triangulator) is configured with [PartialTrianglePolicy::Reject](crate::PartialTrianglePolicy::Reject).
    IncompleteTriangle { index_count: usize },
    /// The kernel returned an index beyond the vertices of the rings it was given.
    IndexOutOfRange { index: usize, vertex_count: usize },
    #[cfg(feature = "debugging")]
    SvgOutput(std::io::Error),
}

impl<KError: error::Error> TriangulationError<KError> {
    /// Returns the kernel's error if that is what this is
    pub fn into_kernel_error(self) -> Option<KError> {
        match self {
            Self::Kernel(error) => Some(error),
            _ => None,
        }
    }
}

impl<KError: error::Error> From<KError> for TriangulationError<KError> {
    fn from(e: KError) -> Self {
        Self::Kernel(e)
    }
}

impl<KError: error::Error> fmt::Display for TriangulationError<KError> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kernel(error) => fmt::Display::fmt(error, f),
            Self::IncompleteTriangle { index_count } => write!(f, "Kernel returned {} indices, which do not form whole triangles", index_count),
            Self::IndexOutOfRange { index, vertex_count } => write!(f, "Kernel returned index {} but only {} vertices exist", index, vertex_count),
            #[cfg(feature = "debugging")]
            Self::SvgOutput(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl<KError: error::Error> error::Error for TriangulationError<KError> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Kernel(error) => error.source(), // Passing the kernel error itself would force restricting KError to 'static.
            #[cfg(feature = "debugging")]
            Self::SvgOutput(error) => Some(error),
            _ => None,
        }
    }
}
