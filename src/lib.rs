//! Triangulates polygons with holes.
//!
//! The [Triangulator] filters holes by bounding box, hands the outer ring and the remaining holes
//! to a [Kernel], and groups the kernel's flat index list into triangles. Inputs with nothing to
//! cut out are passed through untouched as [Triangulation::Skipped].

mod idx;
mod bounds;
pub mod geometry;
mod inputs;
mod outputs;
mod kernel;
mod triangulator;
mod errors;

#[cfg(feature = "debugging")]
mod debug;

#[cfg(any(test, feature = "benchmarking"))]
pub mod tests;

pub use bounds::Bounds;
pub use errors::{InternalError, KernelError, TriangulationError};
pub use inputs::*;
pub use kernel::{DIMENSIONS, EarcutKernel, Kernel, KernelOutput};
pub use outputs::*;
pub use triangulator::{PartialTrianglePolicy, Triangulator, triangulate};

pub use num_traits::real::Real;
