mod mesh;
pub use mesh::{Mesh, Triangle};
mod triangulation;
pub use triangulation::{SkipReason, Triangulation};
mod triangle_winding;
pub use triangle_winding::TriangleWinding;
