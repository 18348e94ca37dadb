pub mod polygon;
pub mod kernels;
mod vtest;

pub use vtest::VTest;
