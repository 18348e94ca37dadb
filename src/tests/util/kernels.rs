use std::{convert::Infallible, error, fmt};

use num_traits::ToPrimitive;

use crate::{Kernel, KernelOutput, Vertex};

/// A kernel which records its input and returns a fixed index list
#[derive(Debug, Default)]
pub struct RecordingKernel {
    pub output: Vec<usize>,
    pub calls: Vec<RecordedCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub rings: Vec<Vec<[f64; 2]>>,
    pub dimensions: usize,
}

impl RecordingKernel {
    pub fn returning(output: Vec<usize>) -> Self {
        Self {
            output,
            calls: Vec::new(),
        }
    }
}

impl Kernel for RecordingKernel {
    type Error = Infallible;

    fn triangulate_rings<V: Vertex>(&mut self, rings: &[&[V]], dimensions: usize) -> Result<KernelOutput<V::Coordinate>, Self::Error> {
        let rings = rings.iter()
            .map(|ring| ring.iter().map(|v| [v.x().to_f64().unwrap(), v.y().to_f64().unwrap()]).collect())
            .collect();
        self.calls.push(RecordedCall { rings, dimensions });
        Ok(self.output.clone().into())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Refused;

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel refused the rings")
    }
}

impl error::Error for Refused { }

/// A kernel which always fails
#[derive(Debug, Default)]
pub struct FailingKernel;

impl Kernel for FailingKernel {
    type Error = Refused;

    fn triangulate_rings<V: Vertex>(&mut self, _rings: &[&[V]], _dimensions: usize) -> Result<KernelOutput<V::Coordinate>, Self::Error> {
        Err(Refused)
    }
}

/// Converts a ring to the form recorded by [RecordingKernel]
pub fn recorded<V: Vertex>(ring: &[V]) -> Vec<[f64; 2]> {
    ring.iter().map(|v| [v.x().to_f64().unwrap(), v.y().to_f64().unwrap()]).collect()
}
