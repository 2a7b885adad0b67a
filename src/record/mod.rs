//! Training record persistence.
//!
//! A record holds one input/target pair as a safetensors container with
//! exactly two entries, `input` and `target`, each a `(2, height, width)`
//! `f32` tensor.

mod load;
mod save;

pub use load::load_pair;
pub use save::save_pair;

use crate::image::{InputTensor, TargetTensor};

/// Record key of the input tensor.
pub const INPUT_KEY: &str = "input";

/// Record key of the target tensor.
pub const TARGET_KEY: &str = "target";

/// Extension given to written records.
pub const RECORD_EXTENSION: &str = ".pt";

/// One training example derived from a single source image.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPair {
    /// R and G planes.
    pub input: InputTensor,
    /// Corrected B plane and raw A plane.
    pub target: TargetTensor,
}

impl TrainingPair {
    /// Bundle an extracted input/target pair.
    #[must_use]
    pub const fn new(input: InputTensor, target: TargetTensor) -> Self {
        Self { input, target }
    }

    /// `(height, width)` of the underlying image.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        let (_, height, width) = self.input.dim();
        (height, width)
    }
}
