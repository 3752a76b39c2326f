//! Seeded random train/validation split.
//!
//! The split is a deterministic function of the seed and the sample
//! ordering: indices are shuffled with a seeded ChaCha generator and
//! the first `round(n * valid_pct)` go to validation. Repeating a run
//! with the same seed over the same file set reproduces the split
//! exactly.

use bof_core::{Error, ImageSample, Result};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Random splitter with a fixed validation fraction and seed.
#[derive(Debug, Clone, Copy)]
pub struct RandomSplitter {
    valid_pct: f64,
    seed: u64,
}

impl RandomSplitter {
    pub fn new(valid_pct: f64, seed: u64) -> Result<Self> {
        if !(valid_pct > 0.0 && valid_pct < 1.0) {
            return Err(Error::InvalidArgument(format!(
                "validation fraction must be in (0, 1), got {valid_pct}"
            )));
        }
        Ok(Self { valid_pct, seed })
    }

    /// Splits `n` indices into (train, validation) index sets.
    pub fn split_indices(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let valid_count = ((n as f64) * self.valid_pct).round() as usize;
        let valid = indices[..valid_count].to_vec();
        let train = indices[valid_count..].to_vec();
        (train, valid)
    }

    /// Splits samples into (train, validation) subsets.
    pub fn split(&self, samples: &[ImageSample]) -> (Vec<ImageSample>, Vec<ImageSample>) {
        let (train_idx, valid_idx) = self.split_indices(samples.len());
        let pick = |indices: &[usize]| {
            indices
                .iter()
                .map(|&i| samples[i].clone())
                .collect::<Vec<_>>()
        };
        (pick(&train_idx), pick(&valid_idx))
    }
}
