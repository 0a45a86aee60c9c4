//! Synthetic Weight Generators
//!
//! Random weight generation for checkpoint fixtures. Mirrors the role of
//! PyTorch's `randn` when building mock state dicts: shapes matter, values
//! do not.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{FixtureError, Result};
use crate::tensor::{element_count, Tensor};

/// Weight generator backed by its own RNG
///
/// Every call advances the RNG, so two tensors of the same shape drawn from
/// one generator hold different values.
///
/// # Example
///
/// ```rust
/// use fluxflow_fixtures::testing::generators::SyntheticWeightGenerator;
///
/// let mut gen = SyntheticWeightGenerator::new(42);
/// let weights = gen.randn(&[128, 64]).unwrap();
/// assert_eq!(weights.shape(), &[128, 64]);
/// assert_eq!(weights.size(), 128 * 64);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticWeightGenerator {
    rng: StdRng,
}

impl SyntheticWeightGenerator {
    /// Create generator with specific seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generate standard-normal F32 values (Box-Muller)
    ///
    /// # Errors
    ///
    /// Returns error if the shape is invalid or the buffer cannot be reserved.
    pub fn generate_normal(&mut self, shape: &[usize]) -> Result<Vec<f32>> {
        let n = element_count(shape)?;
        let mut values = reserve(n)?;

        while values.len() < n {
            // u1 in (0, 1] keeps ln() finite
            let u1: f32 = 1.0 - self.rng.gen::<f32>();
            let u2: f32 = self.rng.gen();
            let radius = (-2.0 * u1.ln()).sqrt();
            let theta = std::f32::consts::TAU * u2;

            values.push(radius * theta.cos());
            if values.len() < n {
                values.push(radius * theta.sin());
            }
        }

        Ok(values)
    }

    /// Standard-normal tensor of the given shape
    ///
    /// # Errors
    ///
    /// Returns error if the shape is invalid or the buffer cannot be reserved.
    pub fn randn(&mut self, shape: &[usize]) -> Result<Tensor<f32>> {
        let data = self.generate_normal(shape)?;
        Tensor::from_vec(shape.to_vec(), data)
    }
}

/// Reserve an exact-capacity buffer, surfacing allocator failure
fn reserve(elements: usize) -> Result<Vec<f32>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(elements)
        .map_err(|e| FixtureError::AllocationFailed {
            elements,
            reason: e.to_string(),
        })?;
    Ok(buf)
}
