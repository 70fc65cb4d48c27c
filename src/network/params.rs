use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// Input dimension: one value per pixel of a 28×28 grayscale image.
pub const INPUT_SIZE: usize = 784;
/// Output dimension: one logit per digit class 0–9.
pub const OUTPUT_SIZE: usize = 10;

/// Biases start at a small positive constant instead of zero so hidden units
/// are active from the first forward pass.
const BIAS_INIT: f64 = 0.01;

/// The full parameter set of the two-layer network.
///
/// A `NetworkParams` is the single owner of the weights during a training
/// session; every engine call borrows it explicitly. Construction and
/// deserialization both go through shape validation, so any reachable value
/// satisfies: weights1 is 784×H, weights2 is H×10, biases1 has length H,
/// biases2 has length 10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub weights1: Matrix,
    pub weights2: Matrix,
    pub biases1: Vec<f64>,
    pub biases2: Vec<f64>,
}

impl NetworkParams {
    /// Creates a freshly initialized parameter set with `hidden_size` hidden
    /// units. Weight entries are He-scaled uniform draws (see
    /// `Matrix::he_uniform`); biases start at `BIAS_INIT`.
    ///
    /// Returns an error when `hidden_size` is zero. Never mutates or reuses
    /// a previously returned set.
    pub fn init<R: Rng>(hidden_size: usize, rng: &mut R) -> Result<NetworkParams, String> {
        if hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_owned());
        }
        Ok(NetworkParams {
            weights1: Matrix::he_uniform(INPUT_SIZE, hidden_size, rng),
            weights2: Matrix::he_uniform(hidden_size, OUTPUT_SIZE, rng),
            biases1: vec![BIAS_INIT; hidden_size],
            biases2: vec![BIAS_INIT; OUTPUT_SIZE],
        })
    }

    /// Number of hidden units, read from the stored weight shapes.
    pub fn hidden_size(&self) -> usize {
        self.weights1.cols
    }

    /// Re-checks every shape invariant. Called on every path that can hand
    /// back a parameter set whose storage the engine did not build itself
    /// (deserialization, imported bundles).
    pub fn validate(&self) -> Result<(), String> {
        let hidden = self.weights1.cols;
        if hidden == 0 {
            return Err("weights1 has zero hidden units".to_owned());
        }
        self.weights1.validate_shape(INPUT_SIZE, hidden, "weights1")?;
        self.weights2.validate_shape(hidden, OUTPUT_SIZE, "weights2")?;
        if self.biases1.len() != hidden {
            return Err(format!(
                "biases1 has length {}, expected {}",
                self.biases1.len(),
                hidden
            ));
        }
        if self.biases2.len() != OUTPUT_SIZE {
            return Err(format!(
                "biases2 has length {}, expected {}",
                self.biases2.len(),
                OUTPUT_SIZE
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn init_produces_valid_shapes_for_observed_hidden_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        for hidden in [32, 128, 256] {
            let params = NetworkParams::init(hidden, &mut rng).unwrap();
            assert!(params.validate().is_ok());
            assert_eq!(params.hidden_size(), hidden);
            assert_eq!(params.weights1.rows, INPUT_SIZE);
            assert_eq!(params.weights2.cols, OUTPUT_SIZE);
        }
    }

    #[test]
    fn init_rejects_zero_hidden_size() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(NetworkParams::init(0, &mut rng).is_err());
    }

    #[test]
    fn biases_start_at_small_positive_constant() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        assert!(params.biases1.iter().all(|&b| b == BIAS_INIT));
        assert!(params.biases2.iter().all(|&b| b == BIAS_INIT));
    }

    #[test]
    fn each_init_returns_fresh_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = NetworkParams::init(16, &mut rng).unwrap();
        let b = NetworkParams::init(16, &mut rng).unwrap();
        assert_ne!(a.weights1, b.weights1);
    }

    #[test]
    fn validate_catches_mismatched_bias_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut params = NetworkParams::init(16, &mut rng).unwrap();
        params.biases1.push(0.0);
        assert!(params.validate().is_err());
    }
}
