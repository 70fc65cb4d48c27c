/// Categorical cross-entropy against a single integer class label, for use
/// with softmax output probabilities.
pub struct CrossEntropyLoss;

/// Floor added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-10;

impl CrossEntropyLoss {
    /// Scalar loss for one example: `-ln(p[label] + eps)`.
    ///
    /// `probabilities` — softmax output, one entry per class
    /// `label`         — true class index, must be < probabilities.len()
    pub fn loss(probabilities: &[f64], label: usize) -> f64 {
        -(probabilities[label] + EPS).ln()
    }

    /// Gradient of the combined softmax + cross-entropy w.r.t. the
    /// pre-softmax logits:
    ///   ∂L/∂z_k = p_k - 1{k == label}
    ///
    /// This is the initial delta of the backward pass; the softmax Jacobian
    /// must not be applied again on top of it.
    pub fn output_error(probabilities: &[f64], label: usize) -> Vec<f64> {
        probabilities
            .iter()
            .enumerate()
            .map(|(k, &p)| if k == label { p - 1.0 } else { p })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_is_low_when_confident_and_correct() {
        let confident = CrossEntropyLoss::loss(&[0.01, 0.98, 0.01], 1);
        let uncertain = CrossEntropyLoss::loss(&[0.4, 0.3, 0.3], 1);
        assert!(confident < uncertain);
        assert!(confident > 0.0);
    }

    #[test]
    fn loss_is_finite_for_zero_probability() {
        let l = CrossEntropyLoss::loss(&[1.0, 0.0], 1);
        assert!(l.is_finite());
    }

    #[test]
    fn output_error_subtracts_one_hot_target() {
        let err = CrossEntropyLoss::output_error(&[0.2, 0.7, 0.1], 1);
        assert!((err[0] - 0.2).abs() < 1e-12);
        assert!((err[1] + 0.3).abs() < 1e-12);
        assert!((err[2] - 0.1).abs() < 1e-12);
        // Errors over a distribution sum to zero.
        let sum: f64 = err.iter().sum();
        assert!(sum.abs() < 1e-12);
    }
}
