/// Negative-side slope of the Leaky ReLU. Small enough to keep the hidden
/// layer close to plain ReLU, nonzero so saturated units still learn.
pub const LEAKY_SLOPE: f64 = 0.01;

/// Leaky ReLU: identity for positive inputs, `LEAKY_SLOPE * x` otherwise.
pub fn leaky_relu(x: f64) -> f64 {
    if x > 0.0 { x } else { LEAKY_SLOPE * x }
}

/// Derivative of `leaky_relu`, taken from the sign of the activation value.
/// For a Leaky ReLU the activation and pre-activation always share a sign,
/// so testing the activation is equivalent and saves carrying `z` around.
pub fn leaky_relu_slope(activation: f64) -> f64 {
    if activation > 0.0 { 1.0 } else { LEAKY_SLOPE }
}

/// Softmax with max-subtraction: for any finite logits the exponent argument
/// is ≤ 0, so the result is finite, non-negative, and sums to 1.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

/// Softmax of `logits / temperature`. Temperatures above 1 flatten the
/// distribution; used to soften displayed confidence scores.
pub fn softmax_with_temperature(logits: &[f64], temperature: f64) -> Vec<f64> {
    let scaled: Vec<f64> = logits.iter().map(|&x| x / temperature).collect();
    softmax(&scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaky_relu_passes_positive_and_scales_negative() {
        assert_eq!(leaky_relu(2.5), 2.5);
        assert_eq!(leaky_relu(-2.0), -0.02);
        assert_eq!(leaky_relu_slope(1.0), 1.0);
        assert_eq!(leaky_relu_slope(-0.5), LEAKY_SLOPE);
    }

    #[test]
    fn softmax_is_a_probability_distribution() {
        let p = softmax(&[1.0, 2.0, 3.0, -4.0]);
        assert!(p.iter().all(|&v| v >= 0.0));
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn softmax_survives_large_logits() {
        let p = softmax(&[1000.0, 1001.0, 999.0]);
        assert!(p.iter().all(|v| v.is_finite()));
        assert!(p[1] > p[0] && p[0] > p[2]);
    }

    #[test]
    fn temperature_flattens_the_distribution() {
        let sharp = softmax(&[0.0, 4.0]);
        let soft = softmax_with_temperature(&[0.0, 4.0], 2.0);
        assert!(soft[1] < sharp[1]);
        assert!(soft[1] > 0.5);
    }

    #[test]
    fn softmax_preserves_order() {
        let p = softmax(&[0.3, -1.0, 2.0]);
        assert!(p[2] > p[0] && p[0] > p[1]);
    }
}
