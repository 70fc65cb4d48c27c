use rand::Rng;

use crate::activation::activation::{leaky_relu, softmax_with_temperature};
use crate::network::params::{NetworkParams, INPUT_SIZE, OUTPUT_SIZE};

/// Floor added to the standard deviation so a constant input (blank image)
/// does not divide by zero.
const STD_EPSILON: f64 = 1e-6;

/// Temperature used when turning logits into displayed confidence scores.
/// Above 1.0 the distribution flattens, so the reported confidence is less
/// spiky than the raw softmax. Training never applies a temperature.
pub const CONFIDENCE_TEMPERATURE: f64 = 2.0;

/// Result of one forward pass.
///
/// `standardized` is the input after per-image standardization — gradient
/// accumulation has to use it (not the raw pixels) so the weight updates
/// match what the hidden layer actually saw. `hidden` is post-dropout when
/// the pass ran in training mode. `logits` are raw pre-softmax outputs.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    pub standardized: Vec<f64>,
    pub hidden: Vec<f64>,
    pub logits: Vec<f64>,
}

/// A classified digit plus the full 10-class confidence distribution.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub digit: usize,
    pub confidence: Vec<f64>,
}

/// Standardizes one image to zero mean and unit variance (population std,
/// epsilon-floored). This absorbs ink-density differences between stored
/// dataset images and freshly drawn ones.
fn standardize(input: &[f64]) -> Vec<f64> {
    let n = input.len() as f64;
    let mean = input.iter().sum::<f64>() / n;
    let variance = input.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let std = variance.sqrt() + STD_EPSILON;
    input.iter().map(|&x| (x - mean) / std).collect()
}

impl NetworkParams {
    fn check_input(&self, input: &[f64]) -> Result<(), String> {
        if input.len() != INPUT_SIZE {
            return Err(format!(
                "input has length {}, expected {} (28x28 pixels)",
                input.len(),
                INPUT_SIZE
            ));
        }
        Ok(())
    }

    /// Inference-mode forward pass: standardize, hidden layer with Leaky
    /// ReLU, raw output logits. No dropout, ever.
    pub fn forward(&self, input: &[f64]) -> Result<ForwardPass, String> {
        self.check_input(input)?;
        Ok(self.run_forward::<rand::rngs::ThreadRng>(input, None))
    }

    /// Training-mode forward pass: same as `forward` but applies inverted
    /// dropout to the hidden activations. Dropped units are zeroed with
    /// probability `dropout_rate`; survivors are scaled by `1/(1-rate)` so
    /// the expected activation magnitude is unchanged.
    pub fn forward_training<R: Rng>(
        &self,
        input: &[f64],
        dropout_rate: f64,
        rng: &mut R,
    ) -> Result<ForwardPass, String> {
        self.check_input(input)?;
        assert!(
            (0.0..1.0).contains(&dropout_rate),
            "dropout_rate must be in [0, 1), got {}",
            dropout_rate
        );
        if dropout_rate == 0.0 {
            return Ok(self.run_forward::<R>(input, None));
        }
        Ok(self.run_forward(input, Some((dropout_rate, rng))))
    }

    fn run_forward<R: Rng>(&self, input: &[f64], dropout: Option<(f64, &mut R)>) -> ForwardPass {
        let standardized = standardize(input);
        let hidden_size = self.hidden_size();

        let mut hidden = vec![0.0; hidden_size];
        for j in 0..hidden_size {
            let mut sum = self.biases1[j];
            for i in 0..INPUT_SIZE {
                sum += standardized[i] * self.weights1.data[i][j];
            }
            hidden[j] = leaky_relu(sum);
        }

        if let Some((rate, rng)) = dropout {
            let keep_scale = 1.0 / (1.0 - rate);
            for unit in hidden.iter_mut() {
                if rng.gen::<f64>() < rate {
                    *unit = 0.0;
                } else {
                    *unit *= keep_scale;
                }
            }
        }

        let mut logits = vec![0.0; OUTPUT_SIZE];
        for k in 0..OUTPUT_SIZE {
            let mut sum = self.biases2[k];
            for j in 0..hidden_size {
                sum += hidden[j] * self.weights2.data[j][k];
            }
            logits[k] = sum;
        }

        ForwardPass {
            standardized,
            hidden,
            logits,
        }
    }

    /// Classifies one image: inference forward pass, temperature softmax,
    /// argmax. Ties go to the lowest class index.
    pub fn predict(&self, input: &[f64]) -> Result<usize, String> {
        Ok(self.predict_with_confidence(input)?.digit)
    }

    /// Like `predict`, but also returns the full confidence distribution so
    /// callers can display per-class scores.
    pub fn predict_with_confidence(&self, input: &[f64]) -> Result<Prediction, String> {
        let pass = self.forward(input)?;
        let confidence = softmax_with_temperature(&pass.logits, CONFIDENCE_TEMPERATURE);
        Ok(Prediction {
            digit: argmax(&confidence),
            confidence,
        })
    }
}

/// Index of the first maximum in a non-empty slice.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
