use rand::Rng;

use crate::activation::activation::leaky_relu_slope;
use crate::activation::activation::softmax;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::params::{NetworkParams, INPUT_SIZE, OUTPUT_SIZE};

/// Runs one mini-batch update: accumulates the softmax-cross-entropy
/// gradients of every example, then applies a single L2-regularized
/// gradient-descent step scaled by `learning_rate / batch_size`.
///
/// Weight decay applies to both weight matrices; biases are updated without
/// it. `params` is mutated in place. Returns the mean cross-entropy loss of
/// the batch, which is diagnostic only.
///
/// Errors on an empty batch, a length mismatch between `images` and
/// `labels`, an out-of-range label, or a malformed image.
pub fn train_batch<R: Rng>(
    params: &mut NetworkParams,
    images: &[&[f64]],
    labels: &[usize],
    learning_rate: f64,
    l2_lambda: f64,
    dropout_rate: f64,
    rng: &mut R,
) -> Result<f64, String> {
    if images.is_empty() {
        return Err("cannot train on an empty batch".to_owned());
    }
    if images.len() != labels.len() {
        return Err(format!(
            "batch misaligned: {} images vs {} labels",
            images.len(),
            labels.len()
        ));
    }

    let hidden_size = params.hidden_size();
    let mut dw1 = Matrix::zeros(INPUT_SIZE, hidden_size);
    let mut dw2 = Matrix::zeros(hidden_size, OUTPUT_SIZE);
    let mut db1 = vec![0.0; hidden_size];
    let mut db2 = vec![0.0; OUTPUT_SIZE];
    let mut batch_loss = 0.0;

    for (&image, &label) in images.iter().zip(labels.iter()) {
        if label >= OUTPUT_SIZE {
            return Err(format!("label {} out of range 0-9", label));
        }

        let pass = params.forward_training(image, dropout_rate, rng)?;
        let probabilities = softmax(&pass.logits);
        batch_loss += CrossEntropyLoss::loss(&probabilities, label);

        let output_error = CrossEntropyLoss::output_error(&probabilities, label);

        // Backpropagate through weights2, then through the Leaky ReLU.
        // Units zeroed by dropout carry no activation, so their weights2
        // contribution below is zero as well.
        let mut hidden_error = vec![0.0; hidden_size];
        for j in 0..hidden_size {
            let mut err = 0.0;
            for k in 0..OUTPUT_SIZE {
                err += output_error[k] * params.weights2.data[j][k];
            }
            hidden_error[j] = err * leaky_relu_slope(pass.hidden[j]);
        }

        // Accumulate additively; averaging happens once at update time.
        for j in 0..hidden_size {
            for k in 0..OUTPUT_SIZE {
                dw2.data[j][k] += pass.hidden[j] * output_error[k];
            }
            db1[j] += hidden_error[j];
        }
        for k in 0..OUTPUT_SIZE {
            db2[k] += output_error[k];
        }
        for i in 0..INPUT_SIZE {
            let x = pass.standardized[i];
            for j in 0..hidden_size {
                dw1.data[i][j] += x * hidden_error[j];
            }
        }
    }

    let scale = learning_rate / images.len() as f64;
    for i in 0..INPUT_SIZE {
        for j in 0..hidden_size {
            let w = params.weights1.data[i][j];
            params.weights1.data[i][j] = w - scale * (dw1.data[i][j] + l2_lambda * w);
        }
    }
    for j in 0..hidden_size {
        for k in 0..OUTPUT_SIZE {
            let w = params.weights2.data[j][k];
            params.weights2.data[j][k] = w - scale * (dw2.data[j][k] + l2_lambda * w);
        }
    }
    for j in 0..hidden_size {
        params.biases1[j] -= scale * db1[j];
    }
    for k in 0..OUTPUT_SIZE {
        params.biases2[k] -= scale * db2[k];
    }

    Ok(batch_loss / images.len() as f64)
}
