use std::sync::{Arc, atomic::AtomicBool};

use crate::eval::evaluate::EVAL_SAMPLE_SIZE;

/// Hyperparameters and host hooks for a `train_model` run.
///
/// # Fields
/// - `epochs`           — full passes over the training data
/// - `learning_rate`    — SGD step size
/// - `batch_size`       — samples per mini-batch, must be ≥ 1
/// - `hidden_size`      — hidden units for the fresh parameter set
/// - `l2_lambda`        — weight-decay strength; applied to both weight
///                        matrices, never to biases
/// - `dropout_rate`     — hidden-layer dropout during training forwards
/// - `eval_sample_size` — when `Some(k)` and the test set is larger than
///                        `k`, per-epoch accuracy is estimated on a random
///                        `k`-sample; the final accuracy always scans the
///                        full set
/// - `stop_flag`        — optional atomic flag; when set to `true` from
///                        another thread the loop stops at the next epoch
///                        boundary
#[derive(Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub hidden_size: usize,
    pub l2_lambda: f64,
    pub dropout_rate: f64,
    pub eval_sample_size: Option<usize>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Config with the given run shape and default regularization settings.
    pub fn new(epochs: usize, learning_rate: f64, batch_size: usize, hidden_size: usize) -> Self {
        TrainConfig {
            epochs,
            learning_rate,
            batch_size,
            hidden_size,
            ..TrainConfig::default()
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 10,
            learning_rate: 0.05,
            batch_size: 32,
            hidden_size: 128,
            l2_lambda: 1e-4,
            dropout_rate: 0.3,
            eval_sample_size: Some(EVAL_SAMPLE_SIZE),
            stop_flag: None,
        }
    }
}
