use serde::{Serialize, Deserialize};

/// Per-epoch progress report passed to the training loop's progress
/// callback, exactly once per completed epoch. The studio serializes these
/// straight into SSE events to drive its live chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number, strictly increasing within a run.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean cross-entropy loss over all training samples in this epoch.
    pub train_loss: f64,
    /// Test-set accuracy in [0, 1] — a subset estimate while training, see
    /// `TrainConfig::eval_sample_size`.
    pub accuracy: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
