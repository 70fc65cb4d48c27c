use serde::{Serialize, Deserialize};

/// Training record stored next to the parameters in a saved model.
///
/// Purely descriptive — the engine never reads these fields back; they exist
/// so a loaded model can be displayed and reproduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Completed epochs (may be fewer than requested after a stop).
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub hidden_nodes: usize,
    /// Unix timestamp (seconds) of when training finished.
    pub trained_at: u64,
    /// Final full-test-set accuracy in [0, 1].
    pub accuracy: f64,
}
