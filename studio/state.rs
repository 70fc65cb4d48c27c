use std::sync::{Arc, Mutex, atomic::AtomicBool, mpsc};

use graphite_nn::{EpochStats, ModelMetadata, NetworkParams};

// ---------------------------------------------------------------------------
// Hyperparams
// ---------------------------------------------------------------------------

/// Training hyperparameters as last submitted through the Train form.
#[derive(Debug, Clone)]
pub struct Hyperparams {
    pub model_name: String,
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub hidden_size: usize,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams {
            model_name: "digits".to_owned(),
            epochs: 10,
            learning_rate: 0.05,
            batch_size: 32,
            hidden_size: 128,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Loaded digit dataset, already split into train / test sets.
#[derive(Debug, Clone)]
pub struct DatasetState {
    pub train_images: Vec<Vec<f64>>,
    pub train_labels: Vec<usize>,
    pub test_images: Vec<Vec<f64>>,
    pub test_labels: Vec<usize>,
    /// Short name displayed in the UI (e.g. "Synthetic digits" or file stems).
    pub source_name: String,
}

// ---------------------------------------------------------------------------
// Training status
// ---------------------------------------------------------------------------

pub enum TrainingStatus {
    /// No training has been started yet.
    Idle,
    /// Training is running in a background thread.
    Running {
        stop_flag: Arc<AtomicBool>,
        epoch_rx: Arc<Mutex<mpsc::Receiver<EpochStats>>>,
        total_epochs: usize,
    },
    /// Training completed (naturally or via Stop) and the model was saved.
    /// `was_stopped` is true when the user clicked Stop before all epochs
    /// finished; `accuracy` is the final full-test-set figure.
    Done {
        model_path: String,
        elapsed_total_ms: u64,
        was_stopped: bool,
        accuracy: f64,
    },
    /// Training failed with an error.
    Failed { reason: String },
}

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    /// Last-used training hyperparameters (pre-filled into the Train form).
    pub hyperparams: Hyperparams,
    /// Loaded dataset.
    pub dataset: Option<DatasetState>,
    /// Current training lifecycle state.
    pub training: TrainingStatus,
    /// History of all epoch stats from the most recent training run.
    pub epoch_history: Vec<EpochStats>,
    /// The trained model (available after training completes).
    pub trained: Option<(NetworkParams, ModelMetadata)>,
    /// One-shot flash message for the next page render.
    pub flash: Option<FlashMessage>,
}

impl StudioState {
    pub fn new() -> Self {
        StudioState {
            hyperparams: Hyperparams::default(),
            dataset: None,
            training: TrainingStatus::Idle,
            epoch_history: Vec::new(),
            trained: None,
            flash: None,
        }
    }

    /// Returns a bitmask encoding which tabs should be unlocked.
    ///
    /// Bit layout:
    /// - bit 0 (Dataset) — always set
    /// - bit 1 (Train)   — a dataset is loaded
    /// - bit 2 (Test)    — always set (saved models can be tested any time)
    pub fn tab_unlock_mask(&self) -> u8 {
        let mut mask: u8 = 0b101;
        if self.dataset.is_some() {
            mask |= 0b010;
        }
        mask
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// Shared state type — an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;
