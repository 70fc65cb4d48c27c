pub mod math;
pub mod activation;
pub mod network;
pub mod loss;
pub mod train;
pub mod eval;
pub mod data;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use network::params::{NetworkParams, INPUT_SIZE, OUTPUT_SIZE};
pub use network::forward::{ForwardPass, Prediction};
pub use network::metadata::ModelMetadata;
pub use network::bundle::ModelBundle;
pub use loss::cross_entropy::CrossEntropyLoss;
pub use train::train_config::TrainConfig;
pub use train::epoch_stats::EpochStats;
pub use train::batch::train_batch;
pub use train::loop_fn::{train_model, train_with_params, TrainReport, TrainedModel};
pub use eval::evaluate::{evaluate_accuracy, evaluate_on_subset};
