pub mod batch;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use batch::train_batch;
pub use epoch_stats::EpochStats;
pub use train_config::TrainConfig;
pub use loop_fn::{train_model, train_with_params, TrainReport, TrainedModel};
