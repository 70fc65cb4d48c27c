pub mod evaluate;

pub use evaluate::{evaluate_accuracy, evaluate_on_subset, EVAL_SAMPLE_SIZE};
