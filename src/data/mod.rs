pub mod idx;
pub mod synthetic;

pub use idx::{parse_idx_images, parse_idx_labels, load_idx_pair};
pub use synthetic::{synthetic_digit, synthetic_dataset};
