pub mod params;
pub mod forward;
pub mod metadata;
pub mod bundle;

pub use params::{NetworkParams, INPUT_SIZE, OUTPUT_SIZE};
pub use forward::{ForwardPass, Prediction};
pub use metadata::ModelMetadata;
pub use bundle::ModelBundle;
