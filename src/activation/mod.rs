pub mod activation;

pub use activation::{leaky_relu, leaky_relu_slope, softmax, softmax_with_temperature};
