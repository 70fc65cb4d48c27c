/// MNIST training demo.
///
/// Expects the four standard IDX files; pass a data directory as the first
/// argument, or place them under mnist_data/:
///   train-images-idx3-ubyte, train-labels-idx1-ubyte,
///   t10k-images-idx3-ubyte, t10k-labels-idx1-ubyte
///
/// Run with:
///   cargo run --example mnist --release -- [data_dir]

use graphite_nn::data::idx::load_idx_pair;
use graphite_nn::{train_model, ModelBundle, TrainConfig};

fn main() {
    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "mnist_data".to_owned());

    println!("Loading MNIST data from {}/ ...", data_dir);
    let (train_images, train_labels) = load_idx_pair(
        &format!("{}/train-images-idx3-ubyte", data_dir),
        &format!("{}/train-labels-idx1-ubyte", data_dir),
    )
    .unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(1);
    });
    let (test_images, test_labels) = load_idx_pair(
        &format!("{}/t10k-images-idx3-ubyte", data_dir),
        &format!("{}/t10k-labels-idx1-ubyte", data_dir),
    )
    .unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(1);
    });

    println!("  Training set: {} images", train_images.len());
    println!("  Test set:     {} images", test_images.len());

    let config = TrainConfig::default();
    println!(
        "\nTraining: {} epochs, lr = {}, batch = {}, hidden = {}",
        config.epochs, config.learning_rate, config.batch_size, config.hidden_size
    );
    println!("Per-epoch accuracy is estimated on a 500-image test sample.\n");

    println!("{:>6}  {:>12}  {:>10}  {:>8}", "Epoch", "Train loss", "Test acc", "Time");
    println!("{}", "-".repeat(44));

    let mut rng = rand::thread_rng();
    let model = train_model(
        &train_images,
        &train_labels,
        &test_images,
        &test_labels,
        &config,
        &mut rng,
        |stats| {
            println!(
                "{:>6}  {:>12.6}  {:>9.2}%  {:>6.1}s",
                stats.epoch,
                stats.train_loss,
                stats.accuracy * 100.0,
                stats.elapsed_ms as f64 / 1000.0
            );
        },
    )
    .unwrap_or_else(|e| {
        eprintln!("training failed: {}", e);
        std::process::exit(1);
    });

    println!(
        "\nFinal test accuracy (full {} images): {:.2}%",
        test_images.len(),
        model.metadata.accuracy * 100.0
    );

    let model_dir = "trained_models";
    let model_path = "trained_models/mnist.json";
    std::fs::create_dir_all(model_dir).expect("Failed to create model directory");
    ModelBundle::new(&model.params, &model.metadata)
        .save_json(model_path)
        .expect("Failed to save model");
    println!("Model saved to {}", model_path);
}
