/// End-to-end demo on procedurally generated digits.
///
/// Trains a small network on synthetic 28×28 digit images, reports per-epoch
/// progress, saves the model bundle, reloads it, and checks the round-trip
/// accuracy matches before classifying a few samples.
///
/// Run with:
///   cargo run --example synthetic --release

use graphite_nn::data::synthetic::{synthetic_dataset, synthetic_digit};
use graphite_nn::{evaluate_accuracy, train_model, ModelBundle, TrainConfig};

fn main() {
    let mut rng = rand::thread_rng();

    println!("Generating synthetic digit data...");
    let (train_images, train_labels) = synthetic_dataset(100, &mut rng);
    let (test_images, test_labels) = synthetic_dataset(20, &mut rng);
    println!(
        "  Training set: {} images ({} per digit)",
        train_images.len(),
        train_images.len() / 10
    );
    println!(
        "  Test set:     {} images ({} per digit)",
        test_images.len(),
        test_images.len() / 10
    );

    let config = TrainConfig::new(10, 0.05, 32, 64);

    println!("\nNetwork: 784 -> {} (Leaky ReLU) -> 10 (softmax)", config.hidden_size);
    println!(
        "Training: {} epochs, lr = {}, batch = {}, dropout = {}, l2 = {}\n",
        config.epochs, config.learning_rate, config.batch_size, config.dropout_rate, config.l2_lambda
    );

    println!("{:>6}  {:>12}  {:>10}  {:>8}", "Epoch", "Train loss", "Test acc", "Time");
    println!("{}", "-".repeat(44));

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
    .expect("training failed");

    println!("\nFinal test accuracy: {:.2}%", model.metadata.accuracy * 100.0);

    // Save, reload, and verify the persistence round trip.
    let model_dir = "trained_models";
    let model_path = "trained_models/synthetic.json";
    std::fs::create_dir_all(model_dir).expect("Failed to create model directory");
    ModelBundle::new(&model.params, &model.metadata)
        .save_json(model_path)
        .expect("Failed to save model");
    println!("Model saved to {}", model_path);

    let (restored, _metadata) = ModelBundle::load_json(model_path)
        .expect("Failed to reload model")
        .into_parts()
        .expect("Reloaded bundle has invalid shapes");
    let reloaded_accuracy = evaluate_accuracy(&restored, &test_images, &test_labels)
        .expect("evaluation failed");
    assert_eq!(
        reloaded_accuracy, model.metadata.accuracy,
        "round-trip accuracy drifted"
    );
    println!("Reloaded model reproduces the accuracy exactly.");

    println!("\nSample predictions:");
    println!("{:>10}  {:>10}  {:>10}", "True", "Predicted", "Confidence");
    for digit in 0..10 {
        let image = synthetic_digit(digit, &mut rng);
        let prediction = restored.predict_with_confidence(&image).expect("prediction failed");
        println!(
            "{:>10}  {:>10}  {:>9.1}%",
            digit,
            prediction.digit,
            prediction.confidence[prediction.digit] * 100.0
        );
    }
}
