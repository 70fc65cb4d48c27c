//! End-to-end training behavior: reproducibility, convergence on easy data,
//! progress reporting, cooperative stopping, and persistence round-trips.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;

use graphite_nn::data::synthetic::{synthetic_dataset, synthetic_digit};
use graphite_nn::{evaluate_accuracy, train_model, ModelBundle, TrainConfig};

fn small_config() -> TrainConfig {
    let mut config = TrainConfig::new(2, 0.05, 8, 16);
    config.eval_sample_size = None;
    config
}

#[test]
fn fixed_seed_reproduces_identical_parameters() {
    let mut data_rng = StdRng::seed_from_u64(1000);
    let (train_images, train_labels) = synthetic_dataset(5, &mut data_rng);
    let (test_images, test_labels) = synthetic_dataset(2, &mut data_rng);
    let config = small_config();

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        train_model(
            &train_images,
            &train_labels,
            &test_images,
            &test_labels,
            &config,
            &mut rng,
            |_| {},
        )
        .unwrap()
    };

    let a = run(99);
    let b = run(99);
    assert_eq!(a.params, b.params, "same seed must give identical weights");
    assert_eq!(a.metadata.accuracy, b.metadata.accuracy);

    let c = run(7);
    assert_ne!(a.params, c.params, "different seeds should diverge");
}

#[test]
fn training_separates_two_easy_classes() {
    // Two visually distinct digits; a correct backward pass must drive
    // training-set accuracy to 1.0.
    let mut data_rng = StdRng::seed_from_u64(2000);
    let mut images = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..40 {
        images.push(synthetic_digit(0, &mut data_rng));
        labels.push(0);
        images.push(synthetic_digit(1, &mut data_rng));
        labels.push(1);
    }

    let mut config = TrainConfig::new(20, 0.1, 8, 16);
    config.dropout_rate = 0.0;
    config.eval_sample_size = None;

    let mut rng = StdRng::seed_from_u64(3);
    let model = train_model(&images, &labels, &images, &labels, &config, &mut rng, |_| {}).unwrap();

    assert_eq!(model.metadata.accuracy, 1.0);
}

#[test]
fn end_to_end_scenario_reports_progress_and_round_trips() {
    let mut data_rng = StdRng::seed_from_u64(3000);
    let (train_images, train_labels) = synthetic_dataset(30, &mut data_rng);
    let (test_images, test_labels) = synthetic_dataset(10, &mut data_rng);
    assert_eq!(train_images.len(), 300);
    assert_eq!(test_images.len(), 100);

    let config = TrainConfig::new(3, 0.05, 16, 32);

    let mut seen_epochs = Vec::new();
    let mut rng = StdRng::seed_from_u64(5);
    let model = train_model(
        &train_images,
        &train_labels,
        &test_images,
        &test_labels,
        &config,
        &mut rng,
        |stats| {
            seen_epochs.push(stats.epoch);
            assert_eq!(stats.total_epochs, 3);
            assert!((0.0..=1.0).contains(&stats.accuracy));
        },
    )
    .unwrap();

    // Exactly one callback per epoch, in order.
    assert_eq!(seen_epochs, vec![1, 2, 3]);
    assert_eq!(model.metadata.epochs, 3);
    assert_eq!(model.metadata.hidden_nodes, 32);
    assert!((0.0..=1.0).contains(&model.metadata.accuracy));

    // Export, re-import, and re-evaluate: the persisted bundle must
    // reproduce the exact accuracy figure.
    let path = std::env::temp_dir().join("graphite_nn_roundtrip_test.json");
    let path = path.to_str().unwrap().to_owned();
    ModelBundle::new(&model.params, &model.metadata)
        .save_json(&path)
        .unwrap();
    let (restored, metadata) = ModelBundle::load_json(&path).unwrap().into_parts().unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(restored, model.params);
    let reloaded_accuracy = evaluate_accuracy(&restored, &test_images, &test_labels).unwrap();
    assert_eq!(reloaded_accuracy, metadata.accuracy);
}

#[test]
fn stop_flag_halts_at_the_epoch_boundary() {
    let mut data_rng = StdRng::seed_from_u64(4000);
    let (train_images, train_labels) = synthetic_dataset(5, &mut data_rng);
    let (test_images, test_labels) = synthetic_dataset(2, &mut data_rng);

    let stop_flag = Arc::new(AtomicBool::new(false));
    let mut config = small_config();
    config.epochs = 10;
    config.stop_flag = Some(stop_flag.clone());

    let mut rng = StdRng::seed_from_u64(6);
    let flag_in_callback = stop_flag.clone();
    let model = train_model(
        &train_images,
        &train_labels,
        &test_images,
        &test_labels,
        &config,
        &mut rng,
        |stats| {
            if stats.epoch == 2 {
                flag_in_callback.store(true, Ordering::Relaxed);
            }
        },
    )
    .unwrap();

    assert_eq!(model.metadata.epochs, 2);
}

#[test]
fn empty_training_set_fails_cleanly() {
    let mut data_rng = StdRng::seed_from_u64(5000);
    let (test_images, test_labels) = synthetic_dataset(2, &mut data_rng);

    let mut rng = StdRng::seed_from_u64(8);
    let err = train_model(&[], &[], &test_images, &test_labels, &small_config(), &mut rng, |_| {})
        .unwrap_err();
    assert!(err.contains("empty"));
}
