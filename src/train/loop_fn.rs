use std::sync::atomic::Ordering;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::eval::evaluate::{evaluate_accuracy, evaluate_on_subset};
use crate::network::metadata::ModelMetadata;
use crate::network::params::NetworkParams;
use crate::train::batch::train_batch;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Final parameters and their training record, returned by `train_model`.
#[derive(Debug)]
pub struct TrainedModel {
    pub params: NetworkParams,
    pub metadata: ModelMetadata,
}

/// Outcome of `train_with_params`: how many epochs actually completed (fewer
/// than requested after a cooperative stop) and the definitive accuracy from
/// the closing full-test-set scan.
pub struct TrainReport {
    pub epochs_completed: usize,
    pub accuracy: f64,
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains a fresh model: initializes a new parameter set from
/// `config.hidden_size`, runs the epoch loop, and packages the result with
/// its metadata. Each call starts from scratch — to continue training a
/// loaded model, call `train_with_params` with that parameter set instead.
///
/// `on_progress` is invoked exactly once per completed epoch, with epoch
/// numbers starting at 1 and strictly increasing. It runs synchronously on
/// the training thread; hosts that need a responsive UI run this function on
/// a worker thread and forward the stats through a channel.
pub fn train_model<R, F>(
    train_images: &[Vec<f64>],
    train_labels: &[usize],
    test_images: &[Vec<f64>],
    test_labels: &[usize],
    config: &TrainConfig,
    rng: &mut R,
    on_progress: F,
) -> Result<TrainedModel, String>
where
    R: Rng,
    F: FnMut(&EpochStats),
{
    let mut params = NetworkParams::init(config.hidden_size, rng)?;
    let report = train_with_params(
        &mut params,
        train_images,
        train_labels,
        test_images,
        test_labels,
        config,
        rng,
        on_progress,
    )?;

    let metadata = ModelMetadata {
        epochs: report.epochs_completed,
        learning_rate: config.learning_rate,
        batch_size: config.batch_size,
        hidden_nodes: config.hidden_size,
        trained_at: unix_now(),
        accuracy: report.accuracy,
    };
    Ok(TrainedModel { params, metadata })
}

/// The epoch loop against an existing parameter set, mutated in place.
///
/// Per epoch: Fisher–Yates shuffle of the example order, contiguous
/// mini-batches (the tail batch may be smaller), one `train_batch` call per
/// batch, then a test-set accuracy estimate and one progress callback.
/// After the last epoch a full test-set scan produces the returned accuracy.
///
/// An optional `config.stop_flag` is honored at epoch boundaries; stopping
/// early is not an error. On `Err` the parameters are left as last mutated —
/// there is no rollback across epochs.
pub fn train_with_params<R, F>(
    params: &mut NetworkParams,
    train_images: &[Vec<f64>],
    train_labels: &[usize],
    test_images: &[Vec<f64>],
    test_labels: &[usize],
    config: &TrainConfig,
    rng: &mut R,
    mut on_progress: F,
) -> Result<TrainReport, String>
where
    R: Rng,
    F: FnMut(&EpochStats),
{
    if train_images.is_empty() {
        return Err("training set is empty".to_owned());
    }
    if train_images.len() != train_labels.len() {
        return Err(format!(
            "training set misaligned: {} images vs {} labels",
            train_images.len(),
            train_labels.len()
        ));
    }
    if test_images.is_empty() {
        return Err("test set is empty".to_owned());
    }
    if test_images.len() != test_labels.len() {
        return Err(format!(
            "test set misaligned: {} images vs {} labels",
            test_images.len(),
            test_labels.len()
        ));
    }
    if config.batch_size == 0 {
        return Err("batch_size must be at least 1".to_owned());
    }
    params.validate()?;

    let n = train_images.len();
    let mut epochs_completed = 0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();

        // New example order every epoch.
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);

        let mut loss_sum = 0.0;
        for chunk in indices.chunks(config.batch_size) {
            let batch_images: Vec<&[f64]> =
                chunk.iter().map(|&i| train_images[i].as_slice()).collect();
            let batch_labels: Vec<usize> = chunk.iter().map(|&i| train_labels[i]).collect();

            let batch_loss = train_batch(
                params,
                &batch_images,
                &batch_labels,
                config.learning_rate,
                config.l2_lambda,
                config.dropout_rate,
                rng,
            )?;
            loss_sum += batch_loss * chunk.len() as f64;
        }

        let accuracy = match config.eval_sample_size {
            Some(k) if k < test_images.len() => {
                evaluate_on_subset(params, test_images, test_labels, k, rng)?
            }
            _ => evaluate_accuracy(params, test_images, test_labels)?,
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss: loss_sum / n as f64,
            accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        on_progress(&stats);
        epochs_completed = epoch;

        // Check again after the (possibly expensive) evaluation.
        if stop_requested(config) {
            break;
        }
    }

    // The definitive figure always scans the whole test set.
    let accuracy = evaluate_accuracy(params, test_images, test_labels)?;
    Ok(TrainReport {
        epochs_completed,
        accuracy,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
