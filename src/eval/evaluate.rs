use rand::Rng;
use rand::seq::SliceRandom;

use crate::network::params::NetworkParams;

/// Default sample size for per-epoch subset evaluation — big enough for a
/// stable estimate, small enough to not slow the epoch down.
pub const EVAL_SAMPLE_SIZE: usize = 500;

fn check_dataset(images: &[Vec<f64>], labels: &[usize]) -> Result<(), String> {
    if images.is_empty() {
        return Err("cannot evaluate on an empty dataset".to_owned());
    }
    if images.len() != labels.len() {
        return Err(format!(
            "dataset misaligned: {} images vs {} labels",
            images.len(),
            labels.len()
        ));
    }
    Ok(())
}

/// Fraction of examples whose predicted class matches the label, over the
/// whole dataset. Always in [0, 1].
pub fn evaluate_accuracy(
    params: &NetworkParams,
    images: &[Vec<f64>],
    labels: &[usize],
) -> Result<f64, String> {
    check_dataset(images, labels)?;
    let mut correct = 0usize;
    for (image, &label) in images.iter().zip(labels.iter()) {
        if params.predict(image)? == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / images.len() as f64)
}

/// Accuracy on a random sample of `sample_size` distinct examples, drawn
/// without replacement. Used for cheap per-epoch feedback on large test
/// sets; `sample_size` is capped at the dataset size.
pub fn evaluate_on_subset<R: Rng>(
    params: &NetworkParams,
    images: &[Vec<f64>],
    labels: &[usize],
    sample_size: usize,
    rng: &mut R,
) -> Result<f64, String> {
    check_dataset(images, labels)?;
    if sample_size == 0 {
        return Err("sample_size must be at least 1".to_owned());
    }

    let mut indices: Vec<usize> = (0..images.len()).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size.min(images.len()));

    let mut correct = 0usize;
    for &i in &indices {
        if params.predict(&images[i])? == labels[i] {
            correct += 1;
        }
    }
    Ok(correct as f64 / indices.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::data::synthetic::synthetic_dataset;

    #[test]
    fn accuracy_stays_within_bounds_for_untrained_params() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        let (images, labels) = synthetic_dataset(5, &mut rng);
        let acc = evaluate_accuracy(&params, &images, &labels).unwrap();
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        assert!(evaluate_accuracy(&params, &[], &[]).is_err());
    }

    #[test]
    fn misaligned_dataset_is_an_error() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        let (images, mut labels) = synthetic_dataset(2, &mut rng);
        labels.pop();
        assert!(evaluate_accuracy(&params, &images, &labels).is_err());
    }

    #[test]
    fn oversized_sample_falls_back_to_full_scan() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        let (images, labels) = synthetic_dataset(3, &mut rng);

        let full = evaluate_accuracy(&params, &images, &labels).unwrap();
        let sampled =
            evaluate_on_subset(&params, &images, &labels, images.len() * 2, &mut rng).unwrap();
        assert!((full - sampled).abs() < 1e-12);
    }

    #[test]
    fn subset_accuracy_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        let (images, labels) = synthetic_dataset(10, &mut rng);
        let acc = evaluate_on_subset(&params, &images, &labels, 20, &mut rng).unwrap();
        assert!((0.0..=1.0).contains(&acc));
    }
}
