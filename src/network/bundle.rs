use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;
use crate::network::metadata::ModelMetadata;
use crate::network::params::NetworkParams;

/// Serializable snapshot of a trained model: the four parameter containers
/// plus the training metadata. This is the persistence payload — saving and
/// reloading a bundle then evaluating must reproduce the exact accuracy of
/// the in-memory model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub weights1: Matrix,
    pub weights2: Matrix,
    pub biases1: Vec<f64>,
    pub biases2: Vec<f64>,
    pub metadata: ModelMetadata,
}

impl ModelBundle {
    /// Snapshots a parameter set and its metadata into a bundle.
    pub fn new(params: &NetworkParams, metadata: &ModelMetadata) -> ModelBundle {
        ModelBundle {
            weights1: params.weights1.clone(),
            weights2: params.weights2.clone(),
            biases1: params.biases1.clone(),
            biases2: params.biases2.clone(),
            metadata: metadata.clone(),
        }
    }

    /// Turns a (possibly untrusted, e.g. uploaded) bundle back into a usable
    /// parameter set, validating every shape invariant first.
    pub fn into_parts(self) -> Result<(NetworkParams, ModelMetadata), String> {
        let params = NetworkParams {
            weights1: self.weights1,
            weights2: self.weights2,
            biases1: self.biases1,
            biases2: self.biases2,
        };
        params.validate()?;
        Ok((params, self.metadata))
    }

    /// Serializes the bundle to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a bundle from a JSON file previously written by
    /// `save_json`. Shape validation happens in `into_parts`, not here.
    pub fn load_json(path: &str) -> std::io::Result<ModelBundle> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_metadata() -> ModelMetadata {
        ModelMetadata {
            epochs: 3,
            learning_rate: 0.05,
            batch_size: 16,
            hidden_nodes: 16,
            trained_at: 1_700_000_000,
            accuracy: 0.91,
        }
    }

    #[test]
    fn bundle_round_trips_through_json() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        let bundle = ModelBundle::new(&params, &sample_metadata());

        let json = serde_json::to_string(&bundle).unwrap();
        let restored: ModelBundle = serde_json::from_str(&json).unwrap();
        let (restored_params, metadata) = restored.into_parts().unwrap();

        assert_eq!(restored_params, params);
        assert_eq!(metadata, sample_metadata());
    }

    #[test]
    fn into_parts_rejects_tampered_shapes() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = NetworkParams::init(16, &mut rng).unwrap();
        let mut bundle = ModelBundle::new(&params, &sample_metadata());
        bundle.biases2.pop();
        assert!(bundle.into_parts().is_err());
    }
}
