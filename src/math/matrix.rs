use rand::Rng;
use serde::{Serialize, Deserialize};

/// Dense row-major matrix of `f64`.
///
/// `rows` and `cols` are stored explicitly and re-checked against `data` by
/// `validate_shape`, so a deserialized matrix can never be silently ragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// He-style initialization, uniform flavor: each entry is drawn uniformly
    /// from [-1, 1] and scaled by `sqrt(2 / rows)`.
    ///
    /// Shape is (fan_in, fan_out) — `rows` is the fan-in (number of input
    /// connections), which is what keeps activation variance stable for a
    /// ReLU-family layer regardless of layer width.
    pub fn he_uniform<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let scale = (2.0 / rows as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = (rng.gen::<f64>() * 2.0 - 1.0) * scale;
            }
        }
        res
    }

    /// Checks that this matrix is exactly `rows × cols`, including that the
    /// backing storage agrees with the declared dimensions.
    ///
    /// `name` is included in the error message so callers can report which
    /// parameter failed (e.g. "weights1").
    pub fn validate_shape(&self, rows: usize, cols: usize, name: &str) -> Result<(), String> {
        if self.rows != rows || self.cols != cols {
            return Err(format!(
                "{} has shape {}x{}, expected {}x{}",
                name, self.rows, self.cols, rows, cols
            ));
        }
        if self.data.len() != rows {
            return Err(format!(
                "{} declares {} rows but stores {}",
                name, rows, self.data.len()
            ));
        }
        for (i, row) in self.data.iter().enumerate() {
            if row.len() != cols {
                return Err(format!(
                    "{} row {} has {} columns, expected {}",
                    name, i, row.len(), cols
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zeros_has_requested_shape() {
        let m = Matrix::zeros(3, 5);
        assert!(m.validate_shape(3, 5, "m").is_ok());
        assert!(m.data.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn he_uniform_entries_stay_within_scale() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::he_uniform(50, 8, &mut rng);
        let bound = (2.0 / 50.0_f64).sqrt();
        assert!(m.data.iter().flatten().all(|v| v.abs() <= bound));
    }

    #[test]
    fn validate_shape_rejects_ragged_data() {
        let mut m = Matrix::zeros(2, 3);
        m.data[1].pop();
        let err = m.validate_shape(2, 3, "w").unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn validate_shape_rejects_wrong_dimensions() {
        let m = Matrix::zeros(2, 3);
        assert!(m.validate_shape(3, 2, "w").is_err());
    }
}
