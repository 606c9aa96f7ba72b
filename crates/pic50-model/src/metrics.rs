//! Regression metrics on held-out predictions.

use serde::{Deserialize, Serialize};

use pic50_common::{PotencyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub n_samples: usize,
}

impl Evaluation {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        if y_true.is_empty() {
            return Err(PotencyError::Model("cannot evaluate zero predictions".to_string()));
        }
        if y_true.len() != y_pred.len() {
            return Err(PotencyError::Model(format!(
                "{} targets but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let n = y_true.len() as f64;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        for (t, p) in y_true.iter().zip(y_pred) {
            let err = t - p;
            abs_sum += err.abs();
            sq_sum += err * err;
        }
        let mae = abs_sum / n;
        let mse = sq_sum / n;

        let mean = y_true.iter().sum::<f64>() / n;
        let total: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
        // constant truth: perfect predictions score 1, anything else 0
        let r2 = if total == 0.0 {
            if sq_sum == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - sq_sum / total
        };

        Ok(Self { mae, mse, rmse: mse.sqrt(), r2, n_samples: y_true.len() })
    }

    /// Metric name and value pairs, in display order.
    pub fn as_pairs(&self) -> [(&'static str, f64); 4] {
        [
            ("Mean Absolute Error", self.mae),
            ("Mean Squared Error", self.mse),
            ("Root Mean Squared Error", self.rmse),
            ("R-squared (R2) Score", self.r2),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [4.5, 6.0, 7.25, 9.0];
        let e = Evaluation::compute(&y, &y).unwrap();
        assert_eq!((e.mae, e.mse, e.rmse, e.r2), (0.0, 0.0, 0.0, 1.0));
        assert_eq!(e.n_samples, 4);
    }

    #[test]
    fn test_known_values() {
        let e = Evaluation::compute(&[3.0, -0.5, 2.0, 7.0], &[2.5, 0.0, 2.0, 8.0]).unwrap();
        assert!((e.mae - 0.5).abs() < 1e-12);
        assert!((e.mse - 0.375).abs() < 1e-12);
        assert!((e.rmse - 0.375f64.sqrt()).abs() < 1e-12);
        assert!((e.r2 - 0.948_608_137_044_967_9).abs() < 1e-12);
    }

    #[test]
    fn test_mean_predictor_scores_zero_r2() {
        let e = Evaluation::compute(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]).unwrap();
        assert!(e.r2.abs() < 1e-12);
    }

    #[test]
    fn test_constant_truth() {
        assert_eq!(Evaluation::compute(&[5.0, 5.0], &[5.0, 5.0]).unwrap().r2, 1.0);
        assert_eq!(Evaluation::compute(&[5.0, 5.0], &[5.0, 6.0]).unwrap().r2, 0.0);
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(Evaluation::compute(&[], &[]).is_err());
        assert!(Evaluation::compute(&[1.0, 2.0], &[1.0]).is_err());
    }
}
