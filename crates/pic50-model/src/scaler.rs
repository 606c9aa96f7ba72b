//! Per-column standardisation fitted on training features.
//!
//! z = (x - mean) / std, with the population standard deviation. A column
//! with zero variance keeps scale 1 so it maps to a constant 0.

use serde::{Deserialize, Serialize};
use tracing::debug;

use pic50_common::{FeatureSchema, FeatureTable, PotencyError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    schema: FeatureSchema,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(table: &FeatureTable) -> Result<Self> {
        if table.is_empty() {
            return Err(PotencyError::Model("cannot fit a scaler on zero rows".to_string()));
        }
        let n = table.n_rows() as f64;
        let n_cols = table.n_cols();

        let mut means = vec![0.0; n_cols];
        for row in table.rows() {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0; n_cols];
        for row in table.rows() {
            for ((var, v), m) in variances.iter_mut().zip(row).zip(&means) {
                *var += (v - m).powi(2);
            }
        }

        let mut constant = 0usize;
        let scales = variances
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > 0.0 && std.is_finite() {
                    std
                } else {
                    constant += 1;
                    1.0
                }
            })
            .collect();

        debug!(
            "Fitted scaler on {} rows x {} columns ({} constant)",
            table.n_rows(),
            n_cols,
            constant
        );

        Ok(Self { schema: table.schema().clone(), means, scales })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Standardise `table`, which must carry the fitted schema exactly.
    pub fn transform(&self, table: &FeatureTable) -> Result<FeatureTable> {
        self.schema.check_matches(table.schema())?;
        Ok(table.map_rows(|row| {
            row.iter()
                .zip(self.means.iter().zip(&self.scales))
                .map(|(v, (m, s))| (v - m) / s)
                .collect()
        }))
    }

    pub fn fit_transform(table: &FeatureTable) -> Result<(Self, FeatureTable)> {
        let scaler = Self::fit(table)?;
        let scaled = scaler.transform(table)?;
        Ok((scaler, scaled))
    }
}
