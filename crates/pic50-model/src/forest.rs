//! Random forest regressor: bagged CART trees averaged at prediction time.
//!
//! A master ChaCha stream seeded from the configuration hands each tree its
//! own seed, so tree `k` is the same tree for the same data and seed
//! regardless of how many trees follow it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pic50_common::{FeatureSchema, FeatureTable, ForestConfig, PotencyError, Result};

use crate::tree::{RegressionTree, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    schema: FeatureSchema,
    trees: Vec<RegressionTree>,
    seed: u64,
}

impl RandomForestRegressor {
    pub fn fit(x: &FeatureTable, y: &[f64], config: &ForestConfig) -> Result<Self> {
        let n = x.n_rows();
        if n == 0 {
            return Err(PotencyError::Model("cannot fit a forest on zero rows".to_string()));
        }
        if n != y.len() {
            return Err(PotencyError::Model(format!(
                "{} feature rows but {} targets",
                n,
                y.len()
            )));
        }
        if config.n_trees == 0 {
            return Err(PotencyError::Model("n_trees must be at least 1".to_string()));
        }

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            min_samples_leaf: config.min_samples_leaf.max(1),
        };
        let rows = x.rows();
        let mut master = ChaCha8Rng::seed_from_u64(config.seed);

        let trees: Vec<RegressionTree> = (0..config.n_trees)
            .map(|_| {
                let mut rng = ChaCha8Rng::seed_from_u64(master.gen::<u64>());
                let samples: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(rows, y, &samples, &params, &mut rng)
            })
            .collect();

        let mean_leaves =
            trees.iter().map(RegressionTree::n_leaves).sum::<usize>() as f64 / trees.len() as f64;
        debug!("Forest trees average {:.1} leaves", mean_leaves);
        info!(
            "Fitted random forest: {} trees on {} rows x {} features (seed {})",
            trees.len(),
            n,
            x.n_cols(),
            config.seed
        );

        Ok(Self { schema: x.schema().clone(), trees, seed: config.seed })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Mean of the per-tree predictions, one value per row.
    pub fn predict(&self, x: &FeatureTable) -> Result<Vec<f64>> {
        self.schema.check_matches(x.schema())?;
        let n_trees = self.trees.len() as f64;
        Ok(x
            .rows()
            .iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }

    /// Mean of the per-tree normalised importances, renormalised to sum to 1.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.schema.len()];
        for tree in &self.trees {
            for (acc, v) in total.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            total.iter_mut().for_each(|v| *v /= sum);
        }
        total
    }

    /// Features ordered by importance, highest first.
    pub fn ranked_importances(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .schema
            .columns()
            .iter()
            .cloned()
            .zip(self.feature_importances())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_table(n: usize) -> (FeatureTable, Vec<f64>) {
        let schema = FeatureSchema::new(["signal", "noise"]).unwrap();
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64 / n as f64, ((i * 37) % 17) as f64])
            .collect();
        let y = rows.iter().map(|r| 2.0 * r[0] + 5.0).collect();
        (FeatureTable::from_rows(schema, rows).unwrap(), y)
    }

    fn small_config() -> ForestConfig {
        ForestConfig { n_trees: 10, ..Default::default() }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = linear_table(60);
        let a = RandomForestRegressor::fit(&x, &y, &small_config()).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, &small_config()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_different_seed_different_forest() {
        let (x, y) = linear_table(60);
        let a = RandomForestRegressor::fit(&x, &y, &small_config()).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, &ForestConfig { seed: 7, ..small_config() })
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_predictions_track_target() {
        let (x, y) = linear_table(100);
        let forest = RandomForestRegressor::fit(&x, &y, &small_config()).unwrap();
        let pred = forest.predict(&x).unwrap();
        assert_eq!(pred.len(), 100);
        let mae = pred.iter().zip(&y).map(|(p, t)| (p - t).abs()).sum::<f64>() / 100.0;
        assert!(mae < 0.2, "mae {mae}");
        // averages of training targets stay inside their range
        assert!(pred.iter().all(|p| (5.0..=7.0).contains(p)));
    }

    #[test]
    fn test_without_bootstrap_trees_memorise() {
        let (x, y) = linear_table(30);
        let config = ForestConfig { n_trees: 3, bootstrap: false, ..Default::default() };
        let forest = RandomForestRegressor::fit(&x, &y, &config).unwrap();
        for (p, t) in forest.predict(&x).unwrap().iter().zip(&y) {
            assert!((p - t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_importances_sum_to_one_and_rank_signal_first() {
        let (x, y) = linear_table(80);
        let forest = RandomForestRegressor::fit(&x, &y, &small_config()).unwrap();
        let importances = forest.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(forest.ranked_importances()[0].0, "signal");
    }

    #[test]
    fn test_predict_rejects_other_schema() {
        let (x, y) = linear_table(20);
        let forest = RandomForestRegressor::fit(&x, &y, &small_config()).unwrap();
        let other = FeatureTable::from_rows(FeatureSchema::new(["noise", "signal"]).unwrap(), vec![vec![0.0, 0.0]])
            .unwrap();
        assert!(matches!(forest.predict(&other), Err(PotencyError::SchemaMismatch(_))));
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let (x, y) = linear_table(10);
        assert!(RandomForestRegressor::fit(&x, &y[..5], &small_config()).is_err());
        let zero = ForestConfig { n_trees: 0, ..Default::default() };
        assert!(RandomForestRegressor::fit(&x, &y, &zero).is_err());
    }
}
