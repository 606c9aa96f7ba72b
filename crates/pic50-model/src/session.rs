//! One training session: clean, split, scale, fit, evaluate.
//!
//! A session owns everything it fits. Nothing is cached between sessions;
//! the artifact lives as long as the `TrainedSession` and is only borrowed
//! by inference.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use pic50_common::{FeatureSchema, FeatureTable, ModelConfig, Result};

use crate::dataset::{clean, train_test_split, CleaningReport, LabeledTable, TrainTestSplit};
use crate::forest::RandomForestRegressor;
use crate::metrics::Evaluation;
use crate::report::ParityChart;
use crate::scaler::StandardScaler;

/// Fitted scaler and forest plus the schema both were fitted on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelArtifact {
    schema: FeatureSchema,
    fingerprint: String,
    scaler: StandardScaler,
    forest: RandomForestRegressor,
}

impl ModelArtifact {
    pub fn fit(train: &LabeledTable, config: &ModelConfig) -> Result<Self> {
        let (scaler, scaled) = StandardScaler::fit_transform(&train.features)?;
        let forest = RandomForestRegressor::fit(&scaled, &train.labels, &config.forest)?;
        let schema = train.schema().clone();
        Ok(Self { fingerprint: schema.fingerprint(), schema, scaler, forest })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// SHA-256 of the training schema.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    /// Predict raw (unscaled) feature rows. The table must carry the
    /// training schema exactly.
    pub fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        self.schema.check_matches(features.schema())?;
        let scaled = self.scaler.transform(features)?;
        self.forest.predict(&scaled)
    }
}

#[derive(Debug, Clone)]
pub struct TrainedSession {
    pub session_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub config: ModelConfig,
    pub cleaning: CleaningReport,
    pub split: TrainTestSplit,
    pub artifact: ModelArtifact,
    pub test_predictions: Vec<f64>,
    pub evaluation: Evaluation,
}

impl TrainedSession {
    pub fn parity_chart(&self) -> ParityChart {
        ParityChart::new(&self.split.test.labels, &self.test_predictions, &self.config.chart)
    }

    /// Highest-ranked features by forest importance.
    pub fn top_features(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked = self.artifact.forest().ranked_importances();
        ranked.truncate(n);
        ranked
    }
}

pub struct TrainingSession;

impl TrainingSession {
    pub fn run(table: &LabeledTable, config: &ModelConfig) -> Result<TrainedSession> {
        config.validate()?;
        let session_id = Uuid::new_v4();
        info!(
            "Session {}: training on {} rows x {} features",
            session_id,
            table.n_rows(),
            table.features.n_cols()
        );

        let (clean_table, cleaning) = clean(table)?;
        let split = train_test_split(&clean_table, &config.split)?;
        let artifact = ModelArtifact::fit(&split.train, config)?;

        let test_predictions = artifact.predict(&split.test.features)?;
        let evaluation = Evaluation::compute(&split.test.labels, &test_predictions)?;
        if evaluation.r2 < 0.0 {
            warn!("Session {}: model scores below the mean predictor (R2 {:.3})", session_id, evaluation.r2);
        }
        info!(
            "Session {}: MAE {:.4}, RMSE {:.4}, R2 {:.4} on {} held-out rows",
            session_id,
            evaluation.mae,
            evaluation.rmse,
            evaluation.r2,
            evaluation.n_samples
        );

        Ok(TrainedSession {
            session_id,
            trained_at: Utc::now(),
            config: config.clone(),
            cleaning,
            split,
            artifact,
            test_predictions,
            evaluation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pic50_common::PotencyError;
    use pic50_test_utils::linear_features;

    fn linear_labeled_table(n: usize) -> LabeledTable {
        let (features, labels) = linear_features(n);
        LabeledTable::new(features, labels, "pIC50").unwrap()
    }

    fn quick_config() -> ModelConfig {
        let mut config = ModelConfig::default();
        config.forest.n_trees = 10;
        config
    }

    #[test]
    fn test_run_produces_consistent_session() {
        let table = linear_labeled_table(50);
        let session = TrainingSession::run(&table, &quick_config()).unwrap();
        assert_eq!(session.split.test.n_rows(), 10);
        assert_eq!(session.split.train.n_rows(), 40);
        assert_eq!(session.test_predictions.len(), 10);
        assert_eq!(session.artifact.fingerprint(), table.schema().fingerprint());
        assert_eq!(session.artifact.forest().n_trees(), 10);
        assert_eq!(session.parity_chart().points.len(), 10);
    }

    #[test]
    fn test_artifact_rejects_foreign_schema() {
        let session = TrainingSession::run(&linear_labeled_table(30), &quick_config()).unwrap();
        let foreign = FeatureTable::from_rows(FeatureSchema::new(["other"]).unwrap(), vec![vec![1.0]]).unwrap();
        let err = session.artifact.predict(&foreign).unwrap_err();
        assert!(matches!(err, PotencyError::SchemaMismatch(_)));
    }

    #[test]
    fn test_invalid_config_rejected_before_training() {
        let mut config = quick_config();
        config.split.test_fraction = 1.5;
        assert!(TrainingSession::run(&linear_labeled_table(30), &config).is_err());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let table = linear_labeled_table(20);
        let a = TrainingSession::run(&table, &quick_config()).unwrap();
        let b = TrainingSession::run(&table, &quick_config()).unwrap();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.test_predictions, b.test_predictions);
    }
}
