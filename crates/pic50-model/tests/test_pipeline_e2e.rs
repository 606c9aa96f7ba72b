//! End-to-end pipeline tests: labeled table in, metrics and predictions out.
//!
//! Run with:
//! ```bash
//! cargo test --package pic50-model --test test_pipeline_e2e -- --nocapture
//! ```

use std::collections::HashSet;

use pic50_common::{FeatureTable, ModelConfig, PotencyError};
use pic50_model::{
    check_upload_compatible, Evaluation, InferenceAdapter, LabeledTable, TrainingSession, UploadBatch,
};
use pic50_molecules::FeatureExtractor;
use pic50_test_utils::{descriptor_training_csv, synthetic_features, upload_csv, SAMPLE_SMILES};

fn synthetic_table(n: usize) -> LabeledTable {
    let (features, labels) = synthetic_features(n, 8, 3);
    LabeledTable::new(features, labels, "pIC50").unwrap()
}

#[test]
fn test_reference_run_is_reproducible() {
    let table = synthetic_table(500);
    let config = ModelConfig::default();

    let first = TrainingSession::run(&table, &config).unwrap();
    let second = TrainingSession::run(&table, &config).unwrap();

    assert_eq!(first.split.test.n_rows(), 100);
    assert_eq!(first.split.train.n_rows(), 400);
    assert_eq!(first.artifact.forest().n_trees(), 100);
    assert_eq!(first.split.test_indices, second.split.test_indices);
    assert_eq!(first.test_predictions, second.test_predictions);
    assert_eq!(first.evaluation, second.evaluation);

    let r2 = first.evaluation.r2;
    println!("R2 on held-out rows: {r2:.4}");
    assert!((0.0..=1.0).contains(&r2));
    assert!((first.evaluation.rmse - first.evaluation.mse.sqrt()).abs() < 1e-12);
}

#[test]
fn test_no_row_in_both_partitions() {
    let session = TrainingSession::run(&synthetic_table(120), &ModelConfig::default()).unwrap();
    let train: HashSet<usize> = session.split.train_indices.iter().copied().collect();
    let test: HashSet<usize> = session.split.test_indices.iter().copied().collect();
    assert!(train.is_disjoint(&test));
    assert_eq!(train.len() + test.len(), 120);

    // the scaler only ever saw training rows
    let train_mean = session.split.train.features.column("f0").unwrap().iter().sum::<f64>()
        / session.split.train.n_rows() as f64;
    assert!((session.artifact.scaler().means()[0] - train_mean).abs() < 1e-12);
}

#[test]
fn test_scaler_and_forest_ignore_test_partition_values() {
    let table = synthetic_table(120);
    let config = ModelConfig::default();
    let original = TrainingSession::run(&table, &config).unwrap();

    let mut rows = table.features.rows().to_vec();
    let mut labels = table.labels.clone();
    for &i in &original.split.test_indices {
        rows[i].iter_mut().for_each(|v| *v = *v * 1000.0 + 7.0);
        labels[i] = -50.0;
    }
    let perturbed = LabeledTable::new(
        FeatureTable::from_rows(table.schema().clone(), rows).unwrap(),
        labels,
        "pIC50",
    )
    .unwrap();
    let rerun = TrainingSession::run(&perturbed, &config).unwrap();

    assert_eq!(rerun.split.test_indices, original.split.test_indices);
    assert_eq!(rerun.artifact.scaler().means(), original.artifact.scaler().means());
    assert_eq!(rerun.artifact.scaler().scales(), original.artifact.scaler().scales());
    assert_eq!(rerun.artifact.forest(), original.artifact.forest());
}

#[test]
fn test_perfect_predictions_score_perfectly() {
    let y = [5.1, 6.2, 7.3, 8.4];
    let e = Evaluation::compute(&y, &y).unwrap();
    assert_eq!(e.mae, 0.0);
    assert_eq!(e.mse, 0.0);
    assert_eq!(e.rmse, 0.0);
    assert_eq!(e.r2, 1.0);
}

#[test]
fn test_descriptor_table_to_upload_predictions() {
    let training = descriptor_training_csv(SAMPLE_SMILES);
    let table = LabeledTable::from_csv_reader(training.as_bytes(), "pIC50").unwrap();
    assert_eq!(table.schema(), FeatureExtractor::new().unwrap().schema());

    let mut config = ModelConfig::default();
    config.forest.n_trees = 20;
    let session = TrainingSession::run(&table, &config).unwrap();

    let upload = UploadBatch::from_csv_reader(upload_csv(&["CCO", "not-a-smiles", "c1ccccc1"]).as_bytes())
        .unwrap();
    let adapter = InferenceAdapter::new(&session.artifact).unwrap();
    let report = adapter.predict_upload(&upload).unwrap();

    let rows: Vec<usize> = report.predictions.iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 2]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(report.predictions.iter().all(|p| p.predicted_pic50.is_finite()));

    let csv = report.to_csv_string().unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("SMILES,predicted_pIC50"));
    assert!(lines.next().unwrap().starts_with("CCO,"));
    assert!(lines.next().unwrap().starts_with("c1ccccc1,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_all_invalid_upload_is_schema_mismatch() {
    let training = descriptor_training_csv(SAMPLE_SMILES);
    let table = LabeledTable::from_csv_reader(training.as_bytes(), "pIC50").unwrap();
    let mut config = ModelConfig::default();
    config.forest.n_trees = 5;
    let session = TrainingSession::run(&table, &config).unwrap();

    let adapter = InferenceAdapter::new(&session.artifact).unwrap();
    let err = adapter.predict_smiles(&["not-a-smiles", "C1CC"]).unwrap_err();
    assert!(matches!(err, PotencyError::SchemaMismatch(_)));

    // the artifact is untouched and still usable
    assert!(adapter.predict_smiles(&["CCO"]).is_ok());
}

#[test]
fn test_model_trained_on_other_columns_rejects_molecules() {
    let session = TrainingSession::run(&synthetic_table(40), &ModelConfig::default()).unwrap();
    let adapter = InferenceAdapter::new(&session.artifact).unwrap();
    let err = adapter.predict_smiles(&["CCO"]).unwrap_err();
    match err {
        PotencyError::SchemaMismatch(m) => {
            assert_eq!(m.expected_len, 8);
            assert!(m.missing.contains(&"f0".to_string()));
        }
        other => panic!("expected schema mismatch, got {other}"),
    }
}

#[test]
fn test_smiles_training_table_predicts_uploads() {
    let extractor = FeatureExtractor::new().unwrap();
    let mut training = String::from("SMILES,pIC50\n");
    for (i, smiles) in SAMPLE_SMILES.iter().enumerate() {
        training.push_str(&format!("{smiles},{}\n", 5.0 + 0.25 * i as f64));
    }
    training.push_str("not-a-smiles,6.0\n");

    let (table, failures) =
        LabeledTable::from_smiles_csv_reader(training.as_bytes(), "pIC50", &extractor).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(table.n_rows(), SAMPLE_SMILES.len());
    check_upload_compatible(table.schema(), &extractor).unwrap();

    let mut config = ModelConfig::default();
    config.forest.n_trees = 10;
    let session = TrainingSession::run(&table, &config).unwrap();

    let upload = UploadBatch::from_csv_reader(upload_csv(&[" CCO ", "c1ccccc1"]).as_bytes()).unwrap();
    let report = InferenceAdapter::new(&session.artifact).unwrap().predict_upload(&upload).unwrap();
    let echoed: Vec<&str> = report.predictions.iter().map(|p| p.smiles.as_str()).collect();
    assert_eq!(echoed, vec![" CCO ", "c1ccccc1"]);
}

#[test]
fn test_descriptor_only_table_fails_before_fitting() {
    let extractor = FeatureExtractor::new().unwrap();
    let table = synthetic_table(40);
    let err = check_upload_compatible(table.schema(), &extractor).unwrap_err();
    assert!(matches!(err, PotencyError::SchemaMismatch(_)));
}
