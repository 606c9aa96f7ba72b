//! Inference on uploaded compound batches.
//!
//! Upload CSV -> feature extraction -> schema check against the artifact ->
//! fitted scaler -> forest. Predictions are attached to the surviving rows
//! in upload order; unparseable rows are reported, never silently dropped.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use pic50_common::{FeatureSchema, PotencyError, Result, SchemaMismatch};
use pic50_molecules::{FeatureExtractor, ParseFailure};

use crate::report::TablePreview;
use crate::session::ModelArtifact;

pub const SMILES_COLUMN: &str = "SMILES";
pub const PREDICTION_COLUMN: &str = "predicted_pIC50";

// ── Upload ───────────────────────────────────────────────────────────────────

/// An uploaded CSV, kept verbatim, with its `SMILES` column located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    smiles_idx: usize,
}

impl UploadBatch {
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(String::is_empty) {
            return Err(PotencyError::UploadFormat("upload is empty".to_string()));
        }
        let smiles_idx = headers.iter().position(|h| h == SMILES_COLUMN).ok_or_else(|| {
            PotencyError::UploadFormat(format!(
                "missing `{SMILES_COLUMN}` column (found: {})",
                headers.join(", ")
            ))
        })?;

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            fields.resize(headers.len(), String::new());
            records.push(fields);
        }
        if records.is_empty() {
            return Err(PotencyError::UploadFormat("upload has a header but no rows".to_string()));
        }

        info!("Loaded upload: {} rows, {} columns", records.len(), headers.len());
        Ok(Self { headers, records, smiles_idx })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The `SMILES` cells exactly as uploaded.
    pub fn smiles(&self) -> Vec<&str> {
        self.records.iter().map(|r| r[self.smiles_idx].as_str()).collect()
    }

    pub fn preview(&self, n_rows: usize) -> TablePreview {
        TablePreview::new(
            "Sample Data Preview:",
            self.headers.clone(),
            self.records.iter().take(n_rows).cloned().collect(),
            self.records.len(),
        )
    }
}

// ── Predictions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Zero-based row in the upload.
    pub row: usize,
    pub smiles: String,
    pub predicted_pic50: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub predictions: Vec<Prediction>,
    pub failures: Vec<ParseFailure>,
}

impl PredictionReport {
    /// CSV with exactly the columns `SMILES` and `predicted_pIC50`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record([SMILES_COLUMN, PREDICTION_COLUMN])?;
        for p in &self.predictions {
            let value = p.predicted_pic50.to_string();
            writer.write_record([p.smiles.as_str(), value.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| PotencyError::Other(e.into()))
    }

    pub fn preview(&self, n_rows: usize) -> TablePreview {
        let rows = self
            .predictions
            .iter()
            .take(n_rows)
            .map(|p| vec![p.smiles.clone(), format!("{:.4}", p.predicted_pic50)])
            .collect();
        TablePreview::new(
            "Predicted pIC50 Values:",
            vec![SMILES_COLUMN.to_string(), PREDICTION_COLUMN.to_string()],
            rows,
            self.predictions.len(),
        )
    }
}

// ── Adapter ──────────────────────────────────────────────────────────────────

/// Fails when a model fitted on `training` columns could never accept the
/// features extracted from uploaded SMILES.
pub fn check_upload_compatible(training: &FeatureSchema, extractor: &FeatureExtractor) -> Result<()> {
    training.check_matches(extractor.schema()).map_err(|mismatch| {
        warn!(
            "Training table has {} feature columns; uploads yield {} ({} missing)",
            mismatch.expected_len,
            mismatch.actual_len,
            mismatch.missing.len()
        );
        mismatch.into()
    })
}

/// Applies a fitted artifact to raw SMILES.
pub struct InferenceAdapter<'a> {
    artifact: &'a ModelArtifact,
    extractor: FeatureExtractor,
}

impl<'a> InferenceAdapter<'a> {
    pub fn new(artifact: &'a ModelArtifact) -> Result<Self> {
        Ok(Self { artifact, extractor: FeatureExtractor::new()? })
    }

    pub fn predict_upload(&self, batch: &UploadBatch) -> Result<PredictionReport> {
        self.predict_smiles(&batch.smiles())
    }

    pub fn predict_smiles<S: AsRef<str>>(&self, smiles: &[S]) -> Result<PredictionReport> {
        let extracted = self.extractor.extract(smiles)?;

        if extracted.table.is_empty() {
            // nothing to align: report every expected column as missing
            warn!("No compound in the batch of {} could be featurised", smiles.len());
            let none = FeatureSchema::new(Vec::<String>::new())?;
            return Err(SchemaMismatch::between(self.artifact.schema(), &none).into());
        }
        self.artifact.schema().check_matches(extracted.table.schema())?;

        let values = self.artifact.predict(&extracted.table)?;
        let predictions: Vec<Prediction> = extracted
            .survivors
            .iter()
            .zip(values)
            .map(|(&row, predicted_pic50)| Prediction {
                row,
                smiles: smiles[row].as_ref().to_string(),
                predicted_pic50,
            })
            .collect();

        info!(
            "Predicted {} compounds ({} skipped)",
            predictions.len(),
            extracted.failures.len()
        );
        Ok(PredictionReport { predictions, failures: extracted.failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_upload_requires_smiles_column() {
        let err = UploadBatch::from_csv_reader("id,smiles\n1,CCO\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PotencyError::UploadFormat(_)));
    }

    #[test]
    fn test_empty_upload_rejected() {
        assert!(matches!(
            UploadBatch::from_csv_reader("".as_bytes()),
            Err(PotencyError::UploadFormat(_))
        ));
        assert!(matches!(
            UploadBatch::from_csv_reader("SMILES\n".as_bytes()),
            Err(PotencyError::UploadFormat(_))
        ));
    }

    #[test]
    fn test_upload_keeps_rows_and_order() {
        let csv = "name,SMILES\nethanol,CCO\nbroken,not-a-smiles\nbenzene, c1ccccc1 \n";
        let batch = UploadBatch::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.smiles(), vec!["CCO", "not-a-smiles", " c1ccccc1 "]);
        let preview = batch.preview(2);
        assert_eq!(preview.headers, vec!["name", "SMILES"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.total_rows, 3);
    }

    #[test]
    fn test_upload_compatibility_checked_against_extractor() {
        let extractor = FeatureExtractor::new().unwrap();
        assert!(check_upload_compatible(extractor.schema(), &extractor).is_ok());

        let descriptors = FeatureSchema::new(["MolWt", "TPSA", "qed"]).unwrap();
        match check_upload_compatible(&descriptors, &extractor) {
            Err(PotencyError::SchemaMismatch(m)) => {
                assert_eq!(m.expected_len, 3);
                assert_eq!(m.missing, vec!["qed".to_string()]);
            }
            other => panic!("expected a schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_report_csv_has_exactly_two_columns() {
        let report = PredictionReport {
            predictions: vec![
                Prediction { row: 0, smiles: "CCO".to_string(), predicted_pic50: 5.25 },
                Prediction { row: 2, smiles: "c1ccccc1".to_string(), predicted_pic50: 6.5 },
            ],
            failures: vec![],
        };
        assert_eq!(
            report.to_csv_string().unwrap(),
            "SMILES,predicted_pIC50\nCCO,5.25\nc1ccccc1,6.5\n"
        );
    }
}
