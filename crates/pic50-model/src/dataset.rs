//! Labeled training data: CSV loading, cleaning, and the train/test split.
//!
//! Cleaning never imputes. A row survives only if every feature and the
//! label are finite; the split is a seeded shuffle, so the same table and
//! seed always give the same partition.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pic50_common::{FeatureSchema, FeatureTable, PotencyError, Result, SplitConfig};
use pic50_molecules::{FeatureExtractor, ParseFailure};

use crate::inference::SMILES_COLUMN;

/// Descriptor features plus the potency label of each row.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    pub features: FeatureTable,
    pub labels: Vec<f64>,
    pub label_column: String,
}

impl LabeledTable {
    pub fn new(features: FeatureTable, labels: Vec<f64>, label_column: impl Into<String>) -> Result<Self> {
        if features.n_rows() != labels.len() {
            return Err(PotencyError::DataQuality(format!(
                "{} feature rows but {} labels",
                features.n_rows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels, label_column: label_column.into() })
    }

    /// Read a CSV with a header row. Every column except `label_column` is a
    /// feature. Empty or non-numeric cells become NaN (missing).
    /// Repeated header names get a `.1`, `.2`, ... suffix.
    pub fn from_csv_reader<R: Read>(reader: R, label_column: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = dedupe_headers(reader.headers()?.iter().map(|s| s.trim().to_string()));

        let label_idx = headers.iter().position(|h| h == label_column).ok_or_else(|| {
            PotencyError::DataQuality(format!("label column `{label_column}` not found"))
        })?;
        let schema = FeatureSchema::new(
            headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != label_idx)
                .map(|(_, h)| h.clone()),
        )?;

        let mut features = FeatureTable::empty(schema);
        let mut labels = Vec::new();
        let mut unparsable = 0usize;

        for (line, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() != headers.len() {
                return Err(PotencyError::DataQuality(format!(
                    "row {} has {} fields, header has {}",
                    line + 1,
                    record.len(),
                    headers.len()
                )));
            }
            let mut row = Vec::with_capacity(headers.len() - 1);
            for (i, cell) in record.iter().enumerate() {
                let value = parse_cell(cell).unwrap_or_else(|| {
                    unparsable += 1;
                    f64::NAN
                });
                if i == label_idx {
                    labels.push(value);
                } else {
                    row.push(value);
                }
            }
            features.push_row(row)?;
        }

        if unparsable > 0 {
            debug!("{} empty or non-numeric cells read as missing", unparsable);
        }
        info!(
            "Loaded training table: {} rows, {} feature columns",
            labels.len(),
            features.n_cols()
        );
        Self::new(features, labels, label_column)
    }

    pub fn from_csv_path(path: &Path, label_column: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file, label_column)
    }

    /// Read a CSV holding a `SMILES` column and `label_column`, computing the
    /// features with `extractor`. Other columns are ignored. Rows whose SMILES
    /// does not parse are left out and returned alongside the table.
    pub fn from_smiles_csv_reader<R: Read>(
        reader: R,
        label_column: &str,
        extractor: &FeatureExtractor,
    ) -> Result<(Self, Vec<ParseFailure>)> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.trim().to_string()).collect();
        let find = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                PotencyError::DataQuality(format!("column `{name}` not found"))
            })
        };
        let smiles_idx = find(SMILES_COLUMN)?;
        let label_idx = find(label_column)?;

        let mut smiles = Vec::new();
        let mut labels = Vec::new();
        for result in reader.records() {
            let record = result?;
            smiles.push(record.get(smiles_idx).unwrap_or_default().to_string());
            labels.push(record.get(label_idx).and_then(parse_cell).unwrap_or(f64::NAN));
        }

        let extracted = extractor.extract(&smiles)?;
        let labels: Vec<f64> = extracted.survivors.iter().map(|&i| labels[i]).collect();
        if !extracted.failures.is_empty() {
            warn!(
                "{} of {} training compounds could not be parsed",
                extracted.failures.len(),
                smiles.len()
            );
        }
        info!(
            "Featurised training table: {} rows, {} feature columns",
            labels.len(),
            extracted.table.n_cols()
        );
        let table = Self::new(extracted.table, labels, label_column)?;
        Ok((table, extracted.failures))
    }

    /// Read either training layout. A CSV with a `SMILES` column is
    /// featurised; anything else is read as a numeric descriptor table.
    pub fn load_csv_path(
        path: &Path,
        label_column: &str,
        extractor: &FeatureExtractor,
    ) -> Result<(Self, Vec<ParseFailure>)> {
        let has_smiles = csv::Reader::from_path(path)?
            .headers()?
            .iter()
            .any(|h| h.trim() == SMILES_COLUMN);
        let file = std::fs::File::open(path)?;
        if has_smiles {
            Self::from_smiles_csv_reader(file, label_column, extractor)
        } else {
            Ok((Self::from_csv_reader(file, label_column)?, Vec::new()))
        }
    }

    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.features.schema()
    }

    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            label_column: self.label_column.clone(),
        }
    }
}

fn dedupe_headers(headers: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .map(|h| {
            let n = seen.entry(h.clone()).or_insert(0);
            *n += 1;
            if *n == 1 {
                h
            } else {
                let renamed = format!("{h}.{}", *n - 1);
                debug!("Duplicate column `{}` read as `{}`", h, renamed);
                renamed
            }
        })
        .collect()
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok()
}

// ── Cleaning ────────────────────────────────────────────────────────────────

/// What cleaning removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Rows holding at least one positive or negative infinity.
    pub dropped_infinite: usize,
    /// Remaining dropped rows, which held a missing value.
    pub dropped_missing: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.dropped_infinite + self.dropped_missing
    }
}

/// Drop every row with a non-finite feature or label.
pub fn clean(table: &LabeledTable) -> Result<(LabeledTable, CleaningReport)> {
    let mut report = CleaningReport { rows_in: table.n_rows(), ..Default::default() };
    let mut keep = Vec::with_capacity(table.n_rows());

    for (i, (row, &label)) in table.features.rows().iter().zip(&table.labels).enumerate() {
        let values = || row.iter().chain(std::iter::once(&label));
        if values().any(|v| v.is_infinite()) {
            report.dropped_infinite += 1;
        } else if values().any(|v| v.is_nan()) {
            report.dropped_missing += 1;
        } else {
            keep.push(i);
        }
    }
    report.rows_out = keep.len();

    if report.dropped() > 0 {
        warn!(
            "Dropped {} of {} rows ({} infinite, {} missing)",
            report.dropped(),
            report.rows_in,
            report.dropped_infinite,
            report.dropped_missing
        );
    }
    if report.rows_out < 2 {
        return Err(PotencyError::DataQuality(format!(
            "only {} clean rows remain out of {}; at least 2 are needed",
            report.rows_out, report.rows_in
        )));
    }

    Ok((table.select_rows(&keep), report))
}

// ── Split ───────────────────────────────────────────────────────────────────

/// A seeded partition of a clean table.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: LabeledTable,
    pub test: LabeledTable,
    /// Row indices into the clean table.
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Number of held-out rows: `ceil(n * fraction)`, leaving at least one row
/// on each side.
pub fn test_size(n_rows: usize, fraction: f64) -> usize {
    let n_test = (n_rows as f64 * fraction).ceil() as usize;
    n_test.clamp(1, n_rows.saturating_sub(1).max(1))
}

pub fn train_test_split(table: &LabeledTable, config: &SplitConfig) -> Result<TrainTestSplit> {
    let n = table.n_rows();
    if n < 2 {
        return Err(PotencyError::DataQuality(format!(
            "cannot split {n} rows into train and test sets"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    order.shuffle(&mut rng);

    let n_test = test_size(n, config.test_fraction);
    let test_indices = order[..n_test].to_vec();
    let train_indices = order[n_test..].to_vec();

    debug!(
        "Split {} rows into {} train / {} test (seed {})",
        n,
        train_indices.len(),
        test_indices.len(),
        config.seed
    );

    Ok(TrainTestSplit {
        train: table.select_rows(&train_indices),
        test: table.select_rows(&test_indices),
        train_indices,
        test_indices,
    })
}
