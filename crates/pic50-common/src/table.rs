//! Named, ordered feature columns and the row-major tables built on them.
//!
//! A `FeatureSchema` is the contract between training and inference: the
//! scaler and the forest are only valid for tables whose schema is equal,
//! name for name and position for position, to the one they were fitted on.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PotencyError, Result};

// ── Schema ───────────────────────────────────────────────────────────────────

/// Ordered set of unique feature column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty and duplicated names.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if name.trim().is_empty() {
                return Err(PotencyError::InvalidSchema("empty column name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(PotencyError::InvalidSchema(format!(
                    "duplicate column name `{name}`"
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// SHA-256 over the ordered column names. Two schemas share a
    /// fingerprint exactly when they are equal.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for name in &self.columns {
            hasher.update(name.as_bytes());
            hasher.update([0x1f]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Column-wise concatenation; fails on any name shared by both sides.
    pub fn concat(&self, other: &FeatureSchema) -> Result<Self> {
        Self::new(self.columns.iter().chain(other.columns.iter()).cloned())
    }

    /// Schema with `name` removed. Removing an absent column is an error.
    pub fn without(&self, name: &str) -> Result<Self> {
        if !self.contains(name) {
            return Err(PotencyError::InvalidSchema(format!(
                "cannot drop missing column `{name}`"
            )));
        }
        Ok(Self {
            columns: self.columns.iter().filter(|c| *c != name).cloned().collect(),
        })
    }

    /// Verify that `actual` is exactly this schema.
    pub fn check_matches(&self, actual: &FeatureSchema) -> std::result::Result<(), SchemaMismatch> {
        if self == actual {
            return Ok(());
        }
        Err(SchemaMismatch::between(self, actual))
    }
}

// ── Mismatch report ──────────────────────────────────────────────────────────

/// Difference between the schema a model expects and the one it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMismatch {
    pub expected_len: usize,
    pub actual_len: usize,
    /// Expected columns absent from the actual schema.
    pub missing: Vec<String>,
    /// Actual columns the expected schema does not know.
    pub unexpected: Vec<String>,
    /// First position where both schemas have a name but disagree.
    pub first_misplaced: Option<(usize, String, String)>,
}

impl SchemaMismatch {
    pub fn between(expected: &FeatureSchema, actual: &FeatureSchema) -> Self {
        let missing = expected
            .columns
            .iter()
            .filter(|c| !actual.contains(c))
            .cloned()
            .collect();
        let unexpected = actual
            .columns
            .iter()
            .filter(|c| !expected.contains(c))
            .cloned()
            .collect();
        let first_misplaced = expected
            .columns
            .iter()
            .zip(actual.columns.iter())
            .enumerate()
            .find(|(_, (e, a))| e != a)
            .map(|(i, (e, a))| (i, e.clone(), a.clone()));

        Self {
            expected_len: expected.len(),
            actual_len: actual.len(),
            missing,
            unexpected,
            first_misplaced,
        }
    }
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} columns, got {}",
            self.expected_len, self.actual_len
        )?;
        if !self.missing.is_empty() {
            write!(f, "; missing [{}]", preview_names(&self.missing))?;
        }
        if !self.unexpected.is_empty() {
            write!(f, "; unexpected [{}]", preview_names(&self.unexpected))?;
        }
        if let Some((i, expected, actual)) = &self.first_misplaced {
            write!(f, "; position {i} holds `{actual}` instead of `{expected}`")?;
        }
        Ok(())
    }
}

fn preview_names(names: &[String]) -> String {
    const SHOWN: usize = 5;
    let mut out = names.iter().take(SHOWN).cloned().collect::<Vec<_>>().join(", ");
    if names.len() > SHOWN {
        out.push_str(&format!(", … (+{})", names.len() - SHOWN));
    }
    out
}

// ── Table ────────────────────────────────────────────────────────────────────

/// Row-major numeric table whose columns follow a `FeatureSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    schema: FeatureSchema,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Empty table with the given columns.
    pub fn empty(schema: FeatureSchema) -> Self {
        Self { schema, rows: Vec::new() }
    }

    pub fn from_rows(schema: FeatureSchema, rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut table = Self::empty(schema);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<f64>) -> Result<()> {
        if row.len() != self.schema.len() {
            return Err(PotencyError::InvalidSchema(format!(
                "row has {} values but schema has {} columns",
                row.len(),
                self.schema.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.schema.position(name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// New table holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Column-wise concatenation of two tables with the same row count.
    pub fn hconcat(&self, other: &FeatureTable) -> Result<Self> {
        if self.n_rows() != other.n_rows() {
            return Err(PotencyError::InvalidSchema(format!(
                "cannot concatenate tables with {} and {} rows",
                self.n_rows(),
                other.n_rows()
            )));
        }
        let schema = self.schema.concat(&other.schema)?;
        let rows = self
            .rows
            .iter()
            .zip(other.rows.iter())
            .map(|(l, r)| l.iter().chain(r.iter()).copied().collect())
            .collect();
        Ok(Self { schema, rows })
    }

    pub fn drop_column(&self, name: &str) -> Result<Self> {
        let idx = self.schema.position(name).ok_or_else(|| {
            PotencyError::InvalidSchema(format!("cannot drop missing column `{name}`"))
        })?;
        let schema = self.schema.without(name)?;
        let rows = self
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != idx)
                    .map(|(_, v)| *v)
                    .collect()
            })
            .collect();
        Ok(Self { schema, rows })
    }

    /// Replace every row through `f`, keeping the schema.
    pub fn map_rows<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        Self {
            schema: self.schema.clone(),
            rows: self.rows.iter().map(|r| f(r)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = FeatureSchema::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, PotencyError::InvalidSchema(_)));
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let ab = schema(&["a", "b"]);
        let ba = schema(&["b", "a"]);
        assert_eq!(ab.fingerprint(), schema(&["a", "b"]).fingerprint());
        assert_ne!(ab.fingerprint(), ba.fingerprint());
        assert_eq!(ab.fingerprint().len(), 64);
    }

    #[test]
    fn test_mismatch_reports_order_and_membership() {
        let expected = schema(&["a", "b", "c"]);
        let reordered = schema(&["a", "c", "b"]);
        let m = expected.check_matches(&reordered).unwrap_err();
        assert!(m.missing.is_empty());
        assert!(m.unexpected.is_empty());
        assert_eq!(m.first_misplaced, Some((1, "b".to_string(), "c".to_string())));

        let other = schema(&["a", "d"]);
        let m = expected.check_matches(&other).unwrap_err();
        assert_eq!(m.missing, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(m.unexpected, vec!["d".to_string()]);
        assert!(m.to_string().contains("expected 3 columns, got 2"));
    }

    #[test]
    fn test_hconcat_and_drop() {
        let left = FeatureTable::from_rows(schema(&["x", "MW"]), vec![vec![1.0, 2.0]]).unwrap();
        let right = FeatureTable::from_rows(schema(&["y"]), vec![vec![3.0]]).unwrap();
        let joined = left.hconcat(&right).unwrap();
        assert_eq!(joined.schema().columns(), &["x", "MW", "y"]);

        let dropped = joined.drop_column("MW").unwrap();
        assert_eq!(dropped.schema().columns(), &["x", "y"]);
        assert_eq!(dropped.row(0).unwrap(), &[1.0, 3.0]);
        assert!(dropped.drop_column("MW").is_err());
    }

    #[test]
    fn test_hconcat_rejects_shared_names() {
        let left = FeatureTable::from_rows(schema(&["x"]), vec![vec![1.0]]).unwrap();
        assert!(left.hconcat(&left).is_err());
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut t = FeatureTable::empty(schema(&["x", "y"]));
        assert!(t.push_row(vec![1.0]).is_err());
        t.push_row(vec![1.0, 2.0]).unwrap();
        assert_eq!(t.column("y"), Some(vec![2.0]));
    }
}
