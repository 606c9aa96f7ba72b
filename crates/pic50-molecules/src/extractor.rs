//! Molecular feature extraction: SMILES batch in, fixed-schema table out.
//!
//! 1. Parse every input once. Failures are recorded, not fatal.
//! 2. Lipinski record per parsed molecule.
//! 3. Full descriptor catalog on the hydrogen-expanded molecule.
//! 4. Catalog columns, then Lipinski columns; `MW` is dropped.
//!
//! The output schema depends only on the catalog version, never on the
//! molecules in the batch.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pic50_common::{FeatureSchema, FeatureTable, PotencyError, Result};

use crate::descriptors::{DescriptorCatalog, CATALOG_VERSION};
use crate::lipinski::{LipinskiDescriptors, LIPINSKI_COLUMNS};
use crate::molecule::Molecule;
use crate::smiles::parse_smiles;

/// Lipinski column removed from the final feature table.
pub const DROPPED_COLUMN: &str = "MW";
/// Prefix applied to Lipinski columns whose name the catalog already uses.
pub const LIPINSKI_PREFIX: &str = "Lipinski_";

/// An input row that could not be turned into a molecule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    /// Position in the input batch.
    pub index: usize,
    pub smiles: String,
    pub reason: String,
}

impl From<ParseFailure> for PotencyError {
    fn from(f: ParseFailure) -> Self {
        PotencyError::Parse {
            index: f.index,
            smiles: f.smiles,
            reason: f.reason,
        }
    }
}

/// Result of running a batch through the extractor.
#[derive(Debug, Clone)]
pub struct ExtractedFeatures {
    /// One row per successfully parsed input, in input order.
    pub table: FeatureTable,
    /// Input index of each table row.
    pub survivors: Vec<usize>,
    pub failures: Vec<ParseFailure>,
    /// Lipinski record of each table row.
    pub lipinski: Vec<LipinskiDescriptors>,
}

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    catalog_schema: FeatureSchema,
    lipinski_schema: FeatureSchema,
    schema: FeatureSchema,
}

impl FeatureExtractor {
    pub fn new() -> Result<Self> {
        let catalog_schema = FeatureSchema::new(DescriptorCatalog::names())?;
        let lipinski_schema = FeatureSchema::new(LIPINSKI_COLUMNS.iter().map(|&name| {
            if catalog_schema.contains(name) {
                format!("{LIPINSKI_PREFIX}{name}")
            } else {
                name.to_string()
            }
        }))?;
        let schema = catalog_schema
            .concat(&lipinski_schema)?
            .without(DROPPED_COLUMN)?;

        debug!(
            "Feature schema {} ({} columns, fingerprint {})",
            CATALOG_VERSION,
            schema.len(),
            &schema.fingerprint()[..12]
        );

        Ok(Self { catalog_schema, lipinski_schema, schema })
    }

    /// Columns every extracted table has, in order.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn catalog_version(&self) -> &'static str {
        CATALOG_VERSION
    }

    pub fn extract<S: AsRef<str>>(&self, smiles: &[S]) -> Result<ExtractedFeatures> {
        // ── Parse once ───────────────────────────────────────────────
        let mut molecules: Vec<Molecule> = Vec::with_capacity(smiles.len());
        let mut survivors = Vec::with_capacity(smiles.len());
        let mut failures = Vec::new();

        for (index, s) in smiles.iter().enumerate() {
            let s = s.as_ref();
            match parse_smiles(s.trim()) {
                Ok(mol) => {
                    molecules.push(mol);
                    survivors.push(index);
                }
                Err(e) => {
                    warn!("Skipping row {}: cannot parse {:?}: {}", index, s, e);
                    failures.push(ParseFailure {
                        index,
                        smiles: s.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // ── Lipinski ─────────────────────────────────────────────────
        let lipinski: Vec<LipinskiDescriptors> =
            molecules.iter().map(LipinskiDescriptors::from_molecule).collect();
        let lipinski_table = FeatureTable::from_rows(
            self.lipinski_schema.clone(),
            lipinski.iter().map(|l| l.to_row().to_vec()).collect(),
        )?;

        // ── Catalog ──────────────────────────────────────────────────
        let catalog_table = FeatureTable::from_rows(
            self.catalog_schema.clone(),
            molecules.iter().map(DescriptorCatalog::compute).collect(),
        )?;

        // ── Assemble ─────────────────────────────────────────────────
        let table = catalog_table
            .hconcat(&lipinski_table)?
            .drop_column(DROPPED_COLUMN)?;
        self.schema.check_matches(table.schema())?;

        info!(
            "Extracted {} feature rows from {} inputs ({} unparseable)",
            table.n_rows(),
            smiles.len(),
            failures.len()
        );

        Ok(ExtractedFeatures { table, survivors, failures, lipinski })
    }
}
