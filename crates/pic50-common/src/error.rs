use thiserror::Error;

use crate::table::SchemaMismatch;

#[derive(Debug, Error)]
pub enum PotencyError {
    /// A single SMILES string could not be turned into a molecule.
    /// Batch callers aggregate these instead of aborting.
    #[error("SMILES parse error at row {index} ({smiles:?}): {reason}")]
    Parse {
        index: usize,
        smiles: String,
        reason: String,
    },

    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(SchemaMismatch),

    #[error("Invalid feature schema: {0}")]
    InvalidSchema(String),

    #[error("Data quality error: {0}")]
    DataQuality(String),

    #[error("Upload format error: {0}")]
    UploadFormat(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<SchemaMismatch> for PotencyError {
    fn from(mismatch: SchemaMismatch) -> Self {
        PotencyError::SchemaMismatch(mismatch)
    }
}

pub type Result<T> = std::result::Result<T, PotencyError>;
