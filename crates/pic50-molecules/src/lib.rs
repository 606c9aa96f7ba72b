//! pic50 Molecules - from SMILES strings to fixed-width feature rows.
//!
//! This crate is the chemistry half of the pipeline:
//! 1. Parsing SMILES into a molecular graph with implicit hydrogens
//! 2. Ring perception (smallest set of smallest rings)
//! 3. The versioned descriptor catalog and the Lipinski subset
//! 4. Batch feature extraction with per-row failure reporting

pub mod descriptors;
pub mod element;
pub mod extractor;
pub mod lipinski;
pub mod molecule;
pub mod ring;
pub mod smiles;

pub use descriptors::{DescriptorCatalog, CATALOG_VERSION};
pub use extractor::{ExtractedFeatures, FeatureExtractor, ParseFailure};
pub use lipinski::LipinskiDescriptors;
pub use molecule::Molecule;
pub use smiles::{parse_smiles, SmilesError};
