//! pic50-common: Shared error taxonomy, feature tables and configuration
//! used across all pic50 crates.

pub mod error;
pub mod model_config;
pub mod table;

// Re-export commonly used types
pub use error::{PotencyError, Result};
pub use model_config::{ChartConfig, ForestConfig, ModelConfig, SplitConfig};
pub use table::{FeatureSchema, FeatureTable, SchemaMismatch};
