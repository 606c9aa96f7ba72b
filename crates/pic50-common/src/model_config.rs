//! Training configuration shared by the model crate and the binary.
//!
//! Defaults reproduce the reference EGFR workflow: 80/20 split seeded with 8,
//! a 100-tree forest seeded with 42, and a parity chart over [2, 11.5].

use serde::{Deserialize, Serialize};

use crate::error::{PotencyError, Result};

/// Complete training configuration for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name of the label column in the training table
    #[serde(default = "default_label_column")]
    pub label_column: String,

    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub forest: ForestConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    /// Rows shown in data previews
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_label_column() -> String { "pIC50".to_string() }
fn default_preview_rows() -> usize { 5 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            label_column: default_label_column(),
            split: SplitConfig::default(),
            forest: ForestConfig::default(),
            chart: ChartConfig::default(),
            preview_rows: default_preview_rows(),
        }
    }
}

// ── Train/test split ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of clean rows held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    #[serde(default = "default_split_seed")]
    pub seed: u64,
}

fn default_test_fraction() -> f64 { 0.2 }
fn default_split_seed() -> u64 { 8 }

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_split_seed(),
        }
    }
}

// ── Random forest ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    #[serde(default = "default_forest_seed")]
    pub seed: u64,

    /// Unlimited when absent
    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,

    /// Draw a bootstrap sample per tree
    #[serde(default = "default_true")]
    pub bootstrap: bool,
}

fn default_n_trees() -> usize { 100 }
fn default_forest_seed() -> u64 { 42 }
fn default_min_samples_split() -> usize { 2 }
fn default_min_samples_leaf() -> usize { 1 }
fn default_true() -> bool { true }

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            seed: default_forest_seed(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            bootstrap: true,
        }
    }
}

// ── Parity chart ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_axis_min")]
    pub axis_min: f64,

    #[serde(default = "default_axis_max")]
    pub axis_max: f64,
}

fn default_axis_min() -> f64 { 2.0 }
fn default_axis_max() -> f64 { 11.5 }

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            axis_min: default_axis_min(),
            axis_max: default_axis_max(),
        }
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl ModelConfig {
    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() {
            return Err(PotencyError::Config("label_column must not be empty".into()));
        }
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            return Err(PotencyError::Config(format!(
                "split.test_fraction must be in (0, 1), got {}",
                self.split.test_fraction
            )));
        }
        if self.forest.n_trees == 0 {
            return Err(PotencyError::Config("forest.n_trees must be at least 1".into()));
        }
        if self.forest.min_samples_split < 2 {
            return Err(PotencyError::Config("forest.min_samples_split must be at least 2".into()));
        }
        if self.forest.min_samples_leaf == 0 {
            return Err(PotencyError::Config("forest.min_samples_leaf must be at least 1".into()));
        }
        if self.chart.axis_min >= self.chart.axis_max {
            return Err(PotencyError::Config("chart.axis_min must be below chart.axis_max".into()));
        }
        Ok(())
    }

    /// Load from YAML file
    pub fn from_yaml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_reference_workflow() {
        let config = ModelConfig::default();
        assert_eq!(config.label_column, "pIC50");
        assert_eq!(config.split.seed, 8);
        assert!((config.split.test_fraction - 0.2).abs() < 1e-12);
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.forest.max_depth, None);
        assert_eq!(config.chart.axis_min, 2.0);
        assert_eq!(config.chart.axis_max, 11.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ModelConfig = toml::from_str("[forest]\nn_trees = 10\n").unwrap();
        assert_eq!(config.forest.n_trees, 10);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.split.seed, 8);
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let mut config = ModelConfig::default();
        config.split.test_fraction = 1.0;
        assert!(matches!(config.validate(), Err(PotencyError::Config(_))));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        let config = ModelConfig::default();
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();
        let parsed = ModelConfig::from_yaml(path.to_str().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
