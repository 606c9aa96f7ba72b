//! Configuration loading for pic50.
//! Reads pic50.toml from the current directory or the path in the
//! PIC50_CONFIG env var. Every field has a default that reproduces the EGFR
//! workflow, so an absent default file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pic50_common::ModelConfig;

use crate::source::DatasetSource;

pub const CONFIG_ENV: &str = "PIC50_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "pic50.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetSource,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UploadConfig {
    /// CSV with a `SMILES` column. No inference step runs when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_predictions_file")]
    pub predictions_file: String,
    #[serde(default = "default_chart_file")]
    pub chart_file: String,
    /// Number of features listed by importance after training.
    #[serde(default = "default_top_features")]
    pub top_features: usize,
}

fn default_output_dir()       -> PathBuf { PathBuf::from("./output") }
fn default_predictions_file() -> String  { "predictions.csv".to_string() }
fn default_chart_file()       -> String  { "parity_chart.json".to_string() }
fn default_top_features()     -> usize   { 10 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            predictions_file: default_predictions_file(),
            chart_file: default_chart_file(),
            top_features: default_top_features(),
        }
    }
}

impl OutputConfig {
    pub fn predictions_path(&self) -> PathBuf {
        self.dir.join(&self.predictions_file)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.dir.join(&self.chart_file)
    }
}

mod tests;

impl Config {
    /// Load configuration from pic50.toml.
    /// Checks PIC50_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            Err(_) => {
                tracing::info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy pic50.example.toml to pic50.toml and edit it.",
                path.display()
            );
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.model.validate()?;
        Ok(config)
    }
}
