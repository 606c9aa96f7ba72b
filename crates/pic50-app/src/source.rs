//! Where the labeled training table comes from.
//!
//! Remote sources are downloaded once into the user cache directory and
//! read from there on later runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Google Drive file id of the EGFR pIC50 descriptor table.
pub const EGFR_DATASET_ID: &str = "1WweCeesg7nFwzBfCHGL28Prf_VdUaqZL";

const DRIVE_DOWNLOAD_URL: &str = "https://drive.usercontent.google.com/download";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DatasetSource {
    Path { path: PathBuf },
    GoogleDrive { id: String },
    Url { url: String },
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::GoogleDrive { id: EGFR_DATASET_ID.to_string() }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Path { path } => write!(f, "file {}", path.display()),
            DatasetSource::GoogleDrive { id } => write!(f, "Google Drive file {id}"),
            DatasetSource::Url { url } => write!(f, "{url}"),
        }
    }
}

impl DatasetSource {
    /// Remote location, `None` for local files.
    pub fn download_url(&self) -> Option<String> {
        match self {
            DatasetSource::Path { .. } => None,
            DatasetSource::GoogleDrive { id } => {
                Some(format!("{DRIVE_DOWNLOAD_URL}?id={id}&export=download&confirm=t"))
            }
            DatasetSource::Url { url } => Some(url.clone()),
        }
    }

    /// File name used inside the cache directory.
    pub fn cache_file_name(&self) -> Option<String> {
        match self {
            DatasetSource::Path { .. } => None,
            DatasetSource::GoogleDrive { id } => Some(format!("gdrive-{}.csv", sanitise(id))),
            DatasetSource::Url { url } => {
                let tail = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
                Some(format!("url-{}", sanitise(tail)))
            }
        }
    }

    /// Local path of the dataset, downloading into `cache_dir` if needed.
    pub async fn resolve(&self, cache_dir: &Path) -> Result<PathBuf> {
        if let DatasetSource::Path { path } = self {
            if !path.exists() {
                anyhow::bail!("Dataset file not found: {}", path.display());
            }
            return Ok(path.clone());
        }

        let url = self.download_url().context("remote dataset without a url")?;
        let name = self.cache_file_name().context("remote dataset without a cache name")?;
        let cached = cache_dir.join(name);
        if cached.exists() {
            info!("Using cached dataset {:?}", cached);
            return Ok(cached);
        }

        std::fs::create_dir_all(cache_dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", cache_dir))?;
        download(&url, &cached).await?;
        Ok(cached)
    }
}

/// `<user cache>/pic50/datasets`
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("pic50")
        .join("datasets")
}

async fn download(url: &str, dest: &Path) -> Result<()> {
    info!("Downloading dataset from {}", url);

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to download {}: HTTP {}", url, response.status());
    }

    let content = response.bytes().await?;
    if looks_like_html(&content) {
        anyhow::bail!(
            "Download from {} returned an HTML page instead of CSV; is the file shared publicly?",
            url
        );
    }
    tokio::fs::write(dest, &content).await?;
    info!("Downloaded {} bytes to {:?}", content.len(), dest);
    Ok(())
}

fn looks_like_html(body: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&body[..body.len().min(256)]).to_ascii_lowercase();
    let head = head.trim_start();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

fn sanitise(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
