//! Configuration for the store reporting client

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::constants;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub report: ReportSection,
}

/// Backend connection settings
#[derive(Debug, Default, Deserialize)]
pub struct ApiSection {
    /// Backend base URL, e.g. "http://127.0.0.1:5000"
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Report defaults
#[derive(Debug, Default, Deserialize)]
pub struct ReportSection {
    /// Length of the default date window, in days before today
    #[serde(default)]
    pub default_range_days: Option<i64>,
    /// Rows per page in terminal tables
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (strings vs numbers)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Main configuration struct with resolved values
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Default report window in days
    pub default_range_days: i64,
    /// Rows per page in terminal tables
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            default_range_days: constants::DEFAULT_RANGE_DAYS,
            page_size: constants::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Create config from file config and optional base URL override
    pub fn from_file(file_config: &FileConfig, base_url: Option<String>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| file_config.api.base_url.clone())
            .unwrap_or_else(|| constants::DEFAULT_BASE_URL.to_string());

        reqwest::Url::parse(&base_url)
            .with_context(|| format!("Invalid backend base_url: '{}'", base_url))?;

        let default_range_days = file_config
            .report
            .default_range_days
            .unwrap_or(constants::DEFAULT_RANGE_DAYS);
        if !(0..=constants::MAX_RANGE_DAYS).contains(&default_range_days) {
            anyhow::bail!(
                "report.default_range_days must be between 0 and {}, got {}",
                constants::MAX_RANGE_DAYS,
                default_range_days
            );
        }

        let page_size = file_config
            .report
            .page_size
            .unwrap_or(constants::DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            anyhow::bail!("report.page_size must be at least 1");
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(
                file_config
                    .api
                    .timeout_secs
                    .unwrap_or(constants::DEFAULT_TIMEOUT_SECS),
            ),
            default_range_days,
            page_size,
        })
    }
}
