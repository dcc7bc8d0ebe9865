//! Configuration loading
//!
//! A configuration file is JSON (`.json`) or TOML (`.toml`). Layout keys may
//! sit at the top level of the document or under a `layout` table; graft keys
//! live under `graft`. An explicit `layout` table wins over top-level keys.

use ptdgen_core::{GraftConfig, LayoutConfig, PtdConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigDocument {
    layout: Option<LayoutConfig>,
    graft: Option<GraftConfig>,
    #[serde(flatten)]
    top_level: LayoutConfig,
}

impl From<ConfigDocument> for PtdConfig {
    fn from(doc: ConfigDocument) -> Self {
        PtdConfig {
            layout: doc.layout.unwrap_or(doc.top_level),
            graft: doc.graft.unwrap_or_default(),
        }
    }
}

/// Parse configuration text in the given format
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<PtdConfig, ConfigError> {
    let doc: ConfigDocument = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(doc.into())
}

/// Load configuration, failing on any read or parse problem
pub fn load_config_strict(path: &Path) -> Result<PtdConfig, ConfigError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format)
}

/// Load configuration leniently.
///
/// No path, an unreadable file or an invalid document all yield the defaults;
/// the latter two are logged as warnings.
pub fn load_config(path: Option<&Path>) -> PtdConfig {
    let Some(path) = path else {
        return PtdConfig::default();
    };
    match load_config_strict(path) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            tracing::warn!("{e}; using default configuration");
            PtdConfig::default()
        }
    }
}
