// src/filing/config.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::extractors::normalize::NormalizationRules;
use crate::filing::catalog::SectionCatalog;
use crate::utils::error::ConfigError;

/// Everything a filing build needs besides the markup itself. Shared read-only
/// between filings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(rename = "sections")]
    pub catalog: Arc<SectionCatalog>,
    pub replacements: NormalizationRules,
}

impl EngineConfig {
    pub fn new(catalog: SectionCatalog, replacements: NormalizationRules) -> Self {
        Self { catalog: Arc::new(catalog), replacements }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config; missing keys fall back to the built-in defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json_str(&json)?;
        tracing::info!(
            "Loaded config from {}: {} sections, {} replacement rules",
            path.display(),
            config.catalog.entries().len(),
            config.replacements.pairs().len()
        );
        Ok(config)
    }
}
