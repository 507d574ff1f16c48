//! Chain configuration file

use std::path::Path;

use anyhow::{Context, Result};
use l2cache::SoftCacheConfig;
use serde::Deserialize;

/// Shape of the simulated decorator chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Id of the shared cache
    pub id: String,

    /// SoftCache settings
    pub soft: SoftCacheConfig,

    /// Wrap the soft cache in a LoggingCache
    pub logging: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            soft: SoftCacheConfig::default(),
            logging: true,
        }
    }
}

impl ChainConfig {
    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ChainConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.soft.validate()?;
        Ok(config)
    }
}
