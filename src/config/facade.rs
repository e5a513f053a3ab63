//! ConfigLoader facade delegating to the merge service.

use super::merge::service::MergeService;
use super::BridgeConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the default config file (if present) and the environment.
    pub fn load() -> Result<BridgeConfig, ConfigError> {
        MergeService::load()
    }

    /// Load from a specific file with the environment overlay.
    pub fn load_from_file(path: &Path) -> Result<BridgeConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Parse a TOML document over the defaults, without the environment.
    pub fn from_toml_str(content: &str) -> Result<BridgeConfig, ConfigError> {
        MergeService::from_toml_str(content)
    }

    /// Create default configuration.
    pub fn default() -> BridgeConfig {
        BridgeConfig::default()
    }
}
