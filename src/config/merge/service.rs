//! MergeService: orchestrates sources and deserializes to BridgeConfig.

use super::policy;
use crate::config::sources::{environment, file};
use crate::config::BridgeConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> user config file -> environment (highest).
    pub fn load() -> Result<BridgeConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = file::add_default_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<BridgeConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = file::add_to_builder(builder, path)?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }

    pub fn from_toml_str(content: &str) -> Result<BridgeConfig, ConfigError> {
        policy::builder_with_defaults()?
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
