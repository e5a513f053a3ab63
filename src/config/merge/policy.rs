//! Lowest layer of every merge: the serialized defaults.

use crate::config::BridgeConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&BridgeConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
