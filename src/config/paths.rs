//! Platform directories for config and data

use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "agent-bridge", "agent-bridge")
}

/// `~/.config/agent-bridge/config.toml` on Linux
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Default sled database directory
pub fn default_store_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("store"))
}
