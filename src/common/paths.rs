//! Centralized path management for subburn

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the main subburn config directory; created on first save
pub fn subburn_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("subburn");

    Ok(config_dir)
}

/// Default location of the subburn config file
pub fn subburn_config_path() -> Result<PathBuf> {
    Ok(subburn_config_dir()?.join("subburn.toml"))
}
