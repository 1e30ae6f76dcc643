use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn settings_file_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("unable to resolve config directory")?;
    Ok(base.join("clipcrop").join("settings.json"))
}

pub fn log_file_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join("clipcrop").join("clipcrop.log"))
}
