use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$ALLTAG_HOME`, or `~/.alltag`.
pub fn alltag_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("ALLTAG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".alltag"))
}

pub fn ensure_alltag_home() -> Result<PathBuf> {
    let dir = alltag_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_store_path() -> Result<PathBuf> {
    Ok(ensure_alltag_home()?.join("store.json"))
}
