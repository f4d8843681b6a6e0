use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$SPENDTALK_HOME`, else `~/.spendtalk`.
pub fn spendtalk_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SPENDTALK_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".spendtalk"))
}

pub fn ensure_spendtalk_home() -> Result<PathBuf> {
    let dir = spendtalk_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
