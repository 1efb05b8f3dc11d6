use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$PESA_HOME`, or `~/.pesa`.
pub fn pesa_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PESA_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pesa"))
}

pub fn ensure_pesa_home() -> Result<PathBuf> {
    let dir = pesa_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn transactions_path() -> Result<PathBuf> {
    Ok(pesa_home()?.join("transactions.json"))
}
