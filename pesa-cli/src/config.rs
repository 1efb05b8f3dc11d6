use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::state::{ensure_pesa_home, pesa_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub ingest: IngestSection,
    pub query: QuerySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Label only; any OpenAI-compatible endpoint works
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// IANA zone used for "now"
    pub timezone: String,
    /// false = strict mode: invalid synthesized types fail the import
    pub self_heal: bool,
    pub summary_anchor: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub default_window_days: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            timezone: "Africa/Nairobi".to_string(),
            self_heal: true,
            summary_anchor: true,
        }
    }
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            default_window_days: pesa_query::DEFAULT_WINDOW_DAYS,
        }
    }
}

impl Config {
    /// Wall-clock time in the configured zone. Unknown zones fall back to UTC.
    pub fn now(&self) -> NaiveDateTime {
        match self.ingest.timezone.parse::<Tz>() {
            Ok(tz) => Utc::now().with_timezone(&tz).naive_local(),
            Err(_) => {
                warn!(timezone = %self.ingest.timezone, "unknown timezone; using UTC");
                Utc::now().naive_utc()
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(pesa_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_pesa_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
