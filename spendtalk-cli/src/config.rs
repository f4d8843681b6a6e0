use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spendtalk_core::time::{parse_reference_date, today_in};
use spendtalk_core::{Language, DEFAULT_AMOUNT};
use spendtalk_interpret::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::ensure_spendtalk_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub interpret: InterpretSection,
    pub gemini: GeminiSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpretSection {
    /// "vi" or "en"
    pub language: String,
    /// IANA zone used to decide what "today" is
    pub timezone: String,
    pub default_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub enabled: bool,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for InterpretSection {
    fn default() -> Self {
        Self {
            language: Language::Vi.code().to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
            default_amount: DEFAULT_AMOUNT,
        }
    }
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Configured language, or `flag` when given on the command line.
    pub fn language(&self, flag: Option<&str>) -> Result<Language> {
        let code = flag.unwrap_or(&self.interpret.language);
        Ok(code.parse::<Language>()?)
    }

    /// `--date` when given, otherwise today in the configured timezone.
    pub fn reference_date(&self, flag: Option<&str>) -> Result<NaiveDate> {
        match flag {
            Some(s) => parse_reference_date(s),
            None => today_in(&self.interpret.timezone)
                .with_context(|| format!("[interpret] timezone in {}", display_path())),
        }
    }

    pub fn gemini_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_spendtalk_home()?.join("config.toml"))
}

fn display_path() -> String {
    config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    if p.exists() {
        println!("# {}", p.display());
    } else {
        println!("# {} (not written yet; showing defaults)", p.display());
    }
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
