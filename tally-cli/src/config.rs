use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{default_ledger_path, ensure_tally_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub user: UserSection,
    pub ledger: LedgerSection,
    pub clock: ClockSection,
    pub history: HistorySection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserSection {
    /// Who saved transactions are attributed to
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerSection {
    /// Ledger file (default: ~/.tally/ledger.json)
    pub path: Option<PathBuf>,
    /// Used when --org is not passed
    pub default_organization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockSection {
    /// IANA timezone that decides "today" for undated lines
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistorySection {
    pub page_size: usize,
}

impl Default for UserSection {
    fn default() -> Self {
        Self {
            id: std::env::var("USER").unwrap_or_else(|_| "local".to_string()),
        }
    }
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            page_size: tally_ledger::history::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn ledger_path(&self) -> Result<PathBuf> {
        match &self.ledger.path {
            Some(p) => Ok(p.clone()),
            None => default_ledger_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
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

pub fn save_config(cfg: &Config) -> Result<()> {
    save_config_to(cfg, &config_path()?)
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
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
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[ledger]
default_organization = "household"

[clock]
timezone = "America/Chicago"
"#,
        )
        .unwrap();
        assert_eq!(cfg.ledger.default_organization.as_deref(), Some("household"));
        assert_eq!(cfg.clock.timezone, "America/Chicago");
        assert_eq!(cfg.history.page_size, 20);
        assert!(cfg.ledger.path.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        assert_eq!(load_config_from(&p).unwrap().history.page_size, 20);

        let mut cfg = Config::default();
        cfg.user.id = "alice".to_string();
        cfg.ledger.path = Some(dir.path().join("ledger.json"));
        cfg.history.page_size = 50;
        save_config_to(&cfg, &p).unwrap();

        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[history]\npage_size = \"many\"\n").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}
