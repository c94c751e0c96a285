use alltag_core::parse_timezone;
use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_store_path, ensure_alltag_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Owner of every task and location this CLI touches.
    /// Falls back to `$USER` when unset.
    pub username: Option<String>,

    /// IANA time zone used to decide when a day starts.
    pub timezone: String,

    /// JSON record store. Defaults to `~/.alltag/store.json`.
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            timezone: std::env::var("TZ")
                .ok()
                .filter(|tz| parse_timezone(tz).is_ok())
                .unwrap_or_else(|| "UTC".to_string()),
            store_path: None,
        }
    }
}

impl Config {
    /// `$ALLTAG_USER` beats the config file, which beats `$USER`.
    pub fn resolve_username(&self) -> Result<String> {
        let candidates = [
            std::env::var("ALLTAG_USER").ok(),
            self.username.clone(),
            std::env::var("USER").ok(),
        ];
        match candidates.into_iter().flatten().find(|u| !u.trim().is_empty()) {
            Some(user) => Ok(user.trim().to_string()),
            None => bail!("no user name configured (set `username` in config.toml or ALLTAG_USER)"),
        }
    }

    pub fn resolve_timezone(&self) -> Result<Tz> {
        parse_timezone(&self.timezone).context("check `timezone` in config.toml")
    }

    pub fn resolve_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(p) => Ok(p.clone()),
            None => default_store_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_alltag_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
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

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("config file: {}", config_path()?.display());
    println!("username:    {}", cfg.resolve_username()?);
    println!("timezone:    {}", cfg.resolve_timezone()?);
    println!("store:       {}", cfg.resolve_store_path()?.display());
    Ok(())
}
