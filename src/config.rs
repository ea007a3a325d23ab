use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

pub const APP_DIR: &str = "tempmail_client";
pub const STORE_FILE: &str = "saved_emails.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub storage_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.mail.tm".to_string(),
            request_timeout_secs: 10,
            poll_interval_secs: 5,
            storage_path: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| Error::Config("no config dir available".into()))?
        .join(APP_DIR))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

/// Loads `config.toml`, writing a template with the defaults on first run.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sample = Config::default();
        let tom = toml::to_string_pretty(&sample).map_err(|e| Error::Config(e.to_string()))?;
        if let Err(e) = fs::write(path, tom) {
            log::warn!("could not write template config {}: {e}", path.display());
        } else {
            log::info!("created template config at {}", path.display());
        }
        return Ok(sample);
    }
    let s = fs::read_to_string(path)?;
    toml::from_str(&s).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Where the saved-address file lives: the configured override, else the
/// per-OS application-data directory, else the working directory.
pub fn resolve_store_path(cfg: &Config) -> PathBuf {
    if let Some(p) = &cfg.storage_path {
        return PathBuf::from(p);
    }
    match config_dir() {
        Ok(dir) => match fs::create_dir_all(&dir) {
            Ok(()) => dir.join(STORE_FILE),
            Err(e) => {
                log::warn!("could not create {}: {e}", dir.display());
                PathBuf::from(STORE_FILE)
            }
        },
        Err(e) => {
            log::warn!("{e}");
            PathBuf::from(STORE_FILE)
        }
    }
}

/// A `saved_emails.json` shipped next to the executable, used to seed first runs.
pub fn bundled_store_template() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.parent()?.join(STORE_FILE);
    candidate.is_file().then_some(candidate)
}
