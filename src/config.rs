// Runtime configuration, read from the environment (and an optional `.env`
// loaded by `main`).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://myrpl.ar";
pub const DEFAULT_COURSES_DIR: &str = "courses";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:127.0) Gecko/20100101 Firefox/127.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub courses_dir: PathBuf,
    pub secrets_path: PathBuf,
    pub timeout: Duration,
    /// Token override; skips the stored token when set.
    pub bearer_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match get("MYRPL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| Error::Config {
                reason: format!("MYRPL_TIMEOUT_SECS=`{raw}`: {e}"),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let secrets_path = match get("MYRPL_SECRETS_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_secrets_path()?,
        };

        Ok(Config {
            base_url: get("MYRPL_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            courses_dir: get("MYRPL_COURSES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_COURSES_DIR)),
            secrets_path,
            timeout: Duration::from_secs(timeout_secs),
            bearer_token: get("MYRPL_BEARER_TOKEN"),
        })
    }
}

fn default_secrets_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| Error::Config {
        reason: "no user config directory, set MYRPL_SECRETS_PATH".to_string(),
    })?;
    Ok(dir.join("myrpl").join("secrets.toml"))
}
