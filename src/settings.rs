//! Environment-backed configuration
//!
//! Credentials and timeouts come from the process environment (optionally seeded
//! from a `.env` file). Portal-specific values are namespaced by a prefix, so two
//! flows can coexist: `GAE_LOGIN_URL`, `CRA_LOGIN_URL`, and so on.

use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Load variables from a `.env` file if one is present. Existing process
/// variables win over file entries.
pub fn load_env_file() {
    let _ = dotenvy::dotenv();
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Configuration(format!("missing required environment variable {name}"))),
    }
}

fn optional_bool(name: &str, default: bool) -> bool {
    env::var(name).map(|v| v.to_lowercase() == "true").unwrap_or(default)
}

fn optional_secs(name: &str, default: u64) -> Result<Duration> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| Error::Configuration(format!("{name} must be a number of seconds, got '{value}'"))),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

/// Run-wide settings shared by every flow
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Run the browser without a visible window
    pub headless: bool,
    /// Where diagnostics (screenshots) are written
    pub output_dir: PathBuf,
    /// Render ANSI section colors in console logs
    pub log_colors: bool,
}

impl RunnerSettings {
    /// Read `PAGEFLOW_HEADLESS`, `PAGEFLOW_OUTPUT_DIR`, `PAGEFLOW_LOG_COLORS`
    pub fn from_env() -> Self {
        load_env_file();
        RunnerSettings {
            headless: optional_bool("PAGEFLOW_HEADLESS", true),
            output_dir: env::var("PAGEFLOW_OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("output")),
            log_colors: optional_bool("PAGEFLOW_LOG_COLORS", false),
        }
    }
}

/// Credentials and timeouts for one portal, namespaced by an env prefix
#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub login_url: String,
    pub username: String,
    pub password: String,
    /// Budget for authentication waits
    pub auth_timeout: Duration,
    /// Budget for ordinary flow waits
    pub default_timeout: Duration,
}

impl PortalSettings {
    /// Read `{PREFIX}_LOGIN_URL`, `{PREFIX}_USERNAME`, `{PREFIX}_PASSWORD`
    /// (required) and `{PREFIX}_TIMEOUT_AUTH` / `{PREFIX}_TIMEOUT_DEFAULT`
    /// (seconds, defaulting to 30 and 10)
    pub fn from_env(prefix: &str) -> Result<Self> {
        load_env_file();
        Ok(PortalSettings {
            login_url: required(&format!("{prefix}_LOGIN_URL"))?,
            username: required(&format!("{prefix}_USERNAME"))?,
            password: required(&format!("{prefix}_PASSWORD"))?,
            auth_timeout: optional_secs(&format!("{prefix}_TIMEOUT_AUTH"), 30)?,
            default_timeout: optional_secs(&format!("{prefix}_TIMEOUT_DEFAULT"), 10)?,
        })
    }
}
