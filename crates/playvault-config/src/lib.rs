//! Shared configuration for PlayVault tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `playvault_core::SdkConfig`. The CLI layers its global
//! flags on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use playvault_core::{HostSelection, RetryPolicy, SdkConfig};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

const KEYRING_SERVICE: &str = "playvault";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles (e.g. one per game or environment).
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Retry tuning for one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_fixed_delay_ms")]
    pub fixed_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            fixed_delay_ms: default_fixed_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_fixed_delay_ms() -> u64 {
    1000
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Candidate base URLs, probed in order.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Skip health probing and use the first host as is.
    #[serde(default)]
    pub fixed_host: bool,

    /// Health endpoint probed during host selection.
    pub health_path: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Override the default request timeout (seconds).
    pub timeout: Option<u64>,

    #[serde(default)]
    pub retry: RetrySettings,

    /// Lifetime of cached read responses (seconds). 0 disables caching.
    pub cache_ttl_secs: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("gg", "playvault", "playvault").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("playvault");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path. Layers: defaults, then the TOML file (if
/// present), then `PLAYVAULT_`-prefixed env vars with `__` as separator
/// (e.g. `PLAYVAULT_DEFAULTS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PLAYVAULT_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile lookup ──────────────────────────────────────────────────

impl Config {
    /// The profile named `name`, or the default profile when `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str, what: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{what}"),
    )?)
}

/// Resolve the game API key: profile env var, then keyring, then plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name, "api-key") {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Session persistence ─────────────────────────────────────────────

/// Session token saved by a previous sign-in, if any.
pub fn load_session_token(profile_name: &str) -> Option<SecretString> {
    keyring_entry(profile_name, "session-token")
        .ok()?
        .get_password()
        .ok()
        .map(SecretString::from)
}

pub fn store_session_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "session-token")?.set_password(token)?;
    Ok(())
}

pub fn clear_session_token(profile_name: &str) -> Result<(), ConfigError> {
    match keyring_entry(profile_name, "session-token")?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Translation to SdkConfig ────────────────────────────────────────

/// Parse and validate a profile's candidate hosts.
pub fn parse_hosts(hosts: &[String]) -> Result<Vec<Url>, ConfigError> {
    if hosts.is_empty() {
        return Err(ConfigError::Validation {
            field: "hosts".into(),
            reason: "at least one host is required".into(),
        });
    }
    hosts
        .iter()
        .map(|raw| {
            let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
                field: "hosts".into(),
                reason: format!("invalid URL: {raw}"),
            })?;
            if matches!(url.scheme(), "http" | "https") {
                Ok(url)
            } else {
                Err(ConfigError::Validation {
                    field: "hosts".into(),
                    reason: format!("unsupported scheme in {raw}"),
                })
            }
        })
        .collect()
}

/// Build an `SdkConfig` from a profile with an already-resolved API key.
pub fn profile_to_sdk_config(
    profile: &Profile,
    defaults: &Defaults,
    api_key: SecretString,
) -> Result<SdkConfig, ConfigError> {
    let hosts = parse_hosts(&profile.hosts)?;
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    let mut config = SdkConfig::new(hosts, api_key);
    config.host_selection = if profile.fixed_host {
        HostSelection::Fixed
    } else {
        HostSelection::Probe
    };
    if let Some(ref path) = profile.health_path {
        config.health_path.clone_from(path);
    }
    config.retry = RetryPolicy::new(
        profile.retry.max_retries,
        Duration::from_millis(profile.retry.fixed_delay_ms),
        timeout,
    );
    if let Some(ttl) = profile.cache_ttl_secs {
        config.cache_ttl = Duration::from_secs(ttl);
    }
    Ok(config)
}
