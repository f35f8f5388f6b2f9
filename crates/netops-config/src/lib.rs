//! Shared configuration for the netops CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `netops_core::BackendConfig`. The CLI layers its global
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use netops_core::model::DEFAULT_TARIFF_PER_KWH;
use netops_core::{AuthCredentials, BackendConfig, EntityId, TlsVerification};

/// Keyring service name; entries are keyed `<profile>/<secret>`.
pub const KEYRING_SERVICE: &str = "netops";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
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

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::UnknownProfile { name })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Background alert poll interval, seconds.
    #[serde(default = "default_alert_poll")]
    pub alert_poll_secs: u64,

    /// Live-view poll interval, seconds.
    #[serde(default = "default_live_poll")]
    pub live_poll_secs: u64,

    /// Cost per kWh for readings recorded without a cost.
    #[serde(default = "default_tariff")]
    pub energy_tariff: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            alert_poll_secs: default_alert_poll(),
            live_poll_secs: default_live_poll(),
            energy_tariff: default_tariff(),
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
fn default_alert_poll() -> u64 {
    30
}
fn default_live_poll() -> u64 {
    10
}
fn default_tariff() -> f64 {
    DEFAULT_TARIFF_PER_KWH
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Project URL (e.g. "https://abc.example.co").
    pub url: String,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// User access token (plaintext, prefer keyring or env var).
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    pub access_token_env: Option<String>,

    /// Profile id of the operator, for role checks and report attribution.
    pub acting_user: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    pub timeout: Option<u64>,
    pub alert_poll_secs: Option<u64>,
    pub live_poll_secs: Option<u64>,
    pub energy_tariff: Option<f64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "netops", "netops").map_or_else(
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
    p.push("netops");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if present), then `NETOPS_*`
/// environment variables (`__` separates nesting, e.g.
/// `NETOPS_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETOPS_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file is missing or invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_secret(profile_name: &str, key: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{key}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Store a secret for `profile_name` in the system keyring.
pub fn store_secret(profile_name: &str, key: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{key}"))?;
    entry.set_password(secret)?;
    Ok(())
}

/// Env var named by the profile, then keyring, then plaintext.
fn resolve_secret(
    env_name: Option<&String>,
    plaintext: Option<&String>,
    profile_name: &str,
    key: &str,
) -> Option<SecretString> {
    if let Some(val) = env_name.and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }
    if let Some(secret) = keyring_secret(profile_name, key) {
        return Some(secret);
    }
    plaintext.cloned().map(SecretString::from)
}

/// Resolve the API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.api_key_env.as_ref(),
        profile.api_key.as_ref(),
        profile_name,
        "api-key",
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// The optional user access token; absent is not an error.
pub fn resolve_access_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_secret(
        profile.access_token_env.as_ref(),
        profile.access_token.as_ref(),
        profile_name,
        "access-token",
    )
}

/// Build a `BackendConfig` from a profile, with `defaults` filling the
/// tuning knobs the profile leaves unset. No CLI flag overrides.
pub fn profile_to_backend_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<BackendConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let auth = AuthCredentials::ApiKey {
        api_key: resolve_api_key(profile, profile_name)?,
        access_token: resolve_access_token(profile, profile_name),
    };

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let energy_tariff = profile.energy_tariff.unwrap_or(defaults.energy_tariff);
    if !energy_tariff.is_finite() || energy_tariff < 0.0 {
        return Err(ConfigError::Validation {
            field: "energy_tariff".into(),
            reason: format!("must be a non-negative number, got {energy_tariff}"),
        });
    }

    let mut cfg = BackendConfig::new(url, auth);
    cfg.tls = tls;
    cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    cfg.acting_user = profile.acting_user.clone().map(EntityId::from);
    cfg.alert_poll_interval =
        Duration::from_secs(profile.alert_poll_secs.unwrap_or(defaults.alert_poll_secs));
    cfg.live_poll_interval =
        Duration::from_secs(profile.live_poll_secs.unwrap_or(defaults.live_poll_secs));
    cfg.energy_tariff = energy_tariff;
    Ok(cfg)
}
