use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the webhook URL. Never read from the config file.
pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK";

const DEFAULT_ARTIFACT_URL: &str = "https://www.deltaconnected.com/arcdps/x64/d3d9.dll";
const DEFAULT_CHECKSUM_URL: &str = "https://www.deltaconnected.com/arcdps/x64/d3d9.dll.md5sum";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingWebhook(&'static str),
    #[error("invalid URL for {field}: {value:?}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{field} must use http or https, got {scheme:?}")]
    UnsupportedScheme { field: &'static str, scheme: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Look and feel of the webhook embed (optional `[embed]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Embed title shown when the artifact changes.
    pub title: String,
    /// Embed side-bar color as a 24-bit RGB integer.
    pub color: u32,
    /// Footer label; the poll interval is appended to it.
    pub footer: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            title: "ArcDPS has updated!".to_string(),
            color: 12124160,
            footer: "ArcDPS Monitor".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/arcmon/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Monitored file; HEAD target for `Last-Modified`, also the download link in notifications.
    pub artifact_url: String,
    /// Plain-text checksum resource (`<checksum> <filename>`).
    pub checksum_url: String,
    /// Seconds between checks.
    pub poll_interval_secs: u64,
    /// Total time bound for each HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// Connect time bound for each HTTP request, in seconds.
    pub connect_timeout_secs: u64,
    /// State file override; defaults to `~/.local/state/arcmon/state.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub embed: EmbedConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            artifact_url: DEFAULT_ARTIFACT_URL.to_string(),
            checksum_url: DEFAULT_CHECKSUM_URL.to_string(),
            poll_interval_secs: 600,
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            state_file: None,
            embed: EmbedConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check URLs and durations. Called after every load so a bad file fails at startup.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        validate_url("artifact_url", &self.artifact_url)?;
        validate_url("checksum_url", &self.checksum_url)?;
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero("poll_interval_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("request_timeout_secs"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Zero("connect_timeout_secs"));
        }
        Ok(())
    }

    /// Resolved state file path: the configured override or the XDG default.
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(p) => Ok(p.clone()),
            None => default_state_path(),
        }
    }
}

fn validate_url(field: &'static str, value: &str) -> std::result::Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::UnsupportedScheme {
            field,
            scheme: other.to_string(),
        }),
    }
}

/// Validate a webhook URL taken from the environment. Empty counts as missing.
pub fn webhook_url_from(value: Option<String>) -> std::result::Result<String, ConfigError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingWebhook(WEBHOOK_ENV))?;
    validate_url("webhook URL", &value)?;
    Ok(value)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("arcmon")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Default path for the state file: `~/.local/state/arcmon/state.json`.
pub fn default_state_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("arcmon")?;
    Ok(xdg_dirs.get_state_home().join("arcmon").join("state.json"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MonitorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MonitorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<MonitorConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: MonitorConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}
