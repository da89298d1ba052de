//! Static process configuration.
//!
//! Settings come from a TOML file (`$DIU_CONFIG`, default `diu.toml`) and
//! are then overridden by environment variables, which may be provided
//! through a `.env` file. Nothing is reloaded at runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use diu_platforms::hitbox::HitboxConfig;
use diu_platforms::twitch::TwitchConfig;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{Error, Result};

/// Environment variable pointing at the configuration file.
pub const CONFIG_PATH_ENV: &str = "DIU_CONFIG";

/// Configuration file used when `DIU_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "diu.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Where the topic mirror is published.
    pub url: String,
    /// Delay between two topic requests.
    pub poll_interval_ms: u64,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            url: "http://goalitium.kapsi.fi/dopelives_status2".to_string(),
            poll_interval_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub topic: TopicConfig,
    /// Appended to every status line; used alone when nothing is live.
    pub status_postfix: String,
    pub http: HttpConfig,
    pub twitch: TwitchConfig,
    pub hitbox: HitboxConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            topic: TopicConfig::default(),
            status_postfix: "Join us in our main chat: http://dopelives.com".to_string(),
            http: HttpConfig::default(),
            twitch: TwitchConfig::default(),
            hitbox: HitboxConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the configured file and the process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_path(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML file. A missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                info!(path = %path.display(), "Loaded configuration file");
                Self::from_toml_str(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Override settings from environment-style variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        set(&mut self.topic.url, "DIU_TOPIC_URL");
        set(&mut self.status_postfix, "DIU_STATUS_POSTFIX");
        set(&mut self.twitch.channel, "TWITCH_CHANNEL");
        set(&mut self.twitch.token, "TWITCH_TOKEN");
        set(&mut self.hitbox.channel, "HITBOX_CHANNEL");
        set(&mut self.hitbox.token, "HITBOX_TOKEN");
        set(&mut self.hitbox.default_category, "HITBOX_DEFAULT_CATEGORY");

        if let Some(value) = lookup("DIU_POLL_INTERVAL_MS") {
            self.topic.poll_interval_ms = value.trim().parse().map_err(|_| {
                Error::config(format!("DIU_POLL_INTERVAL_MS is not a number: {value:?}"))
            })?;
        }
        Ok(())
    }

    /// Reject settings the updater can't run with.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("topic.url", &self.topic.url),
            ("twitch.channel", &self.twitch.channel),
            ("twitch.token", &self.twitch.token),
            ("hitbox.channel", &self.hitbox.channel),
            ("hitbox.token", &self.hitbox.token),
            ("hitbox.default_category", &self.hitbox.default_category),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::config(format!("{name} must be set")));
        }

        if self.topic.poll_interval_ms == 0 {
            return Err(Error::config("topic.poll_interval_ms must be positive"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.topic.poll_interval_ms)
    }
}
