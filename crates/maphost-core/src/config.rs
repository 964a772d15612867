use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Hosts that may load inside the surface besides the active one (login providers).
pub const DEFAULT_SUPPORTED_HOSTS: [&str; 4] = [
    "discordapp.com",
    "discord.com",
    "telegram.org",
    "oauth.telegram.org",
];

/// HTTP engine parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent sent when the intercepted request carries none.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl EngineConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/maphost/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaphostConfig {
    /// URL of the hosted map application; its host is the initial active hostname.
    pub active_url: String,
    /// Extra hosts allowed to load inside the surface instead of an external browser.
    #[serde(default = "default_supported_hosts")]
    pub supported_hosts: Vec<String>,
    /// Optional engine tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub engine: Option<EngineConfig>,
}

fn default_supported_hosts() -> Vec<String> {
    DEFAULT_SUPPORTED_HOSTS.iter().map(|h| h.to_string()).collect()
}

impl Default for MaphostConfig {
    fn default() -> Self {
        Self {
            active_url: "https://map.example.com/".to_string(),
            supported_hosts: default_supported_hosts(),
            engine: None,
        }
    }
}

impl MaphostConfig {
    /// Host of `active_url`.
    pub fn active_host(&self) -> Result<String> {
        let parsed = url::Url::parse(&self.active_url)
            .with_context(|| format!("invalid active_url {:?}", self.active_url))?;
        parsed
            .host_str()
            .map(str::to_string)
            .with_context(|| format!("active_url {:?} has no host", self.active_url))
    }

    pub fn engine_or_default(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("maphost")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MaphostConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] with an explicit path.
pub fn load_or_init_at(path: &std::path::Path) -> Result<MaphostConfig> {
    if !path.exists() {
        let default_cfg = MaphostConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let cfg: MaphostConfig = toml::from_str(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
