use std::path::{Path, PathBuf};

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::mqtt::ConnectionConfig;

const CONFIG_DIR: &str = ".config/elevator-dashboard";
const CONFIG_FILE: &str = "config.toml";

/// Settings persisted between runs.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub broker: ConnectionConfig,
    pub ui: UiConfig,
    pub voice: VoiceConfig,
    pub sound: SoundConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub fps: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { fps: 30 }
    }
}

impl UiConfig {
    pub fn repaint_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / u64::from(self.fps.clamp(1, 120)))
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SoundConfig {
    pub muted: bool,
}

impl DashboardConfig {
    pub fn default_path() -> PathBuf {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Writes a default file when none exists yet.
    pub async fn ensure_default_config() -> Result<()> {
        Self::ensure_default_at(&Self::default_path()).await
    }

    pub async fn ensure_default_at(path: &Path) -> Result<()> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?;
        if exists {
            debug!("Config file present at {}", path.display());
            return Ok(());
        }
        info!("Creating default config at {}", path.display());
        DashboardConfig::default().save_to(path).await
    }

    pub async fn load() -> DashboardConfig {
        Self::load_from(&Self::default_path()).await
    }

    /// Reads `path`, falling back to defaults when the file is missing or
    /// unreadable.
    pub async fn load_from(path: &Path) -> DashboardConfig {
        match Self::read(path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("Using default config: {}", e);
                DashboardConfig::default()
            }
        }
    }

    async fn read(path: &Path) -> Result<DashboardConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| eyre!("Failed to parse config file: {}", e))
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file: {}", e))?;
        debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// Stores the broker settings of a successful connect.
    pub fn remember_broker(&mut self, broker: &ConnectionConfig) {
        self.broker = broker.clone();
        self.broker.password.clear();
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}
