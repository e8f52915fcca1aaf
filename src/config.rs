/// User configuration
///
/// Stored as JSON next to the other per-user settings:
/// - Linux: ~/.config/clip-lookup/config.json
/// - macOS: ~/Library/Application Support/clip-lookup/config.json
/// - Windows: %APPDATA%\clip-lookup\config.json
///
/// Every field is optional in the file; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::state::classify::TagPrecedence;

const APP_DIR: &str = "clip-lookup";
const CONFIG_FILE: &str = "config.json";

/// Fastest allowed clipboard poll
const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite catalog holding `resource_data` and `rg_4k_files`
    pub database_path: PathBuf,
    /// Clipboard poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Whether the deleted highlight or the category color wins a row's background
    pub tag_precedence: TagPrecedence,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            poll_interval_ms: 1000,
            tag_precedence: TagPrecedence::default(),
            window_width: 1200.0,
            window_height: 200.0,
        }
    }
}

/// `<data_dir>/clip-lookup/disk_info.db`
fn default_database_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default();

    path.push(APP_DIR);
    path.push("disk_info.db");
    path
}

impl AppConfig {
    /// Where the config file lives for this user
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push(APP_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Load the user's config, falling back to defaults on any problem
    pub fn load_or_default() -> Self {
        let loaded = Self::config_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                warn!("⚠️  Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Read a config file. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("⚙️  No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        info!("⚙️  Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to the user's config location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}
