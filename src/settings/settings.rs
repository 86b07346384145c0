// Settings management and persistence
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when no settings path is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "trackdeck.json";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Music library settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory scanned for music. Track paths are stored relative to it.
    pub root: PathBuf,
    /// File suffixes (with leading period) that get a metadata provider
    pub extensions: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        let root = std::env::var("HOME")
            .map(|home| PathBuf::from(home).join("Music"))
            .unwrap_or_else(|_| PathBuf::from("Music"));

        Self {
            root,
            extensions: [".mp3", ".flac", ".ogg", ".m4a", ".opus", ".wav"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file caching the library information. Relative paths are
    /// resolved against the directory holding the settings file.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("trackdeck.sqlite"),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub server: ServerSettings,
    pub library: LibrarySettings,
    pub database: DatabaseSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSettings::default(),
            library: LibrarySettings::default(),
            database: DatabaseSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from file, or return defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        let settings: AppSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings file {}", path.display()))?;

        info!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Database file location, resolved against the settings file's directory
    pub fn database_path(&self, settings_path: &Path) -> PathBuf {
        if self.database.path.is_absolute() {
            return self.database.path.clone();
        }
        settings_path
            .parent()
            .map(|dir| dir.join(&self.database.path))
            .unwrap_or_else(|| self.database.path.clone())
    }
}
