//! Persisted user settings.
//!
//! Settings are stored as a single JSON document holding the global
//! [`Settings`] and one [`VaultSettings`] entry per vault.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::constants::{APP_DIR_NAME, DEFAULT_LOOPBACK_PORT, SETTINGS_FILE_NAME};

/// Process-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Identity of the preferred mount service.
    pub mount_service: Option<String>,
    /// Base directory for mount points created on behalf of vaults.
    pub mount_points_dir: Option<PathBuf>,
    /// Host name resolving to the loopback interface.
    pub loopback_alias: Option<String>,
}

/// Settings of a single vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSettings {
    /// Stable id, also used as volume id.
    pub id: String,
    /// Name shown to the user.
    pub display_name: String,
    /// User chosen mount point, either a directory or a drive letter like `X:\`.
    pub mount_point: Option<PathBuf>,
    /// Identity of the mount service preferred for this vault.
    pub mount_service: Option<String>,
    pub read_only: bool,
    /// Loopback port for network based services.
    pub port: u16,
    /// Backend specific mount flags. Blank means the service's defaults.
    pub mount_flags: Option<String>,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: String::new(),
            mount_point: None,
            mount_service: None,
            read_only: false,
            port: DEFAULT_LOOPBACK_PORT,
            mount_flags: None,
        }
    }
}

impl VaultSettings {
    /// Creates settings for a vault with the given display name.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Display name reduced to a single safe path component.
    ///
    /// Letters, digits, spaces, `.`, `_` and `-` are kept, everything else
    /// becomes `_`. A blank result, `.` and `..` become `_`.
    pub fn mount_name(&self) -> String {
        let normalized: String = self
            .display_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == ' ' || c == '.' || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        match normalized.as_str() {
            "" | "." | ".." => "_".to_string(),
            _ => normalized,
        }
    }

    /// Configured mount flags, or `None` if unset or blank.
    pub fn custom_mount_flags(&self) -> Option<&str> {
        self.mount_flags
            .as_deref()
            .map(str::trim)
            .filter(|flags| !flags.is_empty())
    }
}

/// On-disk settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub vaults: Vec<VaultSettings>,
}

impl Config {
    /// Default location of the settings file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads the settings file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {:?}", path))?;
        debug!("Loaded settings from {:?}", path);
        Ok(config)
    }

    /// Writes the settings file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Finds a vault by id or display name.
    pub fn vault(&self, key: &str) -> Option<&VaultSettings> {
        self.vaults
            .iter()
            .find(|v| v.id == key)
            .or_else(|| self.vaults.iter().find(|v| v.display_name == key))
    }
}
