use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A config plus whatever went wrong while reading it
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    fn fallback(warning: String) -> Self {
        Self { config: AppConfig::default(), warnings: vec![warning] }
    }
}

/// Default toast lifetime in milliseconds
pub const DEFAULT_TOAST_MILLIS: u64 = 2500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("platform table is empty")]
    NoPlatforms,
    #[error("platform #{0} has an empty id")]
    EmptyPlatformId(usize),
    #[error("duplicate platform id '{0}'")]
    DuplicatePlatform(String),
    #[error("invalid color '{color}' for platform '{id}'")]
    InvalidColor { id: String, color: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformEntry {
    pub id: String,  // "facebook", "twitter", ...
    pub label: String,
    #[serde(default)]
    pub icon: String,  // Nerd Font glyph
    pub color: String,  // "#RRGGBB" or "#RGB"
}

impl PlatformEntry {
    fn new(id: &str, label: &str, icon: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }
}

/// Built-in platform table used when the config has none
pub fn default_platforms() -> Vec<PlatformEntry> {
    vec![
        PlatformEntry::new("facebook", "Facebook", "\u{f09a}", "#f97316"),
        PlatformEntry::new("linkedin", "LinkedIn", "\u{f0e1}", "#0A66C2"),
        PlatformEntry::new("instagram", "Instagram", "\u{f16d}", "#E1306C"),
        // Brand black is unreadable on dark terminals
        PlatformEntry::new("twitter", "Twitter (X)", "\u{f099}", "#E7E9EA"),
        PlatformEntry::new("youtube", "YouTube", "\u{f167}", "#FF0000"),
    ]
}

/// Optional `#RRGGBB` overrides for the UI palette
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

fn default_toast_millis() -> u64 {
    DEFAULT_TOAST_MILLIS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// How long a toast stays visible
    #[serde(default = "default_toast_millis")]
    pub toast_millis: u64,

    /// Mirror confirmation toasts as desktop notifications
    #[serde(default)]
    pub notifications: bool,

    /// Directory the media picker opens in (defaults to home)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_dir: Option<PathBuf>,

    /// Log level used when neither RUST_LOG nor --debug is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(default)]
    pub theme: ThemeConfig,

    /// Platforms offered by the selector, in display order
    #[serde(default = "default_platforms")]
    pub platforms: Vec<PlatformEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            toast_millis: DEFAULT_TOAST_MILLIS,
            notifications: false,
            media_dir: None,
            log_level: None,
            theme: ThemeConfig::default(),
            platforms: default_platforms(),
        }
    }
}

impl AppConfig {
    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("crosspost");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it
    pub fn load() -> Result<LoadedConfig> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => Ok(LoadedConfig::fallback(format!("{}; using defaults", e))),
        }
    }

    /// Load config from `path`; a missing file is created with defaults,
    /// an unreadable one falls back to defaults. Problems come back as
    /// warnings because logging is not set up yet.
    pub fn load_from(path: &Path) -> Result<LoadedConfig> {
        if path.exists() {
            let warning = match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(LoadedConfig { config, warnings: Vec::new() }),
                    Err(e) => format!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => format!("Failed to read config {}: {}", path.display(), e),
            };
            return Ok(LoadedConfig::fallback(warning));
        }

        let mut loaded = LoadedConfig { config: AppConfig::default(), warnings: Vec::new() };
        if let Err(e) = loaded.config.save_to(path) {
            loaded.warnings.push(format!("Could not write default config: {}", e));
        }
        Ok(loaded)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn toast_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.toast_millis)
    }

    /// Directory the media picker starts in
    pub fn media_start_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .filter(|p| p.is_dir())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"))
    }
}
