//! Static platform table
//!
//! Built once at startup from the config's `[[platforms]]` entries and never
//! mutated afterwards. Everything else refers to platforms by id.

use ratatui::style::Color;
use serde::Serialize;
use std::collections::HashSet;

use crate::config::{ConfigError, PlatformEntry};
use crate::theme::parse_hex_color;

/// Glyph used when a platform has no icon configured
const FALLBACK_ICON: &str = "•";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Platform {
    pub id: String,
    pub label: String,
    pub icon: String,
    #[serde(skip)]
    pub color: Color,
    #[serde(rename = "color")]
    pub color_hex: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformTable {
    platforms: Vec<Platform>,
}

impl PlatformTable {
    /// Validate config entries and build the table, keeping their order
    pub fn from_entries(entries: &[PlatformEntry]) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::NoPlatforms);
        }

        let mut seen = HashSet::new();
        let mut platforms = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let id = entry.id.trim();
            if id.is_empty() {
                return Err(ConfigError::EmptyPlatformId(i));
            }
            if !seen.insert(id.to_string()) {
                return Err(ConfigError::DuplicatePlatform(id.to_string()));
            }
            let color = parse_hex_color(&entry.color).ok_or_else(|| ConfigError::InvalidColor {
                id: id.to_string(),
                color: entry.color.clone(),
            })?;
            let icon = if entry.icon.is_empty() {
                FALLBACK_ICON.to_string()
            } else {
                entry.icon.clone()
            };
            let label = if entry.label.trim().is_empty() {
                id.to_string()
            } else {
                entry.label.clone()
            };

            platforms.push(Platform {
                id: id.to_string(),
                label,
                icon,
                color,
                color_hex: entry.color.clone(),
            });
        }

        Ok(Self { platforms })
    }

    pub fn get(&self, id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn by_index(&self, index: usize) -> Option<&Platform> {
        self.platforms.get(index)
    }

    /// Table as pretty JSON (for `--platforms`)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.platforms)
    }
}

impl Default for PlatformTable {
    fn default() -> Self {
        // The built-in entries are known to be valid
        Self::from_entries(&crate::config::default_platforms())
            .unwrap_or(Self { platforms: Vec::new() })
    }
}
