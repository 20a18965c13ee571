//! YAML configuration.
//!
//! ```yaml
//! preferencesPath: /Users/me/Library/SyncedPreferences/com.apple.finder.plist
//! localize: true
//! palette: [Red, Green, Blue]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TagError};
use crate::tags::localizer::default_preferences_path;
use crate::tags::{palette_tags, Color, LocalizationTable, Tag};

pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("finder-tags").join(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaggerConfig {
    /// Finder synced preferences holding the localized color names.
    pub preferences_path: Option<PathBuf>,
    /// Write palette tags with their localized names.
    pub localize: bool,
    /// Color wheel used when an action does not configure one.
    pub palette: Vec<String>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            preferences_path: None,
            localize: true,
            palette: Vec::new(),
        }
    }
}

impl TaggerConfig {
    /// Loads `path`, or the default location when `None`. A missing file
    /// gives the defaults; an unreadable one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| TagError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|message| TagError::Config { path, message })
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.preferences_path.clone().or_else(default_preferences_path)
    }

    pub fn localization_table(&self) -> LocalizationTable {
        match self.preferences_path() {
            Some(path) => LocalizationTable::load(&path),
            None => LocalizationTable::empty(),
        }
    }

    /// Configured color wheel; unknown names are dropped and an empty
    /// result falls back to all seven colors.
    pub fn palette_tags(&self) -> Vec<Tag> {
        let configured: Vec<Tag> = self
            .palette
            .iter()
            .filter_map(|name| {
                let color = Color::palette_color(name);
                if color.is_none() {
                    warn!(color = %name, "ignoring unknown palette color");
                }
                color
            })
            .map(Tag::palette)
            .collect();

        if configured.is_empty() {
            palette_tags()
        } else {
            configured
        }
    }
}
