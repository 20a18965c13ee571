//! Translation between canonical (English) color tag names and the names
//! Finder shows in the user's language.
//!
//! Finder keeps the localized names in its synced preferences under
//! `values.FinderTagDict.value.FinderTags`, as dictionaries of the form
//! `{ n = name; l = color code }`. User-created tags carry extra keys and
//! are ignored.

use std::path::{Path, PathBuf};

use plist::Value;
use tracing::debug;

use crate::tags::types::{names_match, Color, Tag, PALETTE};

const FINDER_TAGS_KEY_PATH: [&str; 4] = ["values", "FinderTagDict", "value", "FinderTags"];

/// Default location of Finder's synced preferences.
pub fn default_preferences_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library/SyncedPreferences/com.apple.finder.plist"))
}

/// Localized color names, sorted by color code. Loaded once at startup and
/// read-only afterwards; empty when Finder's preferences are unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationTable {
    entries: Vec<(Color, String)>,
}

impl LocalizationTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Color, String)>) -> Self {
        let mut entries: Vec<(Color, String)> = entries
            .into_iter()
            .filter(|(color, _)| color.is_palette())
            .collect();
        entries.sort_by_key(|(color, _)| color.code());
        Self { entries }
    }

    /// Reads the table from a Finder preferences plist. Any failure yields
    /// an empty table.
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(data) => Self::parse(&data),
            Err(err) => {
                debug!(path = %path.display(), %err, "finder preferences unavailable, tags stay unlocalized");
                Self::empty()
            }
        }
    }

    pub fn parse(data: &[u8]) -> Self {
        let Ok(value) = plist::from_bytes::<Value>(data) else {
            debug!("finder preferences are not a property list");
            return Self::empty();
        };

        let mut node = &value;
        for key in FINDER_TAGS_KEY_PATH {
            match node.as_dictionary().and_then(|dict| dict.get(key)) {
                Some(child) => node = child,
                None => return Self::empty(),
            }
        }

        let Some(items) = node.as_array() else {
            return Self::empty();
        };

        let entries = items
            .iter()
            .filter_map(|item| item.as_dictionary())
            .filter(|dict| dict.len() == 2)
            .filter_map(|dict| {
                let name = dict.get("n")?.as_string()?;
                let code = dict.get("l")?.as_signed_integer()?;
                if !(1..=7).contains(&code) {
                    return None;
                }
                Some((Color::from_code(code)?, name.to_string()))
            });

        Self::from_entries(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn localized_name(&self, color: Color) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == color)
            .map(|(_, name)| name.as_str())
    }

    /// Replaces a canonical color name with the user's localized spelling.
    pub fn localize(&self, tag: &Tag) -> Tag {
        let is_canonical = PALETTE.iter().any(|c| names_match(c.name(), &tag.name));
        match self.localized_name(tag.color) {
            Some(localized) if is_canonical => Tag::new(tag.color, localized),
            _ => tag.clone(),
        }
    }

    /// Replaces a localized color name with its canonical English name.
    pub fn delocalize(&self, tag: &Tag) -> Tag {
        let is_localized = self
            .entries
            .iter()
            .any(|(_, name)| names_match(name, &tag.name));
        if is_localized && tag.color.is_palette() {
            Tag::palette(tag.color)
        } else {
            tag.clone()
        }
    }
}
