//! Button actions and their settings payloads.
//!
//! Action identifiers live in the `me.hckr.findertags.` namespace and are
//! matched by prefix:
//!
//! | identifier            | effect                                   |
//! |-----------------------|------------------------------------------|
//! | `clear-tags`          | remove every tag                         |
//! | `color-wheel`         | step through the configured palette      |
//! | `custom-tag`          | toggle the tag named in the settings     |
//! | `tag-<color>`         | toggle a single color tag                |

use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::input_validation::{validate_color_name, validate_tag_name};
use crate::reconciler::{ApplyReport, SelectionReconciler, Transition};
use crate::store::TagBackend;
use crate::tags::{Color, LocalizationTable, Tag};

pub const ACTION_NAMESPACE: &str = "me.hckr.findertags.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    ClearTags,
    ColorWheel,
    CustomTag,
    ColorTag(Color),
}

impl ActionKind {
    /// Parses a host action identifier.
    ///
    /// Returns `None`, which callers treat as a no-op, for identifiers
    /// outside the `me.hckr.findertags.` namespace, for names other than
    /// `clear-tags`, `color-wheel`, `custom-tag` and `tag-<color>`, and for
    /// `tag-<color>` when `<color>` is not one of the seven palette colors.
    pub fn parse(action: &str) -> Option<Self> {
        let name = action.strip_prefix(ACTION_NAMESPACE)?;

        if name.starts_with("clear-tags") {
            Some(Self::ClearTags)
        } else if name.starts_with("color-wheel") {
            Some(Self::ColorWheel)
        } else if name.starts_with("custom-tag") {
            Some(Self::CustomTag)
        } else if let Some(color) = name.strip_prefix("tag-") {
            Color::palette_color(color).map(Self::ColorTag)
        } else {
            None
        }
    }

    pub fn identifier(&self) -> String {
        let name = match self {
            Self::ClearTags => "clear-tags".to_string(),
            Self::ColorWheel => "color-wheel".to_string(),
            Self::CustomTag => "custom-tag".to_string(),
            Self::ColorTag(color) => format!("tag-{}", color.name().to_lowercase()),
        };
        format!("{ACTION_NAMESPACE}{name}")
    }
}

/// One slot of the color wheel configurator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelSlot {
    pub color: String,
    pub enabled: bool,
}

impl WheelSlot {
    /// A slot needs a color name; a missing `enabled` counts as enabled.
    fn from_json(slot: &Value) -> Option<Self> {
        let color = slot.get("color")?.as_str()?.to_string();
        let enabled = match slot.get("enabled") {
            None => true,
            Some(enabled) => enabled.as_bool()?,
        };
        Some(Self { color, enabled })
    }
}

/// Per-button settings as sent by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSettings {
    pub tag: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<WheelSlot>>,
}

impl ActionSettings {
    /// Reads each field on its own. A field of the wrong type counts as
    /// unset and a malformed wheel slot is skipped; the other fields and
    /// slots are kept.
    pub fn from_json(value: &Value) -> Self {
        let settings = value.get("settings").unwrap_or(value);
        let text = |key: &str| settings.get(key).and_then(Value::as_str).map(str::to_string);

        let tags = settings.get("tags").and_then(Value::as_array).map(|slots| {
            slots
                .iter()
                .filter_map(|slot| {
                    let parsed = WheelSlot::from_json(slot);
                    if parsed.is_none() {
                        debug!(%slot, "skipping unreadable color wheel slot");
                    }
                    parsed
                })
                .collect()
        });

        Self {
            tag: text("tag"),
            color: text("color"),
            tags,
        }
    }

    pub fn custom(tag: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            color: Some(color.into()),
            tags: None,
        }
    }

    pub fn wheel(colors: &[(&str, bool)]) -> Self {
        Self {
            tags: Some(
                colors
                    .iter()
                    .map(|(color, enabled)| WheelSlot {
                        color: color.to_string(),
                        enabled: *enabled,
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    /// Enabled wheel colors in configured order, or `None` when the wheel
    /// yields no usable color.
    pub fn wheel_palette(&self) -> Option<Vec<Tag>> {
        let palette: Vec<Tag> = self
            .tags
            .as_ref()?
            .iter()
            .filter(|slot| slot.enabled)
            .filter_map(|slot| Color::palette_color(&slot.color))
            .map(Tag::palette)
            .collect();
        (!palette.is_empty()).then_some(palette)
    }
}

pub struct ActionRouter<B: TagBackend> {
    reconciler: SelectionReconciler<B>,
    default_palette: Vec<Tag>,
}

impl<B: TagBackend> ActionRouter<B> {
    pub fn new(reconciler: SelectionReconciler<B>, default_palette: Vec<Tag>) -> Self {
        Self {
            reconciler,
            default_palette,
        }
    }

    pub fn reconciler(&self) -> &SelectionReconciler<B> {
        &self.reconciler
    }

    fn localization(&self) -> &LocalizationTable {
        self.reconciler.store().localization()
    }

    /// Works out what an action does without touching any entry. Fails
    /// only on invalid settings.
    pub fn route(&self, kind: ActionKind, settings: &ActionSettings) -> Result<Transition> {
        let transition = match kind {
            ActionKind::ClearTags => Transition::Clear,
            ActionKind::ColorWheel => Transition::Cycle(
                settings
                    .wheel_palette()
                    .unwrap_or_else(|| self.default_palette.clone()),
            ),
            ActionKind::CustomTag => {
                let name = validate_tag_name(settings.tag.as_deref())?;
                let color = validate_color_name(settings.color.as_deref())?;
                Transition::Toggle(self.localization().delocalize(&Tag::new(color, name)))
            }
            ActionKind::ColorTag(color) => Transition::Toggle(Tag::palette(color)),
        };
        Ok(transition)
    }

    /// Handles a key press. Unknown actions and empty selections do
    /// nothing and return `Ok(None)`.
    pub fn dispatch(
        &self,
        action: &str,
        settings: &ActionSettings,
        selection: &[PathBuf],
    ) -> Result<Option<ApplyReport>> {
        let Some(kind) = ActionKind::parse(action) else {
            debug!(action, "ignoring unknown action");
            return Ok(None);
        };

        let transition = self.route(kind, settings)?;
        if selection.is_empty() {
            debug!(action, "nothing selected");
            return Ok(None);
        }

        Ok(Some(self.reconciler.reconcile(selection, &transition)))
    }

    pub fn title(&self, action: &str, settings: &ActionSettings) -> Option<String> {
        title_for(action, settings, self.localization())
    }
}

/// Title shown on a button face.
pub fn title_for(
    action: &str,
    settings: &ActionSettings,
    localization: &LocalizationTable,
) -> Option<String> {
    match ActionKind::parse(action)? {
        ActionKind::CustomTag => Some(
            settings
                .tag
                .as_deref()
                .filter(|tag| !tag.is_empty())
                .unwrap_or(Color::Custom.name())
                .to_string(),
        ),
        ActionKind::ColorTag(color) => Some(localization.localize(&Tag::palette(color)).name),
        ActionKind::ClearTags | ActionKind::ColorWheel => None,
    }
}
