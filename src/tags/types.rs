use serde::{Deserialize, Serialize};

/// Finder label color. The discriminant is the digit stored after the
/// newline in the on-disk tag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Custom = 0,
    Gray = 1,
    Green = 2,
    Purple = 3,
    Blue = 4,
    Yellow = 5,
    Red = 6,
    Orange = 7,
}

/// Canonical cycling order of the color wheel.
pub const PALETTE: [Color; 7] = [
    Color::Red,
    Color::Orange,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Purple,
    Color::Gray,
];

impl Color {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Custom),
            1 => Some(Self::Gray),
            2 => Some(Self::Green),
            3 => Some(Self::Purple),
            4 => Some(Self::Blue),
            5 => Some(Self::Yellow),
            6 => Some(Self::Red),
            7 => Some(Self::Orange),
            _ => None,
        }
    }

    /// English name, which is also the canonical tag name of palette colors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Custom => "Custom",
            Self::Gray => "Gray",
            Self::Green => "Green",
            Self::Purple => "Purple",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
            Self::Red => "Red",
            Self::Orange => "Orange",
        }
    }

    /// Case-insensitive lookup. Unknown names are custom tags.
    pub fn from_name(name: &str) -> Self {
        Self::palette_color(name).unwrap_or(Self::Custom)
    }

    /// The palette color whose canonical name matches `name`, if any.
    pub fn palette_color(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .copied()
            .find(|color| names_match(color.name(), name))
    }

    pub fn is_palette(self) -> bool {
        self != Self::Custom
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A Finder tag: a name plus the color it is displayed with.
///
/// Equality for membership purposes is by case-insensitive name only; use
/// [`Tag::same_name`] rather than `==` when reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub color: Color,
    pub name: String,
}

impl Tag {
    pub fn new(color: Color, name: impl Into<String>) -> Self {
        Self {
            color,
            name: name.into(),
        }
    }

    /// The canonical (English) tag for a palette color.
    pub fn palette(color: Color) -> Self {
        Self::new(color, color.name())
    }

    pub fn same_name(&self, other: &Tag) -> bool {
        names_match(&self.name, &other.name)
    }

    fn name_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// The canonical tags of the full color wheel.
pub fn palette_tags() -> Vec<Tag> {
    PALETTE.iter().copied().map(Tag::palette).collect()
}

pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Order-independent comparison of two tag lists by case-insensitive name.
pub fn same_tag_names(a: &[Tag], b: &[Tag]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut left: Vec<String> = a.iter().map(Tag::name_key).collect();
    let mut right: Vec<String> = b.iter().map(Tag::name_key).collect();
    left.sort();
    right.sort();
    left == right
}
