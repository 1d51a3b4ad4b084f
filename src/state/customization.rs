/// Card customization parameters
///
/// This struct stores everything the user can change on a card.
/// It is created when the customize screen opens, mutated field by
/// field, and dropped when the user leaves. Nothing is persisted.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::DEFAULT_TEXT_COLOR;

/// The fixed set of font styles
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Serif,
    Sans,
    Cursive,
    Mono,
}

impl FontChoice {
    pub const ALL: [FontChoice; 4] = [
        FontChoice::Serif,
        FontChoice::Sans,
        FontChoice::Cursive,
        FontChoice::Mono,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FontChoice::Serif => "serif",
            FontChoice::Sans => "sans",
            FontChoice::Cursive => "cursive",
            FontChoice::Mono => "mono",
        }
    }
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontChoice::ALL
            .into_iter()
            .find(|font| font.name() == s)
            .ok_or_else(|| format!("unknown font {:?}", s))
    }
}

/// All user-adjustable card settings
#[derive(Debug, Clone, PartialEq)]
pub struct CardCustomization {
    /// Display-resolution URL copied from the selected photo
    pub image_url: String,

    /// Name shown under the heading.
    /// Stored exactly as typed; trimmed only when validating an export.
    pub name: String,

    pub font: FontChoice,

    /// Text color as entered. Both the hex field and the swatches
    /// write here, so they can never disagree.
    pub color: String,
}

impl CardCustomization {
    /// Defaults for a freshly opened card
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            name: String::new(),
            font: FontChoice::default(),
            color: DEFAULT_TEXT_COLOR.to_string(),
        }
    }

    /// Name to validate an export against
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    /// Whether the name line is drawn at all
    pub fn shows_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Font and color are untouched
    pub fn is_default_style(&self) -> bool {
        self.font == FontChoice::default() && self.color == DEFAULT_TEXT_COLOR
    }

    /// Back to default font and color, keeping image and name
    pub fn reset_style(&mut self) {
        self.font = FontChoice::default();
        self.color = DEFAULT_TEXT_COLOR.to_string();
    }
}
