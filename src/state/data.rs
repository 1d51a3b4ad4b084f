/// Shared data structures for the application state
///
/// These structs represent the photo records that flow from the
/// source client through the gallery into the customize screen.
/// Field names follow the source's JSON so they deserialize directly.
use serde::{Deserialize, Serialize};

/// Represents a single browsable photo
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GalleryItem {
    /// Stable identifier assigned by the source
    pub id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Dominant color as a hex string, used for placeholders
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt_description: Option<String>,
    pub urls: ImageUrls,
    pub links: ItemLinks,
    pub user: Author,
}

/// Resolution variants of one photo
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageUrls {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub full: String,
    /// Display resolution (~1080px wide)
    pub regular: String,
    #[serde(default)]
    pub small: String,
    pub thumb: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemLinks {
    #[serde(default)]
    pub html: String,
    /// Must be hit when the photo is actually used
    pub download_location: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub portfolio_url: Option<String>,
}

/// One page of search results as returned by the source
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub total: u64,
    pub total_pages: u32,
    pub results: Vec<GalleryItem>,
}

impl GalleryItem {
    /// URL used for the card background
    pub fn display_url(&self) -> &str {
        &self.urls.regular
    }

    /// URL used for grid tiles
    pub fn thumbnail_url(&self) -> &str {
        if self.urls.small.is_empty() {
            &self.urls.thumb
        } else {
            &self.urls.small
        }
    }

    pub fn alt_text(&self) -> &str {
        self.alt_description
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("Unsplash image")
    }

    /// Credit line required by the source's guidelines
    pub fn attribution(&self) -> String {
        format!("Photo by {} on Unsplash", self.user.name)
    }

    /// Photographer's portfolio, or their profile on the source
    pub fn author_link(&self) -> String {
        match self.user.portfolio_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("https://unsplash.com/@{}", self.user.username),
        }
    }

    /// Convert to JSON string for the handoff slot
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string (from the handoff slot)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
