//! Raw configuration sections as written in `socialcard.toml`.
//!
//! Every field is optional here; defaults and validation are applied by
//! [`PluginOptions::resolve`](super::PluginOptions::resolve).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FieldPath;

// ============================================================================
// [site]
// ============================================================================

/// `[site]` section: where pages come from and where cards go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Content directory scanned for Markdown/MDX pages.
    pub content: PathBuf,

    /// Public output root. Cards land in `<public>/<locale>/<slug>/`.
    pub public: PathBuf,

    /// JSON page manifest; replaces the content scan when set.
    pub manifest: Option<PathBuf>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            content: "content".into(),
            public: "public".into(),
            manifest: None,
        }
    }
}

// ============================================================================
// [card]
// ============================================================================

/// `[card]` section: card text, colors and fonts.
///
/// Font sizes are kept as raw TOML values so that `96`, `96.0` and `"96"`
/// all reach the integer check instead of failing at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSection {
    /// Language code -> site title, e.g. `{ en = "My Blog" }`.
    pub localized_titles: Option<toml::Table>,

    /// Language code -> author name.
    pub localized_authors: Option<toml::Table>,

    /// Fallback language for pages without a locale.
    pub default_language: Option<String>,

    /// Hex color (`#000000`) or image path/URL.
    pub background: Option<String>,

    /// Hex text color.
    pub font_color: Option<String>,

    pub title_font_size: Option<toml::Value>,

    pub subtitle_font_size: Option<toml::Value>,

    /// Font family token, e.g. `monospace`, `serif` or a family name.
    pub font_style: Option<String>,

    /// Custom font file; overrides `font_style`.
    pub font_file: Option<PathBuf>,

    /// Placed between site title and author in the subtitle.
    pub separator: Option<String>,

    /// File name of the generated card inside each page directory.
    pub card_file_name: Option<String>,

    /// JPEG quality (1-100).
    pub jpeg_quality: Option<i64>,
}

impl CardSection {
    pub const LOCALIZED_TITLES: FieldPath = FieldPath::new("card.localized_titles");
    pub const LOCALIZED_AUTHORS: FieldPath = FieldPath::new("card.localized_authors");
    pub const FONT_COLOR: FieldPath = FieldPath::new("card.font_color");
    pub const TITLE_FONT_SIZE: FieldPath = FieldPath::new("card.title_font_size");
    pub const SUBTITLE_FONT_SIZE: FieldPath = FieldPath::new("card.subtitle_font_size");
    pub const CARD_FILE_NAME: FieldPath = FieldPath::new("card.card_file_name");
    pub const JPEG_QUALITY: FieldPath = FieldPath::new("card.jpeg_quality");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_section_default() {
        let site = SiteSection::default();
        assert_eq!(site.content, PathBuf::from("content"));
        assert_eq!(site.public, PathBuf::from("public"));
        assert!(site.manifest.is_none());
    }

    #[test]
    fn test_card_section_keeps_raw_font_sizes() {
        let card: CardSection =
            toml::from_str("title_font_size = \"96\"\nsubtitle_font_size = 60.5").unwrap();
        assert_eq!(
            card.title_font_size,
            Some(toml::Value::String("96".into()))
        );
        assert_eq!(card.subtitle_font_size, Some(toml::Value::Float(60.5)));
    }

    #[test]
    fn test_localized_titles_preserve_order() {
        let card: CardSection =
            toml::from_str("[localized_titles]\nfr = \"Accueil\"\nen = \"Home\"").unwrap();
        let titles = card.localized_titles.unwrap();
        let keys: Vec<_> = titles.keys().map(String::as_str).collect();
        assert_eq!(keys, ["fr", "en"]);
    }
}
