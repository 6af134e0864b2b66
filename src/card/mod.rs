//! Social card generation.
//!
//! | Module       | Purpose                                       |
//! |--------------|-----------------------------------------------|
//! | `color`      | Hex color parsing                             |
//! | `text`       | Text layer rasterization boundary             |
//! | `background` | Solid or image base layer                     |
//! | `compose`    | Overlay and file encoding                     |
//!
//! A card is the text layer drawn over the background, both 1200×630.

pub mod background;
pub mod color;
pub mod compose;
pub mod text;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;

use crate::config::PluginOptions;
use crate::page::PageNode;
use crate::utils::path::url_to_relative;
use background::Background;
use compose::{compose, write_card};
use text::{TextLayer, TextRasterizer, check_dimensions};

/// Card width in pixels.
pub const WIDTH: u32 = 1200;
/// Card height in pixels.
pub const HEIGHT: u32 = 630;

// ============================================================================
// Requests
// ============================================================================

/// Everything needed to generate one page's card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRequest {
    pub locale: String,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub output: PathBuf,
}

/// Why a page gets no card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingSlug,
    MissingTitle,
    /// Card already on disk.
    Exists,
    /// Another page already writes this output path.
    Duplicate { first: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSlug => f.write_str("page without slug"),
            Self::MissingTitle => f.write_str("page without title"),
            Self::Exists => f.write_str("card already exists"),
            Self::Duplicate { first } => write!(f, "output path already claimed by {first}"),
        }
    }
}

impl CardRequest {
    /// Derive the request for `page`, or the reason it has none.
    ///
    /// The page's own title is the card title; the localized site title and
    /// author make up the subtitle.
    pub fn from_page(
        page: &PageNode,
        options: &PluginOptions,
        public_dir: &Path,
    ) -> Result<Self, SkipReason> {
        let locale = page
            .locale
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(options.default_language.as_str());

        let slug = page
            .slug
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(SkipReason::MissingSlug)?;
        let title = page
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(SkipReason::MissingTitle)?;

        let site_title = options
            .localized_titles
            .lookup(locale, &options.default_language);
        let author = options
            .localized_authors
            .lookup(locale, &options.default_language);

        Ok(Self {
            locale: locale.to_string(),
            slug: slug.to_string(),
            title: title.to_string(),
            subtitle: format_subtitle(site_title, author, &options.separator),
            output: output_path(public_dir, locale, slug, &options.card_file_name),
        })
    }

    /// `en/posts/hello/` style label for log lines.
    pub fn label(&self) -> String {
        label(&self.locale, &self.slug)
    }
}

/// `{locale}/{slug}` without a doubled slash.
pub fn label(locale: &str, slug: &str) -> String {
    format!("{locale}/{}", slug.trim_start_matches('/'))
}

/// `"{title} {sep} {author}"`, or whichever half is non-empty.
pub fn format_subtitle(title: &str, author: &str, separator: &str) -> String {
    match (title.is_empty(), author.is_empty()) {
        (false, false) => format!("{title} {separator} {author}"),
        (false, true) => title.to_string(),
        (true, false) => author.to_string(),
        (true, true) => String::new(),
    }
}

/// `public/<locale>/<slug>/<file>`, never escaping `public`.
pub fn output_path(public_dir: &Path, locale: &str, slug: &str, file_name: &str) -> PathBuf {
    public_dir
        .join(url_to_relative(locale))
        .join(url_to_relative(slug))
        .join(file_name)
}

// ============================================================================
// Renderer
// ============================================================================

/// Renders and writes cards with fixed options.
///
/// Font bytes are read once here and shared by every page.
pub struct CardRenderer<'a> {
    options: &'a PluginOptions,
    rasterizer: &'a dyn TextRasterizer,
    background: Background,
    font_bytes: Vec<u8>,
}

impl<'a> CardRenderer<'a> {
    pub fn new(
        options: &'a PluginOptions,
        rasterizer: &'a dyn TextRasterizer,
        root: &Path,
    ) -> Result<Self> {
        let font_bytes = match &options.font_file {
            Some(path) => std::fs::read(path)
                .with_context(|| format!("Failed to read font file {}", path.display()))?,
            None => Vec::new(),
        };
        Ok(Self {
            options,
            rasterizer,
            background: Background::parse(&options.background, root),
            font_bytes,
        })
    }

    /// Compose a card in memory.
    pub fn render(&self, title: &str, subtitle: &str) -> Result<RgbaImage> {
        let layer = TextLayer {
            title,
            subtitle,
            title_size: self.options.title_font_size,
            subtitle_size: self.options.subtitle_font_size,
            color: self.options.font_color,
            font: self.options.font_token(),
            font_bytes: &self.font_bytes,
        };

        let (text, base) = rayon::join(
            || self.rasterizer.rasterize(&layer),
            || self.background.render(),
        );
        let text = text.context("Text rasterization failed")?;
        check_dimensions(&text)?;

        compose(base?, &text.into_image()?)
    }

    /// Render `request` and write it to its output path.
    pub fn generate(&self, request: &CardRequest) -> Result<()> {
        let image = self.render(&request.title, &request.subtitle)?;
        write_card(image, &request.output, self.options.jpeg_quality)
    }
}
