//! Text layer rasterization.
//!
//! The card core only knows the [`TextRasterizer`] contract: title,
//! subtitle, sizes, color and font selection in; a transparent 1200×630
//! RGBA buffer with the text drawn on it out. [`SvgTextRasterizer`] is the
//! built-in implementation: it lays the text out as an SVG document and
//! renders it with `resvg`.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail, ensure};
use image::RgbaImage;
use parking_lot::Mutex;
use usvg::fontdb::Database;

use super::color::Rgb;
use super::{HEIGHT, WIDTH};
use crate::config::CUSTOM_FONT_TOKEN;
use crate::debug;
use crate::utils::xml::escape;

// ============================================================================
// Contract
// ============================================================================

/// Everything the rasterizer needs to draw one card's text.
#[derive(Debug, Clone, Copy)]
pub struct TextLayer<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub title_size: u32,
    pub subtitle_size: u32,
    pub color: Rgb,
    /// Family token (`monospace`, `serif`, a family name) or `custom`.
    pub font: &'a str,
    /// Custom font file contents; empty unless `font` is `custom`.
    pub font_bytes: &'a [u8],
}

/// Raw straight-alpha RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Fully transparent card-sized buffer.
    pub fn transparent() -> Self {
        Self::new(WIDTH, HEIGHT, vec![0; (WIDTH * HEIGHT * 4) as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Wrap the buffer as an image, checking its length.
    pub fn into_image(self) -> Result<RgbaImage> {
        let (width, height, len) = (self.width, self.height, self.data.len());
        RgbaImage::from_raw(width, height, self.data)
            .ok_or_else(|| anyhow!("pixel buffer of {len} bytes does not fit {width}x{height} RGBA"))
    }
}

/// The text-to-pixels boundary.
///
/// Implementations must return exactly [`WIDTH`]×[`HEIGHT`] pixels. Plain
/// closures satisfy the trait too.
pub trait TextRasterizer: Send + Sync {
    fn rasterize(&self, layer: &TextLayer<'_>) -> Result<PixelBuffer>;
}

impl<F> TextRasterizer for F
where
    F: Fn(&TextLayer<'_>) -> Result<PixelBuffer> + Send + Sync,
{
    fn rasterize(&self, layer: &TextLayer<'_>) -> Result<PixelBuffer> {
        self(layer)
    }
}

// ============================================================================
// SVG rasterizer
// ============================================================================

/// Distance from the card edges to the text block.
const PADDING: f32 = 80.0;
/// Line height as a multiple of font size.
const LINE_HEIGHT: f32 = 1.2;
/// Rough glyph advance as a multiple of font size, used for wrapping.
const GLYPH_WIDTH: f32 = 0.6;
/// Space between the title block and the subtitle line.
const SUBTITLE_GAP: f32 = 24.0;

const GENERIC_FAMILIES: &[&str] = &["serif", "sans-serif", "monospace", "cursive", "fantasy"];

/// Renders card text through `usvg` + `resvg`.
///
/// Title lines start at the top-left and wrap on words; the subtitle sits
/// on the bottom baseline.
#[derive(Clone)]
pub struct SvgTextRasterizer {
    fontdb: Arc<Database>,
    /// Database extended with the custom font, built on first use.
    custom: Arc<Mutex<Option<CustomFont>>>,
}

/// System fonts plus one custom font file.
struct CustomFont {
    bytes: Vec<u8>,
    fontdb: Arc<Database>,
    family: String,
}

impl SvgTextRasterizer {
    /// Create a rasterizer backed by the system fonts.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        configure_generic_families(&mut db);
        debug!("font"; "loaded {} system font faces", db.len());
        Self::with_fontdb(db)
    }

    pub fn with_fontdb(db: Database) -> Self {
        Self {
            fontdb: Arc::new(db),
            custom: Arc::default(),
        }
    }

    /// Font database and family to use for `layer`.
    fn resolve_font(&self, layer: &TextLayer<'_>) -> Result<(Arc<Database>, String)> {
        if layer.font != CUSTOM_FONT_TOKEN || layer.font_bytes.is_empty() {
            let family = match layer.font {
                CUSTOM_FONT_TOKEN | "" => "monospace",
                other => other,
            };
            return Ok((Arc::clone(&self.fontdb), family.to_string()));
        }

        let mut custom = self.custom.lock();
        if let Some(font) = custom.as_ref()
            && font.bytes == layer.font_bytes
        {
            return Ok((Arc::clone(&font.fontdb), font.family.clone()));
        }

        let mut db = (*self.fontdb).clone();
        let before = db.len();
        db.load_font_data(layer.font_bytes.to_vec());
        ensure!(db.len() > before, "custom font contains no usable faces");

        let family = db
            .faces()
            .last()
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .context("custom font has no family name")?;
        debug!("font"; "loaded custom font family '{}'", family);

        let font = custom.insert(CustomFont {
            bytes: layer.font_bytes.to_vec(),
            fontdb: Arc::new(db),
            family,
        });
        Ok((Arc::clone(&font.fontdb), font.family.clone()))
    }
}

impl Default for SvgTextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRasterizer for SvgTextRasterizer {
    fn rasterize(&self, layer: &TextLayer<'_>) -> Result<PixelBuffer> {
        let (fontdb, family) = self.resolve_font(layer)?;
        let svg = svg_document(layer, &family);

        let options = usvg::Options {
            fontdb,
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &options).context("failed to lay out card text")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(WIDTH, HEIGHT)
            .ok_or_else(|| anyhow!("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        // tiny-skia stores premultiplied alpha; the compositor expects straight alpha.
        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Ok(PixelBuffer::new(WIDTH, HEIGHT, data))
    }
}

/// Point the generic families at installed faces when the fontdb defaults
/// (Times New Roman, Arial, Courier New) are missing.
fn configure_generic_families(db: &mut Database) {
    let has_family = |db: &Database, name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };
    let first_family = |db: &Database, monospaced: bool| {
        db.faces()
            .find(|face| face.monospaced == monospaced)
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
    };

    if !has_family(db, db.family_name(&usvg::fontdb::Family::Monospace))
        && let Some(name) = first_family(db, true)
    {
        db.set_monospace_family(name);
    }
    if let Some(name) = first_family(db, false) {
        if !has_family(db, db.family_name(&usvg::fontdb::Family::SansSerif)) {
            db.set_sans_serif_family(name.clone());
        }
        if !has_family(db, db.family_name(&usvg::fontdb::Family::Serif)) {
            db.set_serif_family(name);
        }
    }
}

/// Build the SVG document for one text layer.
pub fn svg_document(layer: &TextLayer<'_>, family: &str) -> String {
    let title_size = layer.title_size as f32;
    let subtitle_size = layer.subtitle_size as f32;

    let mut reserved = 2.0 * PADDING;
    if !layer.subtitle.is_empty() {
        reserved += subtitle_size * LINE_HEIGHT + SUBTITLE_GAP;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_lines = (((HEIGHT as f32 - reserved) / (title_size * LINE_HEIGHT)) as usize).max(1);

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}"><g font-family="{}" fill="{}">"#,
        escape(&font_family_value(family)),
        layer.color.to_hex(),
    );

    for (i, line) in wrap_text(layer.title, title_size, max_lines).iter().enumerate() {
        let baseline = PADDING + title_size + i as f32 * title_size * LINE_HEIGHT;
        svg.push_str(&format!(
            r#"<text x="{PADDING}" y="{baseline}" font-size="{title_size}" font-weight="bold">{}</text>"#,
            escape(line)
        ));
    }

    if !layer.subtitle.is_empty() {
        let line = wrap_text(layer.subtitle, subtitle_size, 1).remove(0);
        let baseline = HEIGHT as f32 - PADDING;
        svg.push_str(&format!(
            r#"<text x="{PADDING}" y="{baseline}" font-size="{subtitle_size}">{}</text>"#,
            escape(&line)
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

/// Generic keywords stay bare; family names are quoted.
fn font_family_value(family: &str) -> String {
    if GENERIC_FAMILIES.contains(&family) {
        family.to_string()
    } else {
        format!("'{}'", family.replace('\'', ""))
    }
}

/// Greedy word wrap by estimated glyph width.
///
/// Words longer than a line are split; text beyond `max_lines` is cut and
/// the last kept line ends with an ellipsis.
pub fn wrap_text(text: &str, font_size: f32, max_lines: usize) -> Vec<String> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_chars =
        (((WIDTH as f32 - 2.0 * PADDING) / (font_size * GLYPH_WIDTH)) as usize).max(1);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        if current_len > 0 && current_len + 1 + chars.len() > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while chars.len() > max_chars {
            let rest = chars.split_off(max_chars);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += chars.len();
        current.extend(chars);
    }
    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let mut kept: Vec<char> = last.chars().collect();
            kept.truncate(max_chars.saturating_sub(1));
            *last = kept.into_iter().collect::<String>().trim_end().to_string() + "…";
        }
    }
    lines
}

/// Check a rasterizer's output against the card size.
pub fn check_dimensions(buffer: &PixelBuffer) -> Result<()> {
    if (buffer.width(), buffer.height()) != (WIDTH, HEIGHT) {
        bail!(
            "text layer is {}x{}, expected {WIDTH}x{HEIGHT}",
            buffer.width(),
            buffer.height()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer<'a>(title: &'a str, subtitle: &'a str) -> TextLayer<'a> {
        TextLayer {
            title,
            subtitle,
            title_size: 96,
            subtitle_size: 60,
            color: Rgb::WHITE,
            font: "monospace",
            font_bytes: &[],
        }
    }

    #[test]
    fn test_wrap_text_short_title() {
        assert_eq!(wrap_text("Hello World", 96.0, 3), vec!["Hello World"]);
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        // 96px -> 18 chars per line
        let lines = wrap_text("The quick brown fox jumps over the lazy dog", 96.0, 5);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 18));
        assert_eq!(lines.join(" "), "The quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_text_splits_long_word() {
        let word = "a".repeat(40);
        let lines = wrap_text(&word, 96.0, 5);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 18);
    }

    #[test]
    fn test_wrap_text_truncates_with_ellipsis() {
        let lines = wrap_text(&"word ".repeat(40), 96.0, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with('…'));
    }

    #[test]
    fn test_wrap_text_empty() {
        assert_eq!(wrap_text("", 96.0, 3), vec![String::new()]);
    }

    #[test]
    fn test_svg_document_escapes_text() {
        let svg = svg_document(&layer("Tom & Jerry <3", "Home | Jane"), "monospace");
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
        assert!(svg.contains("Home | Jane"));
        assert!(svg.contains(r##"fill="#ffffff""##));
        assert!(svg.contains(r#"font-family="monospace""#));
    }

    #[test]
    fn test_svg_document_without_subtitle() {
        let svg = svg_document(&layer("Title", ""), "Fira Code");
        assert_eq!(svg.matches("<text").count(), 1);
        assert!(svg.contains("font-family=\"&apos;Fira Code&apos;\""));
    }

    #[test]
    fn test_pixel_buffer_into_image() {
        let image = PixelBuffer::transparent().into_image().unwrap();
        assert_eq!(image.dimensions(), (WIDTH, HEIGHT));

        let short = PixelBuffer::new(WIDTH, HEIGHT, vec![0; 16]);
        assert!(short.into_image().is_err());
    }

    #[test]
    fn test_check_dimensions() {
        assert!(check_dimensions(&PixelBuffer::transparent()).is_ok());
        assert!(check_dimensions(&PixelBuffer::new(10, 10, vec![0; 400])).is_err());
    }

    #[test]
    fn test_closure_rasterizer() {
        let rasterizer = |_: &TextLayer<'_>| -> Result<PixelBuffer> { Ok(PixelBuffer::transparent()) };
        let buffer = rasterizer.rasterize(&layer("a", "b")).unwrap();
        assert_eq!(buffer.width(), WIDTH);
    }

    #[test]
    fn test_svg_rasterizer_output_size() {
        let rasterizer = SvgTextRasterizer::with_fontdb(Database::new());
        let buffer = rasterizer.rasterize(&layer("Hello World", "Home")).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (WIDTH, HEIGHT));
        assert_eq!(buffer.data().len(), (WIDTH * HEIGHT * 4) as usize);
    }

    #[test]
    fn test_svg_rasterizer_rejects_bad_custom_font() {
        let rasterizer = SvgTextRasterizer::with_fontdb(Database::new());
        let mut custom = layer("Hello", "");
        custom.font = CUSTOM_FONT_TOKEN;
        custom.font_bytes = b"not a font";
        assert!(rasterizer.rasterize(&custom).is_err());
    }

    #[test]
    fn test_custom_font_database_is_reused() {
        let rasterizer = SvgTextRasterizer::with_fontdb(Database::new());
        let shared = Arc::new(Database::new());
        *rasterizer.custom.lock() = Some(CustomFont {
            bytes: b"font bytes".to_vec(),
            fontdb: Arc::clone(&shared),
            family: "Cached Sans".into(),
        });

        let mut custom = layer("Hello", "");
        custom.font = CUSTOM_FONT_TOKEN;
        custom.font_bytes = b"font bytes";

        for _ in 0..2 {
            let (fontdb, family) = rasterizer.resolve_font(&custom).unwrap();
            assert!(Arc::ptr_eq(&fontdb, &shared));
            assert_eq!(family, "Cached Sans");
        }

        // Clones share the cached database.
        let (fontdb, _) = rasterizer.clone().resolve_font(&custom).unwrap();
        assert!(Arc::ptr_eq(&fontdb, &shared));

        // Different bytes are loaded again, and bad ones never replace the cache.
        custom.font_bytes = b"not a font";
        assert!(rasterizer.resolve_font(&custom).is_err());
        assert_eq!(
            rasterizer.custom.lock().as_ref().map(|f| f.family.as_str()),
            Some("Cached Sans")
        );
    }
}
