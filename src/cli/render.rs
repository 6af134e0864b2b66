//! Single card rendering.
//!
//! Uses the `[card]` styling from the config (or defaults without one) to
//! render one card with a title given on the command line. The subtitle is
//! built from the configured site title and author like in `build`.

use crate::{
    card::{CardRenderer, format_subtitle, text::TextRasterizer},
    config::{CardSection, PluginOptions, SiteConfig},
    log,
};
use anyhow::Result;

use super::RenderArgs;

/// Run the `render` command.
pub fn run(
    args: &RenderArgs,
    config: &SiteConfig,
    rasterizer: &dyn TextRasterizer,
) -> Result<()> {
    let options = render_options(&config.card)?;
    let subtitle = args
        .subtitle
        .clone()
        .unwrap_or_else(|| default_subtitle(&options, args.locale.as_deref()));

    let renderer = CardRenderer::new(&options, rasterizer, config.get_root())?;
    let image = renderer.render(&args.title, &subtitle)?;
    crate::card::compose::write_card(image, &args.output, options.jpeg_quality)?;

    log!("render"; "wrote {}", args.output.display());
    Ok(())
}

/// `"{site title} {sep} {author}"` for `locale`.
fn default_subtitle(options: &PluginOptions, locale: Option<&str>) -> String {
    let locale = locale.unwrap_or(options.default_language.as_str());
    let site_title = options
        .localized_titles
        .lookup(locale, &options.default_language);
    let author = options
        .localized_authors
        .lookup(locale, &options.default_language);
    format_subtitle(site_title, author, &options.separator)
}

/// Resolve options, tolerating a config without localized titles.
///
/// A single card does not need a site title, so a missing map resolves to
/// an empty title for the default language.
fn render_options(card: &CardSection) -> Result<PluginOptions> {
    let mut card = card.clone();
    if card.localized_titles.is_none() {
        let locale = card
            .default_language
            .clone()
            .unwrap_or_else(|| crate::config::DEFAULT_LANGUAGE.to_string());
        let mut titles = toml::Table::new();
        titles.insert(locale, toml::Value::String(String::new()));
        card.localized_titles = Some(titles);
    }

    Ok(PluginOptions::resolve(&card)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::text::{PixelBuffer, TextLayer};
    use crate::card::{HEIGHT, WIDTH};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn args(output: std::path::PathBuf) -> RenderArgs {
        RenderArgs {
            title: "Hello".into(),
            subtitle: None,
            output,
            locale: None,
            verbose: false,
        }
    }

    fn strings(entries: &[(&str, &str)]) -> toml::Table {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), toml::Value::String((*v).into())))
            .collect()
    }

    #[test]
    fn test_render_single_card() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig {
            root: dir.path().to_path_buf(),
            card: CardSection {
                localized_titles: Some(strings(&[("en", "My Site"), ("fr", "Mon Site")])),
                localized_authors: Some(strings(&[("en", "Jane")])),
                ..Default::default()
            },
            ..Default::default()
        };
        let output = dir.path().join("out/card.png");

        let seen = Mutex::new(Vec::new());
        let rasterizer = |layer: &TextLayer<'_>| -> Result<PixelBuffer> {
            seen.lock()
                .unwrap()
                .push((layer.title.to_string(), layer.subtitle.to_string()));
            Ok(PixelBuffer::transparent())
        };

        run(&args(output.clone()), &config, &rasterizer).unwrap();
        let mut fr = args(dir.path().join("out/card-fr.png"));
        fr.locale = Some("fr".into());
        run(&fr, &config, &rasterizer).unwrap();

        let image = image::open(&output).unwrap();
        assert_eq!((image.width(), image.height()), (WIDTH, HEIGHT));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("Hello".to_string(), "My Site | Jane".to_string()),
                ("Hello".to_string(), "Mon Site | Jane".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_explicit_subtitle() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };

        let seen = Mutex::new(String::new());
        let rasterizer = |layer: &TextLayer<'_>| -> Result<PixelBuffer> {
            *seen.lock().unwrap() = layer.subtitle.to_string();
            Ok(PixelBuffer::transparent())
        };

        let mut render = args(dir.path().join("card.jpg"));
        render.subtitle = Some("custom line".into());
        run(&render, &config, &rasterizer).unwrap();
        assert_eq!(*seen.lock().unwrap(), "custom line");
    }

    #[test]
    fn test_render_options_without_titles() {
        let card = CardSection {
            default_language: Some("fr".into()),
            localized_authors: Some(strings(&[("fr", "Jeanne")])),
            ..Default::default()
        };

        let options = render_options(&card).unwrap();
        assert_eq!(options.localized_titles.get("fr"), Some(""));
        assert_eq!(default_subtitle(&options, None), "Jeanne");
    }

    #[test]
    fn test_render_keeps_configured_titles() {
        let card = CardSection {
            localized_titles: Some(strings(&[("en", "My Site")])),
            ..Default::default()
        };
        let options = render_options(&card).unwrap();
        assert_eq!(default_subtitle(&options, Some("de")), "My Site");
    }

    #[test]
    fn test_render_invalid_config() {
        let card = CardSection {
            font_color: Some("not-a-color".into()),
            ..Default::default()
        };
        assert!(render_options(&card).is_err());
    }
}
