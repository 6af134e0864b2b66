//! Resolved card options.
//!
//! [`PluginOptions::resolve`] is the single place where defaults are merged
//! into the raw `[card]` section. It is pure: no file access, no globals.
//! The result is built once per run and only read afterwards.

use std::path::PathBuf;

use super::section::CardSection;
use super::{ConfigDiagnostics, ConfigError, FieldPath};
use crate::card::color::Rgb;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_BACKGROUND: &str = "#000000";
pub const DEFAULT_TITLE_FONT_SIZE: u32 = 96;
pub const DEFAULT_SUBTITLE_FONT_SIZE: u32 = 60;
pub const DEFAULT_FONT_STYLE: &str = "monospace";
pub const DEFAULT_SEPARATOR: &str = "|";
pub const DEFAULT_CARD_FILE_NAME: &str = "twitter-card.jpg";
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Font token passed to the rasterizer when a font file is configured.
pub const CUSTOM_FONT_TOKEN: &str = "custom";

// ============================================================================
// Localized strings
// ============================================================================

/// Ordered language -> string map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Localized(Vec<(String, String)>);

impl Localized {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == lang)
            .map(|(_, value)| value.as_str())
    }

    /// Non-empty value for `lang`, then for `default_lang`, then `""`.
    pub fn lookup<'a>(&'a self, lang: &str, default_lang: &str) -> &'a str {
        let non_empty = |s: &&str| !s.is_empty();
        self.get(lang)
            .filter(non_empty)
            .or_else(|| self.get(default_lang).filter(non_empty))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// ============================================================================
// PluginOptions
// ============================================================================

/// Fully populated card configuration.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    pub localized_titles: Localized,
    pub localized_authors: Localized,
    pub default_language: String,
    /// Hex color or image path/URL, classified by the background provider.
    pub background: String,
    pub font_color: Rgb,
    pub title_font_size: u32,
    pub subtitle_font_size: u32,
    pub font_style: String,
    pub font_file: Option<PathBuf>,
    pub separator: String,
    pub card_file_name: String,
    pub jpeg_quality: u8,
}

impl PluginOptions {
    /// Merge `raw` with defaults and validate it.
    ///
    /// All problems are collected and returned together as
    /// [`ConfigError::Diagnostics`]; each diagnostic names its field.
    pub fn resolve(raw: &CardSection) -> Result<Self, ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        let title_font_size = resolve_font_size(
            raw.title_font_size.as_ref(),
            DEFAULT_TITLE_FONT_SIZE,
            CardSection::TITLE_FONT_SIZE,
            &mut diag,
        );
        let subtitle_font_size = resolve_font_size(
            raw.subtitle_font_size.as_ref(),
            DEFAULT_SUBTITLE_FONT_SIZE,
            CardSection::SUBTITLE_FONT_SIZE,
            &mut diag,
        );

        let localized_titles = validate_localized(
            raw.localized_titles.as_ref(),
            CardSection::LOCALIZED_TITLES,
            &mut diag,
        );
        let localized_authors = raw
            .localized_authors
            .as_ref()
            .map(|table| collect_strings(table, CardSection::LOCALIZED_AUTHORS, &mut diag))
            .unwrap_or_default();

        let font_color = match raw.font_color.as_deref() {
            None => Rgb::WHITE,
            Some(value) => Rgb::from_hex(value).unwrap_or_else(|| {
                diag.error_with_hint(
                    CardSection::FONT_COLOR,
                    format!("'{value}' is not a hex color"),
                    "use format like \"#ffffff\"",
                );
                Rgb::WHITE
            }),
        };

        let jpeg_quality = match raw.jpeg_quality {
            None => DEFAULT_JPEG_QUALITY,
            Some(q) => u8::try_from(q)
                .ok()
                .filter(|q| (1..=100).contains(q))
                .unwrap_or_else(|| {
                    diag.error(
                        CardSection::JPEG_QUALITY,
                        format!("{q} is out of range, must be 1-100"),
                    );
                    DEFAULT_JPEG_QUALITY
                }),
        };

        let card_file_name = raw
            .card_file_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CARD_FILE_NAME.into());
        if card_file_name.is_empty() || card_file_name.contains(['/', '\\']) {
            diag.error(
                CardSection::CARD_FILE_NAME,
                format!("'{card_file_name}' must be a plain file name"),
            );
        }

        let default_language = raw
            .default_language
            .clone()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.into());
        if let Some(titles) = &localized_titles
            && titles.get(&default_language).is_none()
        {
            diag.warn(
                CardSection::LOCALIZED_TITLES,
                format!("no title for default language '{default_language}'"),
            );
        }

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)?;

        Ok(Self {
            localized_titles: localized_titles.unwrap_or_default(),
            localized_authors,
            default_language,
            background: raw
                .background
                .clone()
                .unwrap_or_else(|| DEFAULT_BACKGROUND.into()),
            font_color,
            title_font_size,
            subtitle_font_size,
            font_style: raw
                .font_style
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_STYLE.into()),
            font_file: raw.font_file.clone(),
            separator: raw
                .separator
                .clone()
                .unwrap_or_else(|| DEFAULT_SEPARATOR.into()),
            card_file_name,
            jpeg_quality,
        })
    }

    /// Font token handed to the rasterizer.
    pub fn font_token(&self) -> &str {
        if self.font_file.is_some() {
            CUSTOM_FONT_TOKEN
        } else {
            &self.font_style
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check that a raw font size represents an integer.
///
/// Integers, integral floats and numeric strings pass (`96`, `96.0`, `"96"`,
/// `-3`); fractional values, NaN, infinities and non-numeric strings fail.
pub fn validate_font_size(value: &toml::Value) -> Option<i64> {
    let number = match value {
        toml::Value::Integer(n) => return Some(*n),
        toml::Value::Float(f) => *f,
        toml::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    #[allow(clippy::cast_possible_truncation)]
    let is_integral =
        number.is_finite() && number.trunc() == number && number.abs() < i64::MAX as f64;
    is_integral.then_some(number as i64)
}

fn resolve_font_size(
    value: Option<&toml::Value>,
    default: u32,
    field: FieldPath,
    diag: &mut ConfigDiagnostics,
) -> u32 {
    let Some(value) = value else {
        return default;
    };

    match validate_font_size(value) {
        None => {
            diag.error_with_hint(
                field,
                format!("please pass an integer, got {value}"),
                format!("e.g. {field} = {default}"),
            );
            default
        }
        Some(size) => match u32::try_from(size) {
            Ok(size) if size > 0 => size,
            _ => {
                diag.error(field, format!("font size must be positive, got {size}"));
                default
            }
        },
    }
}

/// Check a localized map: present, non-empty, first entry a string.
///
/// Later entries with non-string values are dropped with a warning.
pub fn validate_localized(
    table: Option<&toml::Table>,
    field: FieldPath,
    diag: &mut ConfigDiagnostics,
) -> Option<Localized> {
    let first_is_string = table
        .and_then(|t| t.values().next())
        .is_some_and(toml::Value::is_str);

    if !first_is_string {
        diag.error_with_hint(
            field,
            "please pass a table with strings defined for each language",
            format!("e.g. {field} = {{ en = \"My Site\" }}"),
        );
        return None;
    }

    table.map(|t| collect_strings(t, field, diag))
}

fn collect_strings(table: &toml::Table, field: FieldPath, diag: &mut ConfigDiagnostics) -> Localized {
    let mut entries = Vec::with_capacity(table.len());
    for (lang, value) in table {
        match value.as_str() {
            Some(s) => entries.push((lang.clone(), s.to_owned())),
            None => diag.warn(field, format!("ignoring non-string value for '{lang}'")),
        }
    }
    Localized::new(entries)
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Options with `{ en = <title> }` as localized titles and everything else
/// at its default.
#[cfg(test)]
pub fn test_options(title: &str) -> PluginOptions {
    let mut titles = toml::Table::new();
    titles.insert("en".into(), toml::Value::String(title.into()));
    let raw = CardSection {
        localized_titles: Some(titles),
        ..Default::default()
    };
    PluginOptions::resolve(&raw).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, toml::Value)]) -> toml::Table {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn str_value(s: &str) -> toml::Value {
        toml::Value::String(s.into())
    }

    fn with_titles(mut raw: CardSection) -> CardSection {
        raw.localized_titles = Some(table(&[("en", str_value("Home"))]));
        raw
    }

    #[test]
    fn test_validate_font_size_accepts_integers() {
        assert_eq!(validate_font_size(&toml::Value::Integer(96)), Some(96));
        assert_eq!(validate_font_size(&toml::Value::Integer(-3)), Some(-3));
        assert_eq!(validate_font_size(&str_value("96")), Some(96));
        assert_eq!(validate_font_size(&str_value(" 72 ")), Some(72));
        assert_eq!(validate_font_size(&toml::Value::Float(60.0)), Some(60));
    }

    #[test]
    fn test_validate_font_size_rejects_non_integers() {
        assert_eq!(validate_font_size(&str_value("96.5")), None);
        assert_eq!(validate_font_size(&str_value("abc")), None);
        assert_eq!(validate_font_size(&str_value("")), None);
        assert_eq!(validate_font_size(&str_value("NaN")), None);
        assert_eq!(validate_font_size(&toml::Value::Float(f64::NAN)), None);
        assert_eq!(validate_font_size(&toml::Value::Float(96.5)), None);
        assert_eq!(validate_font_size(&toml::Value::Float(f64::INFINITY)), None);
        assert_eq!(validate_font_size(&toml::Value::Boolean(true)), None);
    }

    #[test]
    fn test_validate_localized() {
        let mut diag = ConfigDiagnostics::new();
        let field = CardSection::LOCALIZED_TITLES;

        let ok = table(&[("en", str_value("Home")), ("fr", toml::Value::Integer(1))]);
        let localized = validate_localized(Some(&ok), field, &mut diag).unwrap();
        assert_eq!(localized.len(), 1);
        assert!(!diag.has_errors());
        assert_eq!(diag.warnings().len(), 1);

        assert!(validate_localized(Some(&toml::Table::new()), field, &mut diag).is_none());
        let first_not_string = table(&[("en", toml::Value::Integer(3))]);
        assert!(validate_localized(Some(&first_not_string), field, &mut diag).is_none());
        assert!(validate_localized(None, field, &mut diag).is_none());
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_resolve_defaults() {
        let options = PluginOptions::resolve(&with_titles(CardSection::default())).unwrap();

        assert_eq!(options.default_language, "en");
        assert_eq!(options.background, "#000000");
        assert_eq!(options.font_color, Rgb::WHITE);
        assert_eq!(options.title_font_size, 96);
        assert_eq!(options.subtitle_font_size, 60);
        assert_eq!(options.font_style, "monospace");
        assert_eq!(options.separator, "|");
        assert_eq!(options.card_file_name, "twitter-card.jpg");
        assert_eq!(options.jpeg_quality, 100);
        assert!(options.localized_authors.is_empty());
        assert_eq!(options.font_token(), "monospace");
    }

    #[test]
    fn test_resolve_requires_localized_titles() {
        let err = PluginOptions::resolve(&CardSection::default()).unwrap_err();
        let diag = err.diagnostics().unwrap();
        assert!(diag.has_error_for(CardSection::LOCALIZED_TITLES));
    }

    #[test]
    fn test_resolve_reports_each_font_size_field() {
        let raw = with_titles(CardSection {
            title_font_size: Some(str_value("96.5")),
            subtitle_font_size: Some(str_value("abc")),
            ..Default::default()
        });
        let err = PluginOptions::resolve(&raw).unwrap_err();
        let diag = err.diagnostics().unwrap();
        assert!(diag.has_error_for(CardSection::TITLE_FONT_SIZE));
        assert!(diag.has_error_for(CardSection::SUBTITLE_FONT_SIZE));
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_resolve_rejects_non_positive_font_size() {
        let raw = with_titles(CardSection {
            title_font_size: Some(toml::Value::Integer(-3)),
            ..Default::default()
        });
        let err = PluginOptions::resolve(&raw).unwrap_err();
        assert!(
            err.diagnostics()
                .unwrap()
                .has_error_for(CardSection::TITLE_FONT_SIZE)
        );
    }

    #[test]
    fn test_resolve_numeric_string_font_size() {
        let raw = with_titles(CardSection {
            title_font_size: Some(str_value("72")),
            ..Default::default()
        });
        assert_eq!(PluginOptions::resolve(&raw).unwrap().title_font_size, 72);
    }

    #[test]
    fn test_resolve_rejects_bad_color_and_quality() {
        let raw = with_titles(CardSection {
            font_color: Some("white".into()),
            jpeg_quality: Some(0),
            ..Default::default()
        });
        let err = PluginOptions::resolve(&raw).unwrap_err();
        let diag = err.diagnostics().unwrap();
        assert!(diag.has_error_for(CardSection::FONT_COLOR));
        assert!(diag.has_error_for(CardSection::JPEG_QUALITY));
    }

    #[test]
    fn test_resolve_rejects_nested_card_file_name() {
        let raw = with_titles(CardSection {
            card_file_name: Some("cards/og.jpg".into()),
            ..Default::default()
        });
        assert!(PluginOptions::resolve(&raw).is_err());
    }

    #[test]
    fn test_font_file_switches_token() {
        let raw = with_titles(CardSection {
            font_file: Some("fonts/Inter.ttf".into()),
            ..Default::default()
        });
        assert_eq!(PluginOptions::resolve(&raw).unwrap().font_token(), "custom");
    }

    #[test]
    fn test_localized_lookup_fallback() {
        let titles = Localized::new(vec![
            ("en".into(), "Home".into()),
            ("fr".into(), String::new()),
        ]);
        assert_eq!(titles.lookup("en", "en"), "Home");
        assert_eq!(titles.lookup("de", "en"), "Home");
        // Empty localized value falls back to the default language.
        assert_eq!(titles.lookup("fr", "en"), "Home");
        assert_eq!(titles.lookup("de", "es"), "");
    }
}
