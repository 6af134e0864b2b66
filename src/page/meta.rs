//! Page metadata from Markdown frontmatter.
//!
//! Two delimiters are recognized:
//!
//! ```text
//! ---                 +++
//! title: Hello        title = "Hello"
//! lang: fr            lang = "fr"
//! ---                 +++
//! ```

use anyhow::{Result, anyhow};
use serde::Deserialize;

/// The frontmatter fields the card generator cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub title: Option<String>,
    /// Overrides the path-derived slug.
    pub slug: Option<String>,
    /// Overrides the file-name locale suffix.
    #[serde(alias = "locale")]
    pub lang: Option<String>,
}

/// Extract frontmatter metadata, `None` when the file has no frontmatter.
pub fn extract_frontmatter(content: &str) -> Result<Option<PageMeta>> {
    match detect_frontmatter(content) {
        Some((fm, true)) => toml::from_str(fm)
            .map(Some)
            .map_err(|e| anyhow!("Invalid TOML frontmatter: {}", e)),
        Some((fm, false)) => Ok(Some(parse_yaml_like(fm))),
        None => Ok(None),
    }
}

/// Detect frontmatter. Returns `(frontmatter, is_toml)` if found.
fn detect_frontmatter(content: &str) -> Option<(&str, bool)> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();

    for (delim, is_toml) in [("---", false), ("+++", true)] {
        if let Some(rest) = trimmed.strip_prefix(delim)
            && let Some(end) = rest.find(&format!("\n{delim}"))
        {
            return Some((rest[..end].trim(), is_toml));
        }
    }

    None
}

/// Parse simple YAML-like frontmatter (`key: value` per line).
fn parse_yaml_like(content: &str) -> PageMeta {
    let mut meta = PageMeta::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        if value.is_empty() {
            continue;
        }

        match key.trim().to_ascii_lowercase().as_str() {
            "title" => meta.title = Some(value.to_string()),
            "slug" => meta.slug = Some(value.to_string()),
            "lang" | "locale" => meta.lang = Some(value.to_string()),
            _ => {}
        }
    }

    meta
}

/// Strip one pair of matching surrounding quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2
            && let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}
