//! Content pages: the nodes cards are generated for.
//!
//! | Module     | Purpose                                         |
//! |------------|-------------------------------------------------|
//! | `meta`     | Frontmatter extraction (`---` / `+++`)          |
//! | `scan`     | Content directory scan (`*.md`, `*.mdx`)        |
//! | `manifest` | JSON page manifest written by a host build      |

mod manifest;
mod meta;
mod scan;

pub use manifest::Manifest;
pub use meta::{PageMeta, extract_frontmatter};
pub use scan::{ContentScanner, derive_slug, split_locale};

use anyhow::Result;
use serde::Deserialize;

/// A content page as seen by the card generator.
///
/// Every field except `id` is optional: pages without a slug or title are
/// skipped with a warning, pages without a locale use the default language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageNode {
    /// Stable identity for reporting (source path or manifest id).
    pub id: String,
    pub locale: Option<String>,
    /// URL path of the page, e.g. `/posts/hello/`.
    pub slug: Option<String>,
    /// Frontmatter title.
    pub title: Option<String>,
}

impl PageNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Anything that can enumerate content pages.
pub trait PageSource {
    fn collect(&self) -> Result<Vec<PageNode>>;
}
