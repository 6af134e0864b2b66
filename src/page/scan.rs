//! Content directory scan.
//!
//! Turns `content/posts/hello.fr.md` into a [`PageNode`] with slug
//! `/posts/hello/` and locale `fr`. Frontmatter `slug` and `lang` fields
//! take precedence over what the path says.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use rayon::prelude::*;

use super::{PageNode, PageSource, extract_frontmatter};
use crate::log;

/// File extensions treated as content pages.
const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

/// Scans a content directory for Markdown pages.
#[derive(Debug, Clone)]
pub struct ContentScanner {
    dir: PathBuf,
}

impl ContentScanner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_page(&self, path: &Path) -> Result<PageNode> {
        let rel = path.strip_prefix(&self.dir).unwrap_or(path);
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let meta = match extract_frontmatter(&source) {
            Ok(meta) => meta.unwrap_or_default(),
            Err(e) => {
                log!("warning"; "{}: {}", rel.display(), e);
                Default::default()
            }
        };

        let (slug, path_locale) = derive_slug(rel);
        Ok(PageNode {
            id: rel.to_string_lossy().into_owned(),
            locale: meta.lang.or(path_locale),
            slug: meta.slug.or(Some(slug)),
            title: meta.title,
        })
    }
}

impl PageSource for ContentScanner {
    fn collect(&self) -> Result<Vec<PageNode>> {
        if !self.dir.is_dir() {
            bail!("content directory `{}` not found", self.dir.display());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|p| is_content_file(p))
            .collect();
        files.sort();

        files.par_iter().map(|path| self.read_page(path)).collect()
    }
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Derive `(slug, locale)` from a content-relative path.
///
/// ```text
/// index.md               -> ("/", None)
/// posts/hello.md         -> ("/posts/hello/", None)
/// posts/hello/index.md   -> ("/posts/hello/", None)
/// posts/hello.fr.md      -> ("/posts/hello/", Some("fr"))
/// posts/index.pt-br.mdx  -> ("/posts/", Some("pt-br"))
/// ```
pub fn derive_slug(rel: &Path) -> (String, Option<String>) {
    let stem = rel.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let (stem, locale) = split_locale(stem);

    let mut parts: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if stem != "index" {
        parts.push(stem.to_string());
    }

    let slug = if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", parts.join("/"))
    };
    (slug, locale.map(str::to_string))
}

/// Split a trailing language tag off a file stem: `hello.fr` -> `("hello", Some("fr"))`.
pub fn split_locale(stem: &str) -> (&str, Option<&str>) {
    match stem.rsplit_once('.') {
        Some((base, tag)) if !base.is_empty() && is_language_tag(tag) => (base, Some(tag)),
        _ => (stem, None),
    }
}

/// `en`, `fra`, `pt-br`, `zh-Hans`.
fn is_language_tag(tag: &str) -> bool {
    let (primary, region) = match tag.split_once('-') {
        Some((primary, region)) => (primary, Some(region)),
        None => (tag, None),
    };

    let primary_ok =
        (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_lowercase());
    let region_ok = region.is_none_or(|r| {
        (2..=4).contains(&r.len()) && r.chars().all(|c| c.is_ascii_alphanumeric())
    });
    primary_ok && region_ok
}
