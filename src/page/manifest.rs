//! JSON page manifest.
//!
//! Lets a host build (any SSG) hand its page list over instead of having
//! the content directory scanned. Two entry shapes are accepted:
//!
//! ```json
//! [
//!   { "id": "a", "locale": "en", "slug": "/posts/a/", "title": "A" },
//!   { "id": "b", "fields": { "lang": "fr", "slug": "/b/" },
//!     "frontmatter": { "title": "B" } }
//! ]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{PageNode, PageSource};

/// Reads pages from a JSON manifest file.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse manifest JSON.
    pub fn parse(content: &str) -> Result<Vec<PageNode>> {
        let entries: Vec<Entry> = serde_json::from_str(content)?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_node(index))
            .collect())
    }
}

impl PageSource for Manifest {
    fn collect(&self) -> Result<Vec<PageNode>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read manifest {}", self.path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid page manifest {}", self.path.display()))
    }
}

/// One manifest entry: either flat or host-node shaped.
///
/// `fields` is required on the node shape; that is what tells the two apart.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Node {
        #[serde(default)]
        id: String,
        fields: NodeFields,
        #[serde(default)]
        frontmatter: NodeFrontmatter,
    },
    Flat(PageNode),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeFields {
    lang: Option<String>,
    slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeFrontmatter {
    title: Option<String>,
}

impl Entry {
    fn into_node(self, index: usize) -> PageNode {
        let mut node = match self {
            Self::Node {
                id,
                fields,
                frontmatter,
            } => PageNode {
                id,
                locale: fields.lang,
                slug: fields.slug,
                title: frontmatter.title,
            },
            Self::Flat(node) => node,
        };
        if node.id.is_empty() {
            node.id = format!("#{index}");
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_entries() {
        let json = r#"[
            {"id": "hello", "locale": "en", "slug": "/posts/hello/", "title": "Hello World"},
            {"slug": "/about/"}
        ]"#;
        let pages = Manifest::parse(json).unwrap();
        assert_eq!(
            pages[0],
            PageNode::new("hello")
                .with_locale("en")
                .with_slug("/posts/hello/")
                .with_title("Hello World")
        );
        assert_eq!(pages[1].id, "#1");
        assert!(pages[1].title.is_none());
    }

    #[test]
    fn test_parse_node_entries() {
        let json = r#"[
            {"id": "n1", "fields": {"lang": "fr", "slug": "/b/"}, "frontmatter": {"title": "B"}}
        ]"#;
        let pages = Manifest::parse(json).unwrap();
        assert_eq!(
            pages[0],
            PageNode::new("n1")
                .with_locale("fr")
                .with_slug("/b/")
                .with_title("B")
        );
    }

    #[test]
    fn test_parse_invalid_manifest() {
        assert!(Manifest::parse("{\"not\": \"an array\"}").is_err());
    }

    #[test]
    fn test_missing_manifest_file() {
        let manifest = Manifest::new("/definitely/missing/pages.json");
        assert!(manifest.collect().is_err());
    }
}
