//! Markdown content pages (rental terms, FAQ, privacy).
//!
//! Pages are loaded from `{content_dir}/pages/*.md` at startup. Each file has
//! YAML frontmatter followed by markdown; the file stem is the URL slug.
//!
//! ```markdown
//! ---
//! title: Rental Terms
//! description: How renting from us works
//! updated_at: 2025-03-01
//! ---
//! Body text...
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// All pages, held in memory.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ContentStore {
    /// Load every page under `content_dir/pages`.
    ///
    /// A missing directory yields an empty store; a page that fails to parse
    /// is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "Pages directory does not exist");
            return Ok(Self::default());
        }

        for entry in std::fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path)
                .map_err(ContentError::from)
                .and_then(|source| parse_page(slug, &source))
            {
                Ok(page) => {
                    tracing::info!(slug = %page.slug, "Loaded page");
                    pages.insert(page.slug.clone(), page);
                }
                Err(e) => tracing::error!(path = %path.display(), error = %e, "Failed to load page"),
            }
        }

        Ok(Self::from_pages(pages.into_values()))
    }

    /// Build a store from already-parsed pages.
    #[must_use]
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().map(|p| (p.slug.clone(), p)).collect()),
        }
    }

    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Pages sorted by title, for the footer links.
    #[must_use]
    pub fn page_links(&self) -> Vec<(String, String)> {
        let mut links: Vec<(String, String)> = self
            .pages
            .values()
            .map(|p| (p.slug.clone(), p.meta.title.clone()))
            .collect();
        links.sort_by(|a, b| a.1.cmp(&b.1));
        links
    }
}

/// Parse one markdown file with frontmatter.
///
/// # Errors
///
/// Returns [`ContentError::Parse`] if the frontmatter is missing or invalid.
pub fn parse_page(slug: &str, source: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug: slug.to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown with GitHub-flavored extensions. Raw HTML is escaped.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());
    options.render.escape = true;
    markdown_to_html(markdown, &options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TERMS: &str = "---\ntitle: Rental Terms\nupdated_at: 2025-03-01\n---\n# Deposits\n\nA deposit is **required**.\n";

    #[test]
    fn test_parse_page() {
        let page = parse_page("terms", TERMS).unwrap();
        assert_eq!(page.meta.title, "Rental Terms");
        assert_eq!(page.meta.updated_at, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(page.content_html.contains("<strong>required</strong>"));
        assert!(page.content_html.contains("Deposits"));
    }

    #[test]
    fn test_missing_frontmatter_is_an_error() {
        assert!(matches!(
            parse_page("faq", "# Just markdown"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_page_links_sorted_by_title() {
        let store = ContentStore::from_pages([
            parse_page("terms", TERMS).unwrap(),
            parse_page("faq", "---\ntitle: FAQ\n---\nQ&A").unwrap(),
        ]);
        assert_eq!(
            store.page_links(),
            vec![
                ("faq".to_string(), "FAQ".to_string()),
                ("terms".to_string(), "Rental Terms".to_string()),
            ]
        );
        assert!(store.get_page("privacy").is_none());
    }
}
