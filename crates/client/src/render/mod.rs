//! Plain-text rendering of dictionary pages.
//!
//! The renderer turns a fetched document into display text. Entry pages and
//! spellcheck pages have different layouts; [`TextRenderer`] picks the layout
//! from the URL, the same signal the site itself uses.

mod entry;
mod spellcheck;

use camdict_core::Error;
use url::Url;

pub use entry::render_entry;
pub use spellcheck::render_spellcheck;

/// Renderer trait for turning a fetched document into display text.
pub trait Renderer: Send + Sync {
    /// Render `document`, fetched from `url`.
    fn render(&self, url: &Url, document: &str) -> Result<String, Error>;
}

/// Terminal text renderer built on `scraper`.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// Whether a URL points at the spellcheck endpoint.
pub fn is_spellcheck_url(url: &Url) -> bool {
    url.path().contains("spellcheck")
}

impl Renderer for TextRenderer {
    fn render(&self, url: &Url, document: &str) -> Result<String, Error> {
        tracing::debug!(url = %url, bytes = document.len(), "rendering document");
        if is_spellcheck_url(url) { render_spellcheck(document) } else { render_entry(url, document) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_on_url() {
        let renderer = TextRenderer::new();

        let spell = Url::parse("https://dictionary.cambridge.org/spellcheck/english/?q=zzxyqq").unwrap();
        let html = r#"<div class="hfl-s"><h1>Search suggestions for zzxyqq</h1></div>"#;
        let out = renderer.render(&spell, html).unwrap();
        assert!(out.starts_with("zzxyqq"));

        let entry = Url::parse("https://dictionary.cambridge.org/dictionary/english/test").unwrap();
        let err = renderer.render(&entry, html).unwrap_err();
        assert!(matches!(err, Error::EntryNotFound(_)));
    }
}
