//! Dictionary URL construction.
//!
//! Every lookup maps to one entry URL under `/dictionary/english/`. An unknown
//! word redirects to the bare dictionary root, and suggestions then come from
//! `/spellcheck/english/?q=`.

use url::Url;

const DICTIONARY_PATH: &str = "/dictionary/english/";
const SPELLCHECK_PATH: &str = "/spellcheck/english/";

/// Error type for dictionary URL construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty word")]
    EmptyWord,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for camdict_core::Error {
    fn from(err: UrlError) -> Self {
        match err {
            UrlError::EmptyWord => camdict_core::Error::InvalidInput("word must not be empty".to_string()),
            other => camdict_core::Error::InvalidUrl(other.to_string()),
        }
    }
}

/// URL layout of the dictionary site.
#[derive(Debug, Clone)]
pub struct DictionaryUrls {
    dictionary_root: Url,
    spellcheck_root: Url,
}

impl DictionaryUrls {
    /// Build the URL set for a site, e.g. `https://dictionary.cambridge.org`.
    pub fn new(base: &str) -> Result<Self, UrlError> {
        let base = Url::parse(base.trim()).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
        }

        let dictionary_root = base
            .join(DICTIONARY_PATH)
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        let spellcheck_root = base
            .join(SPELLCHECK_PATH)
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

        Ok(Self { dictionary_root, spellcheck_root })
    }

    /// The generic dictionary page unknown words redirect to.
    pub fn dictionary_root(&self) -> &Url {
        &self.dictionary_root
    }

    /// Canonical entry URL for `word`.
    pub fn entry(&self, word: &str) -> Result<Url, UrlError> {
        let slug = slug(word)?;
        let mut url = self.dictionary_root.clone();
        url.path_segments_mut()
            .map_err(|_| UrlError::InvalidUrl(self.dictionary_root.to_string()))?
            .pop_if_empty()
            .push(&slug);
        Ok(url)
    }

    /// Spellcheck suggestion URL for `word`.
    pub fn spellcheck(&self, word: &str) -> Result<Url, UrlError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(UrlError::EmptyWord);
        }
        let mut url = self.spellcheck_root.clone();
        url.query_pairs_mut().append_pair("q", word);
        Ok(url)
    }

    /// Whether a fetch landed on the dictionary root instead of an entry.
    ///
    /// Query, fragment and a trailing slash are ignored.
    pub fn is_dictionary_root(&self, url: &Url) -> bool {
        let root = &self.dictionary_root;
        url.scheme() == root.scheme()
            && url.host_str() == root.host_str()
            && url.port_or_known_default() == root.port_or_known_default()
            && url.path().trim_end_matches('/') == root.path().trim_end_matches('/')
    }
}

/// Path segment for a word: trimmed, inner whitespace collapsed to `-`.
pub fn slug(word: &str) -> Result<String, UrlError> {
    let slug = word.split_whitespace().collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        return Err(UrlError::EmptyWord);
    }
    Ok(slug)
}

/// Copy of `url` without query string or fragment, as stored in the cache.
pub fn strip_query(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_query(None);
    stripped.set_fragment(None);
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> DictionaryUrls {
        DictionaryUrls::new("https://dictionary.cambridge.org").unwrap()
    }

    #[test]
    fn test_entry_url_basic() {
        let url = urls().entry("test").unwrap();
        assert_eq!(url.as_str(), "https://dictionary.cambridge.org/dictionary/english/test");
    }

    #[test]
    fn test_entry_url_phrase() {
        let url = urls().entry("  look   up  ").unwrap();
        assert_eq!(url.as_str(), "https://dictionary.cambridge.org/dictionary/english/look-up");
    }

    #[test]
    fn test_entry_url_escapes_segment() {
        let url = urls().entry("a/b?c").unwrap();
        assert_eq!(url.path(), "/dictionary/english/a%2Fb%3Fc");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_entry_url_empty() {
        assert!(matches!(urls().entry("   "), Err(UrlError::EmptyWord)));
    }

    #[test]
    fn test_spellcheck_url() {
        let url = urls().spellcheck("zzxyqq").unwrap();
        assert_eq!(url.as_str(), "https://dictionary.cambridge.org/spellcheck/english/?q=zzxyqq");
    }

    #[test]
    fn test_is_dictionary_root() {
        let urls = urls();
        let root = Url::parse("https://dictionary.cambridge.org/dictionary/english/").unwrap();
        let no_slash = Url::parse("https://dictionary.cambridge.org/dictionary/english").unwrap();
        let with_query = Url::parse("https://dictionary.cambridge.org/dictionary/english/?q=zzxyqq").unwrap();
        let entry = Url::parse("https://dictionary.cambridge.org/dictionary/english/test").unwrap();

        assert!(urls.is_dictionary_root(&root));
        assert!(urls.is_dictionary_root(&no_slash));
        assert!(urls.is_dictionary_root(&with_query));
        assert!(!urls.is_dictionary_root(&entry));
    }

    #[test]
    fn test_base_with_port() {
        let urls = DictionaryUrls::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(urls.dictionary_root().as_str(), "http://127.0.0.1:8080/dictionary/english/");
        assert_eq!(urls.entry("test").unwrap().as_str(), "http://127.0.0.1:8080/dictionary/english/test");
    }

    #[test]
    fn test_unsupported_scheme() {
        let result = DictionaryUrls::new("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_url_error_into_core_error() {
        let err: camdict_core::Error = UrlError::EmptyWord.into();
        assert!(matches!(err, camdict_core::Error::InvalidInput(_)));

        let err: camdict_core::Error = UrlError::UnsupportedScheme("ftp".into()).into();
        assert!(matches!(err, camdict_core::Error::InvalidUrl(msg) if msg.contains("ftp")));
    }

    #[test]
    fn test_strip_query() {
        let url = Url::parse("https://dictionary.cambridge.org/dictionary/english/test?q=test#dataset").unwrap();
        assert_eq!(strip_query(&url).as_str(), "https://dictionary.cambridge.org/dictionary/english/test");
    }
}
