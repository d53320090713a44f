//! Lookup orchestration.
//!
//! A lookup tries the cache first and falls back to the serialized fetcher.
//! When the site redirects an unknown word to the generic dictionary root, a
//! second fetch pulls spellcheck suggestions instead; those are rendered but
//! never cached. A genuine entry is rendered immediately while its cache
//! write runs in the background on the [`TaskRegistry`].

use std::sync::Arc;

use camdict_core::{CacheDb, CacheEntry, Error, TaskRegistry};
use url::Url;

use crate::extract::response_word;
use crate::fetch::{DictionaryUrls, FetchedPage, SerializedFetcher, strip_query};
use crate::render::{Renderer, TextRenderer};

/// What a network fetch for a word resolved to.
#[derive(Debug, Clone)]
pub enum LookupResult {
    /// A dictionary entry page. `url` has no query or fragment, matching
    /// what the cache stores.
    Found { url: Url, body: String },
    /// The word is unknown; `body` is the spellcheck suggestions page.
    SpellcheckRedirect { url: Url, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedKind {
    Entry,
    Suggestions,
}

/// Rendered output of one lookup.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub kind: RenderedKind,
    /// URL of the page that was rendered
    pub url: Url,
    pub text: String,
    /// Whether the page came from the cache
    pub from_cache: bool,
}

/// Cache-first dictionary lookups.
///
/// Cloning is cheap; clones share the cache connection, the fetch slot and
/// the task registry.
#[derive(Clone)]
pub struct LookupService {
    cache: CacheDb,
    fetcher: Arc<SerializedFetcher>,
    tasks: TaskRegistry,
    urls: DictionaryUrls,
    renderer: Arc<dyn Renderer>,
}

impl LookupService {
    /// Create a service rendering with [`TextRenderer`].
    pub fn new(cache: CacheDb, fetcher: Arc<SerializedFetcher>, tasks: TaskRegistry, urls: DictionaryUrls) -> Self {
        Self::with_renderer(cache, fetcher, tasks, urls, Arc::new(TextRenderer::new()))
    }

    pub fn with_renderer(
        cache: CacheDb, fetcher: Arc<SerializedFetcher>, tasks: TaskRegistry, urls: DictionaryUrls,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self { cache, fetcher, tasks, urls, renderer }
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Look up `word` and render the result.
    ///
    /// With `force_fresh` the cache is not consulted. A fresh entry is written
    /// back without waiting for the write to finish.
    pub async fn lookup(&self, word: &str, force_fresh: bool) -> Result<Rendered, Error> {
        let word = word.trim();
        if word.is_empty() {
            return Err(Error::InvalidInput("word must not be empty".to_string()));
        }
        let request_url = self.urls.entry(word)?;

        if !force_fresh && let Some((url, body)) = self.cached(&request_url, word).await {
            return self.render(RenderedKind::Entry, url, &body, true);
        }

        match self.fetch(word, &request_url).await? {
            LookupResult::SpellcheckRedirect { url, body } => self.render(RenderedKind::Suggestions, url, &body, false),
            LookupResult::Found { url, body } => {
                self.schedule_write(word, &url, &body);
                self.render(RenderedKind::Entry, url, &body, false)
            }
        }
    }

    /// Fetch `request_url` and follow up with the spellcheck page when the
    /// site redirected to the dictionary root.
    pub async fn fetch(&self, word: &str, request_url: &Url) -> Result<LookupResult, Error> {
        let FetchedPage { final_url, body } = self.fetcher.fetch(request_url).await?;

        if self.urls.is_dictionary_root(&final_url) {
            tracing::info!(word, url = %final_url, "no entry found, fetching suggestions");
            let spellcheck_url = self.urls.spellcheck(word)?;
            let page = self.fetcher.fetch(&spellcheck_url).await?;
            return Ok(LookupResult::SpellcheckRedirect { url: page.final_url, body: page.body });
        }

        Ok(LookupResult::Found { url: strip_query(&final_url), body })
    }

    async fn cached(&self, request_url: &Url, word: &str) -> Option<(Url, String)> {
        let entry = match self.cache.lookup(request_url.as_str(), word).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                tracing::debug!(word, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(word, error = %e, "cache read failed, fetching instead");
                return None;
            }
        };

        match Url::parse(&entry.response_url) {
            Ok(url) => {
                tracing::info!(word, url = %url, cached_at = %entry.created_at, "cache hit");
                Some((url, entry.response_text))
            }
            Err(e) => {
                tracing::warn!(word, url = %entry.response_url, error = %e, "cached URL is unusable, fetching instead");
                None
            }
        }
    }

    fn schedule_write(&self, word: &str, url: &Url, body: &str) {
        let Some(resolved) = response_word(body) else {
            tracing::warn!(word, url = %url, "page has no title, not caching");
            return;
        };

        let entry = CacheEntry::new(word, resolved, url.as_str(), body);
        let cache = self.cache.clone();

        let task_id = self.tasks.schedule(async move {
            match cache.insert(&entry).await {
                Ok(()) => {
                    tracing::info!(word = %entry.input_word, response_word = %entry.response_word, "cached entry");
                    Ok(())
                }
                Err(e) if e.is_duplicate_key() => {
                    tracing::info!(word = %entry.input_word, response_word = %entry.response_word, "entry already cached");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        });
        tracing::debug!(word, task_id, "scheduled cache write");
    }

    fn render(&self, kind: RenderedKind, url: Url, body: &str, from_cache: bool) -> Result<Rendered, Error> {
        let text = self.renderer.render(&url, body)?;
        Ok(Rendered { kind, url, text, from_cache })
    }
}
