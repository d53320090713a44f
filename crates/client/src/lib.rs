//! Client code for camdict.
//!
//! This crate provides the serialized fetch pipeline, the cache-first lookup
//! orchestrator and plain-text rendering of dictionary pages.

pub mod extract;
pub mod fetch;
pub mod lookup;
pub mod render;

pub use extract::{clean_text, response_word};
pub use fetch::{
    DictionaryUrls, FetchConfig, FetchSession, FetchedPage, HttpTransport, SerializedFetcher, Transport,
    TransportSession, UrlError, random_user_agent,
};
pub use lookup::{LookupResult, LookupService, Rendered, RenderedKind};
pub use render::{Renderer, TextRenderer, render_entry, render_spellcheck};
