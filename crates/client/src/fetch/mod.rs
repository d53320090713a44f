//! Serialized HTTP fetch pipeline.
//!
//! ### Single slot
//! - One fetch is in flight process-wide. The slot is a `Semaphore` with one
//!   permit, so waiters are admitted in FIFO order.
//! - Each acquisition sleeps a random cooldown from the configured inclusive
//!   range before the session is handed out.
//!
//! ### Sessions
//! - Every acquisition opens a fresh transport session: no cookies or
//!   keep-alive connections carry over, and each gets its own User-Agent.
//! - A session retries failed requests up to `max_attempts` times while the
//!   slot is held. Exhaustion is [`Error::RetriesExhausted`].
//! - Bodies over `max_bytes` are rejected with [`Error::FetchTooLarge`] and
//!   not retried.
//! - The permit is released when the session drops, on every exit path.

pub mod agent;
pub mod url;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};

pub use self::url::{DictionaryUrls, UrlError, slug, strip_query};
pub use agent::random_user_agent;

use ::url::Url;
use camdict_core::{AppConfig, Error};

/// Maximum number of redirects followed by the HTTP transport.
const MAX_REDIRECTS: usize = 10;

/// Configuration for the serialized fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Cooldown slept after acquiring the slot (default: 3s..=5s)
    pub cooldown: RangeInclusive<Duration>,

    /// Attempts per request inside one session (default: 3)
    pub max_attempts: u32,

    /// Per-request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Fixed User-Agent; randomized per session when `None`
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(3)..=Duration::from_secs(5),
            max_attempts: 3,
            timeout: Duration::from_millis(20_000),
            max_bytes: 5 * 1024 * 1024,
            user_agent: None,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            max_attempts: config.max_attempts,
            timeout: config.timeout(),
            max_bytes: config.max_bytes,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// A fetched document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The final URL after redirects
    pub final_url: Url,
    /// Response body text
    pub body: String,
}

/// Source of transport sessions.
pub trait Transport: Send + Sync {
    /// Open a new session. Nothing is shared with earlier sessions.
    fn open(&self, user_agent: &str) -> Result<Box<dyn TransportSession>, Error>;
}

/// One transport session, used for the duration of a single fetcher slot.
#[async_trait]
pub trait TransportSession: Send + Sync {
    /// Issue one GET request. Non-success statuses are errors.
    async fn get(&self, url: &Url) -> Result<FetchedPage, Error>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    timeout: Duration,
    max_bytes: usize,
}

impl HttpTransport {
    pub fn new(timeout: Duration, max_bytes: usize) -> Self {
        Self { timeout, max_bytes }
    }
}

impl Transport for HttpTransport {
    fn open(&self, user_agent: &str) -> Result<Box<dyn TransportSession>, Error> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Box::new(HttpSession { http, max_bytes: self.max_bytes }))
    }
}

struct HttpSession {
    http: Client,
    max_bytes: usize,
}

#[async_trait]
impl TransportSession for HttpSession {
    async fn get(&self, url: &Url) -> Result<FetchedPage, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len > self.max_bytes as u64
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.max_bytes)));
        }

        let final_url = response.url().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.max_bytes)));
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(FetchedPage { final_url, body })
    }
}

/// Process-wide gate admitting one fetch at a time.
pub struct SerializedFetcher {
    slot: Semaphore,
    transport: Arc<dyn Transport>,
    config: FetchConfig,
}

impl SerializedFetcher {
    /// Create a fetcher over the HTTP transport.
    pub fn new(config: FetchConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(config.timeout, config.max_bytes));
        Self::with_transport(config, transport)
    }

    /// Create a fetcher over a custom transport.
    pub fn with_transport(config: FetchConfig, transport: Arc<dyn Transport>) -> Self {
        Self { slot: Semaphore::new(1), transport, config }
    }

    /// Wait for the slot, sleep the cooldown and open a session.
    pub async fn acquire(&self) -> Result<FetchSession<'_>, Error> {
        let permit = self
            .slot
            .acquire()
            .await
            .map_err(|_| Error::HttpError("fetcher closed".into()))?;

        let cooldown = self.pick_cooldown();
        tracing::debug!(cooldown_ms = cooldown.as_millis() as u64, "fetch slot acquired, cooling down");
        tokio::time::sleep(cooldown).await;

        let user_agent = self.config.user_agent.clone().unwrap_or_else(random_user_agent);
        tracing::debug!(user_agent = %user_agent, "opening fetch session");
        let session = self.transport.open(&user_agent)?;

        Ok(FetchSession { _permit: permit, session, max_attempts: self.config.max_attempts.max(1) })
    }

    /// Acquire a session and fetch one URL with it.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, Error> {
        let session = self.acquire().await?;
        session.get(url).await
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn pick_cooldown(&self) -> Duration {
        let min = self.config.cooldown.start().as_millis() as u64;
        let max = self.config.cooldown.end().as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

/// Exclusive use of the fetch slot. Dropping it frees the slot.
pub struct FetchSession<'a> {
    _permit: SemaphorePermit<'a>,
    session: Box<dyn TransportSession>,
    max_attempts: u32,
}

impl FetchSession<'_> {
    /// GET `url`, retrying inside this session on failure.
    pub async fn get(&self, url: &Url) -> Result<FetchedPage, Error> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            tracing::info!(url = %url, attempt, "fetching");
            match self.session.get(url).await {
                Ok(page) => return Ok(page),
                Err(e @ Error::FetchTooLarge(_)) => {
                    tracing::error!(url = %url, attempt, error = %e, "response too large, not retrying");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(url = %url, attempt, error = %e, "fetch attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        tracing::error!(url = %url, attempts = self.max_attempts, "maximum retries reached");
        Err(Error::RetriesExhausted { url: url.to_string(), attempts: self.max_attempts, last_error })
    }
}
