//! camdict entry point.
//!
//! Looks words up in the Cambridge English dictionary, cache first.
//! Logging goes to stderr so stdout only carries rendered entries.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use camdict_client::{DictionaryUrls, FetchConfig, LookupService, Rendered, RenderedKind, SerializedFetcher};
use camdict_core::{AppConfig, CacheDb, Error, TaskRegistry, drained};

/// Number of words shown by `list --random`.
const RANDOM_WORDS: usize = 20;

#[derive(Parser)]
#[command(name = "camdict", version, about = "Cambridge English dictionary lookups with a local cache")]
struct Args {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up one or more words
    Search {
        /// Words or phrases to look up
        #[arg(required = true)]
        words: Vec<String>,
        /// Skip the cache and fetch from the site
        #[arg(short, long)]
        fresh: bool,
    },
    /// List cached words
    List {
        /// Show 20 random words instead of the full list
        #[arg(short, long)]
        random: bool,
    },
    /// Remove a word from the cache
    Delete {
        /// Input word or canonical word to remove
        word: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::debug!(db_path = %config.db_path.display(), base_url = %config.base_url, "configuration loaded");

    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open cache at {}", config.db_path.display()))?;

    match args.command {
        Command::Search { words, fresh } => search(&config, cache, words, fresh).await,
        Command::List { random } => list(&cache, random).await,
        Command::Delete { word } => delete(&cache, &word).await,
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("camdict=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn search(config: &AppConfig, cache: CacheDb, words: Vec<String>, fresh: bool) -> Result<()> {
    let tasks = TaskRegistry::new();
    let urls = DictionaryUrls::new(&config.base_url)?;
    let fetcher = Arc::new(SerializedFetcher::new(FetchConfig::from(config)));
    let service = LookupService::new(cache, fetcher, tasks.clone(), urls);

    let total = words.len();
    let mut results = drained(&tasks, async {
        let mut set = JoinSet::new();
        for (index, word) in words.into_iter().enumerate() {
            let service = service.clone();
            set.spawn(async move {
                let result = service.lookup(&word, fresh).await;
                (index, word, result)
            });
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = set.join_next().await {
            results.push(joined?);
        }
        Ok::<_, anyhow::Error>(results)
    })
    .await?;
    results.sort_by_key(|(index, _, _)| *index);

    let mut failed = 0;
    for (index, (_, word, result)) in results.into_iter().enumerate() {
        if index > 0 {
            println!();
        }
        match result {
            Ok(rendered) => print_rendered(&word, &rendered),
            Err(e) => {
                failed += 1;
                report_failure(&word, &e);
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} lookups failed");
    }
    Ok(())
}

fn print_rendered(word: &str, rendered: &Rendered) {
    if rendered.kind == RenderedKind::Suggestions {
        println!("No entry for \"{word}\". Suggestions:");
    }
    println!("{}", rendered.text);
}

fn report_failure(word: &str, error: &Error) {
    match error {
        Error::EntryNotFound(url) => tracing::error!(word, url = %url, "page has no dictionary entry"),
        Error::RetriesExhausted { url, attempts, .. } => {
            tracing::error!(word, url = %url, attempts, "giving up after repeated fetch failures")
        }
        other => tracing::error!(word, error = %other, "lookup failed"),
    }
}

async fn list(cache: &CacheDb, random: bool) -> Result<()> {
    if random {
        let words = cache.random_words(RANDOM_WORDS).await?;
        if words.is_empty() {
            println!("The cache is empty.");
        }
        for word in words {
            println!("{word}");
        }
        return Ok(());
    }

    let words = cache.list_words().await?;
    if words.is_empty() {
        println!("The cache is empty.");
    }
    for listing in words {
        println!("{}  {}", listing.response_word, listing.created_at);
    }
    Ok(())
}

async fn delete(cache: &CacheDb, word: &str) -> Result<()> {
    match cache.delete_word(word.trim()).await? {
        Some(deleted) => {
            tracing::info!(word, rows = deleted.rows, "deleted cached entry");
            println!("Deleted \"{}\" ({}) from the cache.", deleted.input_word, deleted.response_url);
        }
        None => println!("\"{}\" is not in the cache.", word.trim()),
    }
    Ok(())
}
