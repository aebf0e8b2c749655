//! Corpus loading: sources, the durable cache, and the load-once store.
//!
//! # Resolution order
//!
//! On the first [`CorpusStore::load`] of a process:
//!
//! 1. A cache entry younger than the freshness window is used directly.
//! 2. Otherwise the [`CorpusSource`] is fetched and validated. A valid
//!    payload is written through to the cache (best-effort).
//! 3. If the fetch fails, or the fetched payload is invalid, any cache
//!    entry is used even when stale.
//! 4. With no cache at all the load fails: `CORPUS_UNAVAILABLE` for an
//!    I/O failure, `INVALID_CORPUS` for a bad payload.
//!
//! Concurrent callers share one in-flight load and its outcome. A successful
//! load is kept for the life of the store; a failed one is not, so the next
//! call retries.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use offline_bible_core::models::{Corpus, LoadStatus};
use offline_bible_core::BibleError;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::config::CorpusConfig;

/// Where the canonical corpus document comes from.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Fetch the raw corpus document.
    async fn fetch(&self) -> Result<String>;
}

/// Corpus document on local disk.
pub struct FileCorpusSource {
    path: PathBuf,
}

impl FileCorpusSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CorpusSource for FileCorpusSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read corpus file: {}", self.path.display()))
    }
}

/// Corpus document served over HTTP(S).
pub struct HttpCorpusSource {
    url: String,
    client: reqwest::Client,
}

impl HttpCorpusSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl CorpusSource for HttpCorpusSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch corpus from {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Corpus fetch from {} failed with status {}", self.url, status);
        }

        Ok(response.text().await?)
    }
}

/// Build the source named by `[corpus].source`.
pub fn source_from_config(config: &CorpusConfig) -> Result<Arc<dyn CorpusSource>> {
    if config.is_remote() {
        Ok(Arc::new(HttpCorpusSource::new(
            config.source.clone(),
            config.timeout(),
        )?))
    } else {
        Ok(Arc::new(FileCorpusSource::new(&config.source)))
    }
}

/// A cached corpus payload and when it was written.
#[derive(Debug, Clone)]
pub struct CachedCorpus {
    pub payload: String,
    pub cached_at: DateTime<Utc>,
}

/// Durable single-entry corpus cache.
#[async_trait]
pub trait CorpusCache: Send + Sync {
    async fn read(&self) -> Result<Option<CachedCorpus>>;

    async fn write(&self, version: &str, payload: &str, cached_at: DateTime<Utc>) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// The `corpus_cache` table.
pub struct SqliteCorpusCache {
    pool: SqlitePool,
}

impl SqliteCorpusCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CorpusCache for SqliteCorpusCache {
    async fn read(&self) -> Result<Option<CachedCorpus>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT payload, cached_at FROM corpus_cache WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(payload, cached_at)| CachedCorpus {
            payload,
            // unreadable timestamps count as stale
            cached_at: DateTime::from_timestamp_millis(cached_at).unwrap_or(DateTime::UNIX_EPOCH),
        }))
    }

    async fn write(&self, version: &str, payload: &str, cached_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO corpus_cache (id, version, payload, cached_at)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                version = excluded.version,
                payload = excluded.payload,
                cached_at = excluded.cached_at
            "#,
        )
        .bind(version)
        .bind(payload)
        .bind(cached_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM corpus_cache")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

type LoadAttempt = Shared<BoxFuture<'static, Result<Arc<Corpus>, BibleError>>>;

/// Load-once owner of the in-memory corpus.
pub struct CorpusStore {
    loader: Arc<Loader>,
    state: Arc<LoadState>,
}

struct Loader {
    source: Arc<dyn CorpusSource>,
    cache: Option<Arc<dyn CorpusCache>>,
    ttl: Duration,
}

struct LoadState {
    corpus: OnceLock<Arc<Corpus>>,
    /// The attempt every concurrent caller awaits. Cleared when it settles.
    in_flight: Mutex<Option<LoadAttempt>>,
    loading: AtomicBool,
}

impl LoadState {
    fn in_flight(&self) -> MutexGuard<'_, Option<LoadAttempt>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a load as running until dropped, then frees the slot for a retry.
struct LoadingGuard(Arc<LoadState>);

impl LoadingGuard {
    fn raise(state: Arc<LoadState>) -> Self {
        state.loading.store(true, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.in_flight().take();
        self.0.loading.store(false, Ordering::SeqCst);
    }
}

impl CorpusStore {
    pub fn new(
        source: Arc<dyn CorpusSource>,
        cache: Option<Arc<dyn CorpusCache>>,
        ttl: Duration,
    ) -> Self {
        Self {
            loader: Arc::new(Loader { source, cache, ttl }),
            state: Arc::new(LoadState {
                corpus: OnceLock::new(),
                in_flight: Mutex::new(None),
                loading: AtomicBool::new(false),
            }),
        }
    }

    /// The loaded corpus, loading it on first use.
    ///
    /// Callers that arrive while a load is running share its outcome,
    /// failure included. Only a call made after a failed attempt retries.
    pub async fn load(&self) -> Result<Arc<Corpus>, BibleError> {
        if let Some(corpus) = self.get() {
            return Ok(corpus);
        }
        let attempt = {
            let mut in_flight = self.state.in_flight();
            if let Some(corpus) = self.get() {
                return Ok(corpus);
            }
            match in_flight.as_ref() {
                Some(attempt) => attempt.clone(),
                None => {
                    let attempt = self.start_attempt();
                    *in_flight = Some(attempt.clone());
                    attempt
                }
            }
        };
        attempt.await
    }

    /// Run one load on its own task so a dropped caller cannot stall it.
    fn start_attempt(&self) -> LoadAttempt {
        let loader = Arc::clone(&self.loader);
        let guard = LoadingGuard::raise(Arc::clone(&self.state));
        let task = tokio::spawn(async move {
            let result = loader.load_uncached().await.map(Arc::new);
            if let Ok(corpus) = &result {
                let _ = guard.0.corpus.set(Arc::clone(corpus));
            }
            drop(guard);
            result
        });
        async move {
            task.await.unwrap_or_else(|err| {
                error!(error = %err, "Corpus load task failed");
                Err(BibleError::CorpusUnavailable)
            })
        }
        .boxed()
        .shared()
    }

    /// The corpus if a load already completed.
    pub fn get(&self) -> Option<Arc<Corpus>> {
        self.state.corpus.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.corpus.get().is_some()
    }

    pub fn status(&self) -> LoadStatus {
        LoadStatus {
            is_loading: self.state.loading.load(Ordering::SeqCst),
            is_ready: self.is_loaded(),
        }
    }
}

impl Loader {
    async fn load_uncached(&self) -> Result<Corpus, BibleError> {
        let started = Instant::now();
        let now = Utc::now();
        let cached = self.read_cache().await;

        if let Some((corpus, cached_at)) = &cached {
            if self.is_fresh(*cached_at, now) {
                log_loaded(corpus, "cache", started);
                return Ok(corpus.clone());
            }
            debug!(cached_at = %cached_at, "Cached corpus is stale, fetching");
        }

        match self.source.fetch().await {
            Ok(payload) => match Corpus::from_json(&payload) {
                Ok(corpus) => {
                    self.write_cache(&corpus.version, &payload, now).await;
                    log_loaded(&corpus, "fetch", started);
                    Ok(corpus)
                }
                Err(err) => {
                    warn!(source = %self.source.describe(), error = %err, "Fetched corpus is invalid");
                    match cached {
                        Some((corpus, _)) => {
                            log_loaded(&corpus, "stale-cache", started);
                            Ok(corpus)
                        }
                        None => Err(err),
                    }
                }
            },
            Err(err) => {
                warn!(source = %self.source.describe(), error = %err, "Corpus fetch failed");
                match cached {
                    Some((corpus, _)) => {
                        log_loaded(&corpus, "stale-cache", started);
                        Ok(corpus)
                    }
                    None => Err(BibleError::CorpusUnavailable),
                }
            }
        }
    }

    /// Read and validate the cache entry. An entry that fails validation is
    /// cleared and treated as absent.
    async fn read_cache(&self) -> Option<(Corpus, DateTime<Utc>)> {
        let cache = self.cache.as_ref()?;
        let entry = match cache.read().await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!(error = %e, "Failed to read corpus cache");
                return None;
            }
        };

        match Corpus::from_json(&entry.payload) {
            Ok(corpus) => Some((corpus, entry.cached_at)),
            Err(err) => {
                warn!(error = %err, "Cached corpus is invalid, clearing");
                if let Err(e) = cache.clear().await {
                    warn!(error = %e, "Failed to clear corpus cache");
                }
                None
            }
        }
    }

    async fn write_cache(&self, version: &str, payload: &str, now: DateTime<Utc>) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.write(version, payload, now).await {
            warn!(error = %e, "Failed to write corpus cache, continuing in memory");
        }
    }

    /// Timestamps in the future count as fresh.
    fn is_fresh(&self, cached_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let age_ms = now.timestamp_millis() - cached_at.timestamp_millis();
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        age_ms < ttl_ms
    }
}

fn log_loaded(corpus: &Corpus, source: &str, started: Instant) {
    let stats = corpus.stats();
    info!(
        source,
        version = %corpus.version,
        books = stats.books,
        chapters = stats.chapters,
        verses = stats.verses,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Corpus loaded"
    );
    if !corpus.is_complete() {
        warn!(books = stats.books, "Corpus does not have the canonical 66 books");
    }
}
