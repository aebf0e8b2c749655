//! The query engine: the single entry point for lookups and searches.
//!
//! Wraps a [`CorpusStore`] and a lazily built, memoized [`SearchIndex`].
//! Every operation loads the corpus on demand, so callers never need to
//! order `load_corpus` before anything else.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Utc};
use offline_bible_core::lookup;
use offline_bible_core::models::{Corpus, CorpusStats, LoadStatus, SearchResult};
use offline_bible_core::{BibleError, SearchIndex, SearchLimits};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::corpus::CorpusStore;

pub struct QueryEngine {
    store: CorpusStore,
    limits: SearchLimits,
    /// `None` once a build has failed; search then scans directly.
    index: OnceCell<Option<Arc<SearchIndex>>>,
    index_builds: AtomicUsize,
}

impl QueryEngine {
    pub fn new(store: CorpusStore, limits: SearchLimits) -> Self {
        Self {
            store,
            limits,
            index: OnceCell::new(),
            index_builds: AtomicUsize::new(0),
        }
    }

    pub async fn load_corpus(&self) -> Result<Arc<Corpus>, BibleError> {
        self.store.load().await
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn load_status(&self) -> LoadStatus {
        self.store.status()
    }

    pub async fn stats(&self) -> Result<CorpusStats, BibleError> {
        Ok(self.load_corpus().await?.stats())
    }

    pub async fn resolve_reference(&self, raw: &str) -> Result<SearchResult, BibleError> {
        let corpus = self.load_corpus().await?;
        lookup::resolve_reference(&corpus, raw)
    }

    pub async fn search(&self, keyword: &str) -> Result<SearchResult, BibleError> {
        let corpus = self.load_corpus().await?;
        if keyword.trim().is_empty() {
            return Err(BibleError::EmptySearch);
        }
        let index = self.search_index(&corpus).await;
        lookup::search(&corpus, index.as_deref(), keyword, &self.limits)
    }

    /// Reference lookup, falling back to keyword search on a reference miss.
    pub async fn book_content(&self, query: &str) -> Result<SearchResult, BibleError> {
        let corpus = self.load_corpus().await?;
        let first = lookup::resolve_reference(&corpus, query);
        if !matches!(&first, Err(e) if e.is_reference_miss()) {
            return first;
        }
        let index = self.search_index(&corpus).await;
        lookup::with_keyword_fallback(first, || {
            lookup::search(&corpus, index.as_deref(), query, &self.limits)
        })
    }

    pub async fn random_verse(&self) -> Result<SearchResult, BibleError> {
        let corpus = self.load_corpus().await?;
        let mut rng = rand::thread_rng();
        lookup::random_verse(&corpus, &mut rng)
    }

    /// A well-known verse by rotating index, or a random verse if that
    /// reference does not resolve in the loaded corpus.
    pub async fn popular_verse(&self, index: i64) -> Result<SearchResult, BibleError> {
        let reference = lookup::popular_reference(index);
        match self.resolve_reference(reference).await {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(reference, error = %err, "Popular verse did not resolve, using a random verse");
                self.random_verse().await
            }
        }
    }

    /// Popular verse keyed by the current UTC day of the year.
    pub async fn daily_verse(&self) -> Result<SearchResult, BibleError> {
        self.popular_verse(i64::from(Utc::now().ordinal())).await
    }

    /// Build the index once. Concurrent first callers wait on the same build.
    async fn search_index(&self, corpus: &Arc<Corpus>) -> Option<Arc<SearchIndex>> {
        self.index
            .get_or_init(|| async {
                self.index_builds.fetch_add(1, Ordering::SeqCst);
                let corpus = Arc::clone(corpus);
                let started = Instant::now();
                let built = tokio::task::spawn_blocking(move || SearchIndex::build(&corpus)).await;
                match built {
                    Ok(Ok(index)) => {
                        info!(
                            tokens = index.token_count(),
                            prefixes = index.prefix_count(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Search index built"
                        );
                        Some(Arc::new(index))
                    }
                    Ok(Err(err)) => {
                        warn!(error = %err, "Search index build failed, falling back to direct scan");
                        None
                    }
                    Err(err) => {
                        warn!(error = %err, "Search index task failed, falling back to direct scan");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Whether a usable index has been built.
    pub fn has_index(&self) -> bool {
        matches!(self.index.get(), Some(Some(_)))
    }

    /// How many index builds have been started.
    pub fn index_builds(&self) -> usize {
        self.index_builds.load(Ordering::SeqCst)
    }
}
