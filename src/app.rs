//! Wiring: builds the query engine and favorites service from a [`Config`].

use std::sync::Arc;

use anyhow::Result;
use offline_bible_core::store::FavoriteStore;
use sqlx::SqlitePool;
use tracing::warn;

use crate::backup::JsonFileFavoriteStore;
use crate::config::Config;
use crate::corpus::{source_from_config, CorpusCache, CorpusStore, SqliteCorpusCache};
use crate::db;
use crate::engine::QueryEngine;
use crate::favorites::Favorites;
use crate::migrate;
use crate::sqlite_store::SqliteFavoriteStore;

/// Everything a CLI command or HTTP handler needs.
pub struct App {
    pub config: Config,
    pub engine: QueryEngine,
    pub favorites: Favorites,
}

impl App {
    /// Open the database and assemble the services.
    ///
    /// A database that cannot be opened or migrated is not fatal: the corpus
    /// then loads without a durable cache and favorites use the backup file.
    pub async fn open(config: Config) -> Result<App> {
        let pool = match open_pool(&config).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(path = %config.db.path.display(), error = %e, "Database unavailable, running without durable storage");
                None
            }
        };
        App::with_pool(config, pool)
    }

    pub fn with_pool(config: Config, pool: Option<SqlitePool>) -> Result<App> {
        let source = source_from_config(&config.corpus)?;
        let cache = pool
            .clone()
            .map(|p| Arc::new(SqliteCorpusCache::new(p)) as Arc<dyn CorpusCache>);
        let store = CorpusStore::new(source, cache, config.corpus.cache_ttl());
        let engine = QueryEngine::new(store, config.search.limits());

        let primary = pool.map(|p| Arc::new(SqliteFavoriteStore::new(p)) as Arc<dyn FavoriteStore>);
        let backup = Arc::new(JsonFileFavoriteStore::new(&config.favorites.backup_path));
        let favorites = Favorites::new(primary, backup);

        Ok(App {
            config,
            engine,
            favorites,
        })
    }
}

async fn open_pool(config: &Config) -> Result<SqlitePool> {
    let pool = db::connect(config).await?;
    migrate::migrate(&pool).await?;
    Ok(pool)
}
