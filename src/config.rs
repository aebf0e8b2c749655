//! TOML configuration.
//!
//! `[db]` and `[corpus]` are required; every other section falls back to
//! the built-in defaults. See `config/bible.example.toml`.

use anyhow::{Context, Result};
use offline_bible_core::SearchLimits;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    /// File path, or an `http://` / `https://` URL.
    pub source: String,
    #[serde(default = "default_cache_ttl_days")]
    pub cache_ttl_days: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Upper bound on `corpus.cache_ttl_days` (about a century).
pub const MAX_CACHE_TTL_DAYS: u64 = 36_500;

fn default_cache_ttl_days() -> u64 {
    30
}
fn default_timeout_secs() -> u64 {
    30
}

impl CorpusConfig {
    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_days.saturating_mul(SECS_PER_DAY))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    #[serde(default = "default_max_expanded_tokens")]
    pub max_expanded_tokens: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let limits = SearchLimits::default();
        Self {
            max_matches: limits.max_matches,
            display_limit: limits.display_limit,
            max_expanded_tokens: limits.max_expanded_tokens,
        }
    }
}

fn default_max_matches() -> usize {
    SearchLimits::default().max_matches
}
fn default_display_limit() -> usize {
    SearchLimits::default().display_limit
}
fn default_max_expanded_tokens() -> usize {
    SearchLimits::default().max_expanded_tokens
}

impl SearchConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_matches: self.max_matches,
            display_limit: self.display_limit,
            max_expanded_tokens: self.max_expanded_tokens,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FavoritesConfig {
    #[serde(default = "default_backup_path")]
    pub backup_path: PathBuf,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            backup_path: default_backup_path(),
        }
    }
}

fn default_backup_path() -> PathBuf {
    PathBuf::from("./data/favorites_backup.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.corpus.source.trim().is_empty() {
        anyhow::bail!("corpus.source must not be empty");
    }
    if config.corpus.cache_ttl_days == 0 {
        anyhow::bail!("corpus.cache_ttl_days must be > 0");
    }
    if config.corpus.cache_ttl_days > MAX_CACHE_TTL_DAYS {
        anyhow::bail!(
            "corpus.cache_ttl_days must be <= {} (got {})",
            MAX_CACHE_TTL_DAYS,
            config.corpus.cache_ttl_days
        );
    }
    if config.corpus.timeout_secs == 0 {
        anyhow::bail!("corpus.timeout_secs must be > 0");
    }

    if config.search.max_matches == 0 {
        anyhow::bail!("search.max_matches must be >= 1");
    }
    if config.search.display_limit == 0 || config.search.display_limit > config.search.max_matches
    {
        anyhow::bail!("search.display_limit must be in [1, search.max_matches]");
    }
    if config.search.max_expanded_tokens == 0 {
        anyhow::bail!("search.max_expanded_tokens must be >= 1");
    }

    Ok(config)
}
