//! JSON snapshot file used as the favorites backup store.
//!
//! The file holds an array of favorites with camelCase fields. Every write
//! goes to a sibling temp file that is then renamed over the target, so a
//! crash never leaves a half-written snapshot. A missing or unreadable file
//! reads as empty.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use offline_bible_core::models::Favorite;
use offline_bible_core::store::FavoriteStore;

pub struct JsonFileFavoriteStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileFavoriteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Favorite>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read favorites backup: {}", self.path.display())
                })
            }
        };

        match serde_json::from_str(&content) {
            Ok(favorites) => Ok(favorites),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Favorites backup is unreadable, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn write_all(&self, favorites: &[Favorite]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(favorites)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for JsonFileFavoriteStore {
    async fn put(&self, favorite: &Favorite) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut favorites = self.read_all().await?;
        match favorites.iter_mut().find(|f| f.id == favorite.id) {
            Some(existing) => *existing = favorite.clone(),
            None => favorites.push(favorite.clone()),
        }
        self.write_all(&favorites).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut favorites = self.read_all().await?;
        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        if favorites.len() == before {
            return Ok(());
        }
        self.write_all(&favorites).await
    }

    async fn get(&self, id: &str) -> Result<Option<Favorite>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().find(|f| f.id == id))
    }

    async fn all(&self) -> Result<Vec<Favorite>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn replace_all(&self, favorites: &[Favorite]) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_all(favorites).await
    }
}
