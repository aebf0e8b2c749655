//! Favorites service over a primary store and a best-effort backup.
//!
//! Each mutation goes to the primary store, after which the backup is
//! rewritten as a snapshot of the primary; a failed snapshot is only
//! logged. When there is no primary store, or a primary operation fails,
//! the operation runs against the backup instead. Callers see the same
//! results either way.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::warn;

use offline_bible_core::models::{favorite_id, Favorite, NewFavorite};
use offline_bible_core::store::{group_by_book, sort_newest_first, FavoriteStore};

pub struct Favorites {
    primary: Option<Arc<dyn FavoriteStore>>,
    backup: Arc<dyn FavoriteStore>,
}

impl Favorites {
    pub fn new(primary: Option<Arc<dyn FavoriteStore>>, backup: Arc<dyn FavoriteStore>) -> Self {
        Self { primary, backup }
    }

    /// Save a verse, overwriting any existing entry for it. Returns the
    /// stored favorite with its fresh `date_added`.
    pub async fn add(&self, new: NewFavorite) -> Result<Favorite> {
        let favorite = new.stamp(Utc::now());

        if let Some(primary) = &self.primary {
            match primary.put(&favorite).await {
                Ok(()) => {
                    self.snapshot_to_backup(primary.as_ref()).await;
                    return Ok(favorite);
                }
                Err(e) => {
                    warn!(id = %favorite.id, error = %e, "Favorites store unavailable, using backup");
                }
            }
        }

        self.backup.put(&favorite).await?;
        Ok(favorite)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        if let Some(primary) = &self.primary {
            match primary.delete(id).await {
                Ok(()) => {
                    self.snapshot_to_backup(primary.as_ref()).await;
                    return Ok(());
                }
                Err(e) => {
                    warn!(id, error = %e, "Favorites store unavailable, using backup");
                }
            }
        }

        self.backup.delete(id).await
    }

    /// Every favorite, newest first.
    pub async fn all(&self) -> Result<Vec<Favorite>> {
        let mut favorites = match self.primary_all().await {
            Some(favorites) => favorites,
            None => self.backup.all().await?,
        };
        sort_newest_first(&mut favorites);
        Ok(favorites)
    }

    pub async fn is_favorite(&self, book_name: &str, chapter: u32, verse: u32) -> Result<bool> {
        let id = favorite_id(book_name, chapter, verse);
        if let Some(primary) = &self.primary {
            match primary.get(&id).await {
                Ok(found) => return Ok(found.is_some()),
                Err(e) => {
                    warn!(id = %id, error = %e, "Favorites store unavailable, using backup");
                }
            }
        }
        Ok(self.backup.get(&id).await?.is_some())
    }

    /// Favorites grouped by book name, each group in chapter/verse order.
    pub async fn by_book(&self) -> Result<BTreeMap<String, Vec<Favorite>>> {
        Ok(group_by_book(self.all().await?))
    }

    /// Overwrite the backup with the primary's full contents.
    async fn snapshot_to_backup(&self, primary: &dyn FavoriteStore) {
        let snapshot = match primary.all().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Favorites snapshot read failed, backup not updated");
                return;
            }
        };
        if let Err(e) = self.backup.replace_all(&snapshot).await {
            warn!(count = snapshot.len(), error = %e, "Favorites backup write failed");
        }
    }

    async fn primary_all(&self) -> Option<Vec<Favorite>> {
        let primary = self.primary.as_ref()?;
        match primary.all().await {
            Ok(favorites) => Some(favorites),
            Err(e) => {
                warn!(error = %e, "Favorites store unavailable, using backup");
                None
            }
        }
    }
}
