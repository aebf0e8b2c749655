//! In-memory [`FavoriteStore`] for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::Favorite;

use super::FavoriteStore;

#[derive(Default)]
pub struct InMemoryFavoriteStore {
    entries: RwLock<HashMap<String, Favorite>>,
}

impl InMemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("favorites lock poisoned")
}

#[async_trait]
impl FavoriteStore for InMemoryFavoriteStore {
    async fn put(&self, favorite: &Favorite) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(favorite.id.clone(), favorite.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.entries.write().map_err(poisoned)?.remove(id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Favorite>> {
        Ok(self.entries.read().map_err(poisoned)?.get(id).cloned())
    }

    async fn all(&self) -> Result<Vec<Favorite>> {
        Ok(self.entries.read().map_err(poisoned)?.values().cloned().collect())
    }

    async fn replace_all(&self, favorites: &[Favorite]) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.clear();
        for fav in favorites {
            entries.insert(fav.id.clone(), fav.clone());
        }
        Ok(())
    }
}
