//! Storage abstraction for saved favorites.
//!
//! The [`FavoriteStore`] trait is the keyed collection behind the favorites
//! service. Backends: SQLite (primary), a JSON snapshot file (backup), and
//! [`memory::InMemoryFavoriteStore`] for tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Favorite;

/// Keyed favorites collection. Keys are [`Favorite::id`].
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`put`](FavoriteStore::put) | Insert or overwrite by id |
/// | [`delete`](FavoriteStore::delete) | Remove by id (missing ids are not an error) |
/// | [`get`](FavoriteStore::get) | Fetch one by id |
/// | [`all`](FavoriteStore::all) | Every entry, any order |
/// | [`replace_all`](FavoriteStore::replace_all) | Overwrite the whole collection |
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn put(&self, favorite: &Favorite) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Favorite>>;

    async fn all(&self) -> Result<Vec<Favorite>>;

    /// Replace every entry with `favorites`, used for backup snapshots.
    async fn replace_all(&self, favorites: &[Favorite]) -> Result<()>;
}

/// Sort newest `date_added` first; ties broken by id so output is stable.
pub fn sort_newest_first(favorites: &mut [Favorite]) {
    favorites.sort_by(|a, b| {
        b.date_added
            .cmp(&a.date_added)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Group by book name, each group sorted by chapter then verse.
pub fn group_by_book(favorites: Vec<Favorite>) -> BTreeMap<String, Vec<Favorite>> {
    let mut grouped: BTreeMap<String, Vec<Favorite>> = BTreeMap::new();
    for fav in favorites {
        grouped.entry(fav.book_name.clone()).or_default().push(fav);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|f| (f.chapter, f.verse));
    }
    grouped
}
