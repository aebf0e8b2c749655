//! SQLite-backed [`FavoriteStore`], the primary favorites store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use offline_bible_core::models::Favorite;
use offline_bible_core::store::FavoriteStore;

/// The `favorites` table. `date_added` is stored as Unix milliseconds.
pub struct SqliteFavoriteStore {
    pool: SqlitePool,
}

impl SqliteFavoriteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_favorite(row: &SqliteRow) -> Result<Favorite> {
    let date_added: i64 = row.get("date_added");
    let chapter: i64 = row.get("chapter");
    let verse: i64 = row.get("verse");
    Ok(Favorite {
        id: row.get("id"),
        book_name: row.get("book_name"),
        chapter: u32::try_from(chapter).context("favorite chapter out of range")?,
        verse: u32::try_from(verse).context("favorite verse out of range")?,
        text: row.get("text"),
        reference: row.get("reference"),
        date_added: DateTime::from_timestamp_millis(date_added)
            .context("favorite date_added out of range")?,
    })
}

const SELECT_FAVORITES: &str =
    "SELECT id, book_name, chapter, verse, text, reference, date_added FROM favorites";

const UPSERT_FAVORITE: &str = r#"
    INSERT INTO favorites (id, book_name, chapter, verse, text, reference, date_added)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        book_name = excluded.book_name,
        chapter = excluded.chapter,
        verse = excluded.verse,
        text = excluded.text,
        reference = excluded.reference,
        date_added = excluded.date_added
"#;

#[async_trait]
impl FavoriteStore for SqliteFavoriteStore {
    async fn put(&self, favorite: &Favorite) -> Result<()> {
        sqlx::query(UPSERT_FAVORITE)
            .bind(&favorite.id)
            .bind(&favorite.book_name)
            .bind(favorite.chapter)
            .bind(favorite.verse)
            .bind(&favorite.text)
            .bind(&favorite.reference)
            .bind(favorite.date_added.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM favorites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Favorite>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_FAVORITES))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_favorite).transpose()
    }

    async fn all(&self) -> Result<Vec<Favorite>> {
        let rows = sqlx::query(&format!("{} ORDER BY date_added DESC", SELECT_FAVORITES))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_favorite).collect()
    }

    async fn replace_all(&self, favorites: &[Favorite]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM favorites")
            .execute(&mut *tx)
            .await?;

        for favorite in favorites {
            sqlx::query(UPSERT_FAVORITE)
                .bind(&favorite.id)
                .bind(&favorite.book_name)
                .bind(favorite.chapter)
                .bind(favorite.verse)
                .bind(&favorite.text)
                .bind(&favorite.reference)
                .bind(favorite.date_added.timestamp_millis())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
