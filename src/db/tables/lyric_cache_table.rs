//! Lyric cache table operations
//!
//! SQLite-backed implementation of the resolver's `LyricStore`, so
//! cached lyrics survive process restarts. Keys are normalized before
//! hitting the table; writes to the same key are last-writer-wins via
//! upsert.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::core::resolver::{normalize_term, LyricStore};
use crate::models::LyricRecord;

/// Database row for the lyric_cache table
#[derive(Debug, FromRow)]
struct LyricCacheRow {
    text: Option<String>,
    source: Option<String>,
    fetched_at: i64,
}

/// Durable lyric cache backed by the lyric_cache table
#[derive(Clone)]
pub struct SqliteLyricStore {
    pool: SqlitePool,
}

impl SqliteLyricStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LyricStore for SqliteLyricStore {
    async fn get(&self, artist: &str, title: &str) -> Option<LyricRecord> {
        let artist = normalize_term(artist);
        let title = normalize_term(title);

        let row: Option<LyricCacheRow> = sqlx::query_as(
            "SELECT text, source, fetched_at FROM lyric_cache WHERE artist = ? AND title = ?",
        )
        .bind(&artist)
        .bind(&title)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| tracing::warn!("lyric cache read failed: {}", e))
        .ok()
        .flatten();

        row.map(|r| LyricRecord {
            text: r.text,
            source: r.source,
            fetched_at: r.fetched_at,
        })
    }

    async fn put(&self, artist: &str, title: &str, text: Option<&str>, source: Option<&str>) {
        let artist = normalize_term(artist);
        let title = normalize_term(title);
        let fetched_at = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO lyric_cache (artist, title, text, source, fetched_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(artist, title) DO UPDATE SET
                text = excluded.text,
                source = excluded.source,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(&artist)
        .bind(&title)
        .bind(text)
        .bind(source)
        .bind(fetched_at)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!("lyric cache write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbEngine;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let db = DbEngine::connect_memory().await.unwrap();
        let store = SqliteLyricStore::new(db.pool().clone());

        store
            .put("Artist", "Title", Some("some lyrics"), Some("lrclib"))
            .await;

        let record = store.get("Artist", "Title").await.unwrap();
        assert_eq!(record.text.as_deref(), Some("some lyrics"));
        assert_eq!(record.source.as_deref(), Some("lrclib"));
    }

    #[tokio::test]
    async fn test_key_normalization_collapses_variants() {
        let db = DbEngine::connect_memory().await.unwrap();
        let store = SqliteLyricStore::new(db.pool().clone());

        store.put("  The Band ", "Song  Name", Some("text"), None).await;

        assert!(store.get("the band", "song name").await.is_some());
        assert!(store.get("THE  BAND", " Song Name ").await.is_some());
        assert!(store.get("other band", "song name").await.is_none());
    }

    #[tokio::test]
    async fn test_known_absent_is_cacheable() {
        let db = DbEngine::connect_memory().await.unwrap();
        let store = SqliteLyricStore::new(db.pool().clone());

        store.put("a", "b", None, None).await;

        let record = store.get("a", "b").await.unwrap();
        assert!(record.text.is_none());
    }

    #[tokio::test]
    async fn test_same_key_write_is_last_writer_wins() {
        let db = DbEngine::connect_memory().await.unwrap();
        let store = SqliteLyricStore::new(db.pool().clone());

        store.put("a", "b", Some("first"), Some("lyrics_ovh")).await;
        store.put("a", "b", Some("second"), Some("lrclib")).await;

        let record = store.get("a", "b").await.unwrap();
        assert_eq!(record.text.as_deref(), Some("second"));
        assert_eq!(record.source.as_deref(), Some("lrclib"));
    }
}
