//! Lyrics check table operations

use sqlx::{FromRow, SqlitePool};

use crate::models::LyricsCheck;

/// Database row for the lyrics_check table
#[derive(Debug, FromRow)]
struct LyricsCheckRow {
    song_id: i64,
    excerpt: Option<String>,
    is_clean: i64,
    checked_at: i64,
}

impl LyricsCheckRow {
    fn into_check(self) -> LyricsCheck {
        LyricsCheck {
            song_id: self.song_id,
            excerpt: self.excerpt,
            is_clean: self.is_clean != 0,
            checked_at: self.checked_at,
        }
    }
}

/// Lyrics check table operations
pub struct LyricsCheckTable;

impl LyricsCheckTable {
    /// Get the check for a song
    pub async fn get(pool: &SqlitePool, song_id: i64) -> Result<Option<LyricsCheck>, sqlx::Error> {
        let row: Option<LyricsCheckRow> =
            sqlx::query_as("SELECT * FROM lyrics_check WHERE song_id = ?")
                .bind(song_id)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(LyricsCheckRow::into_check))
    }

    /// Insert or replace the single check row for a song.
    /// Upsert keeps concurrent completions to one row (last writer wins).
    pub async fn upsert(
        pool: &SqlitePool,
        song_id: i64,
        excerpt: Option<&str>,
        is_clean: bool,
    ) -> Result<LyricsCheck, sqlx::Error> {
        let checked_at = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO lyrics_check (song_id, excerpt, is_clean, checked_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(song_id) DO UPDATE SET
                excerpt = excluded.excerpt,
                is_clean = excluded.is_clean,
                checked_at = excluded.checked_at
            "#,
        )
        .bind(song_id)
        .bind(excerpt)
        .bind(is_clean as i64)
        .bind(checked_at)
        .execute(pool)
        .await?;

        Ok(LyricsCheck {
            song_id,
            excerpt: excerpt.map(|s| s.to_string()),
            is_clean,
            checked_at,
        })
    }
}
