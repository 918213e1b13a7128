//! Song table operations

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

use crate::catalog::CatalogTrack;
use crate::models::Song;

/// Database row for the song table
#[derive(Debug, FromRow)]
struct SongRow {
    id: i64,
    catalog_id: String,
    title: String,
    artist: String,
    album: Option<String>,
    explicit: i64,
    duration_ms: i64,
    added_at: i64,
}

impl SongRow {
    fn into_song(self) -> Song {
        Song {
            id: self.id,
            catalog_id: self.catalog_id,
            title: self.title,
            artist: self.artist,
            album: self.album,
            explicit: self.explicit != 0,
            duration_ms: self.duration_ms,
            added_at: self.added_at,
        }
    }
}

/// An approved song with its crowd stats
#[derive(Debug, FromRow)]
pub struct ApprovedSongRow {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub like_count: i64,
    pub request_count: i64,
}

/// A song ranked by total request count
#[derive(Debug, FromRow)]
pub struct PopularSongRow {
    pub title: String,
    pub artist: String,
    pub request_count: i64,
}

/// Song table operations
pub struct SongTable;

impl SongTable {
    /// Get a song by database ID
    pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Song>, sqlx::Error> {
        let row: Option<SongRow> = sqlx::query_as("SELECT * FROM song WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(SongRow::into_song))
    }

    /// Get a song by its catalog identifier
    pub async fn get_by_catalog_id(
        pool: &SqlitePool,
        catalog_id: &str,
    ) -> Result<Option<Song>, sqlx::Error> {
        let row: Option<SongRow> = sqlx::query_as("SELECT * FROM song WHERE catalog_id = ?")
            .bind(catalog_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(SongRow::into_song))
    }

    /// Insert a song mirrored from a catalog track, returning it.
    /// A concurrent insert of the same catalog id resolves to the
    /// existing row.
    pub async fn ensure(pool: &SqlitePool, track: &CatalogTrack) -> Result<Song, sqlx::Error> {
        let added_at = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO song (catalog_id, title, artist, album, explicit, duration_ms, added_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(catalog_id) DO NOTHING
            "#,
        )
        .bind(&track.id)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.album)
        .bind(track.explicit as i64)
        .bind(track.duration_ms)
        .bind(added_at)
        .execute(pool)
        .await?;

        let row: SongRow = sqlx::query_as("SELECT * FROM song WHERE catalog_id = ?")
            .bind(&track.id)
            .fetch_one(pool)
            .await?;

        Ok(row.into_song())
    }

    /// Songs with at least one approved request, with like and
    /// approved-request counts, most liked first
    pub async fn approved_with_stats(
        pool: &SqlitePool,
    ) -> Result<Vec<ApprovedSongRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT s.id AS song_id, s.title, s.artist,
                   (SELECT COUNT(*) FROM song_like l WHERE l.song_id = s.id) AS like_count,
                   COUNT(r.id) AS request_count
            FROM song s
            JOIN request r ON r.song_id = s.id AND r.status = 'Approved'
            GROUP BY s.id
            ORDER BY like_count DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Most requested songs across all statuses
    pub async fn most_requested(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<PopularSongRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT s.title, s.artist, COUNT(r.id) AS request_count
            FROM song s
            JOIN request r ON r.song_id = s.id
            GROUP BY s.id
            ORDER BY request_count DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
