//! Database engine and connection management
//!
//! The pool is owned by the engine and handed to whoever needs it
//! rather than living in a global, so tests can run against isolated
//! in-memory databases.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Database engine wrapper
#[derive(Clone)]
pub struct DbEngine {
    pool: SqlitePool,
}

impl DbEngine {
    /// Open (or create) the SQLite database at the given path
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30))
            .pragma("cache_size", "10000")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let engine = DbEngine { pool };
        engine.create_tables().await?;

        Ok(engine)
    }

    /// Open an in-memory database (tests). Uses a single connection so
    /// every query sees the same memory store.
    pub async fn connect_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let engine = DbEngine { pool };
        engine.create_tables().await?;

        Ok(engine)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all database tables
    async fn create_tables(&self) -> Result<()> {
        let pool = &self.pool;

        // Song table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS song (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                catalog_id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                artist TEXT NOT NULL,
                album TEXT,
                explicit INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL,
                added_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_song_catalog_id ON song(catalog_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Request table. The partial unique index enforces the
        // one-pending-request-per-(requester, song) rule at the schema
        // level in addition to the submission check.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS request (
                id TEXT PRIMARY KEY,
                song_id INTEGER NOT NULL,
                requester_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending',
                moderated INTEGER NOT NULL DEFAULT 0,
                requested_at INTEGER NOT NULL,
                FOREIGN KEY (song_id) REFERENCES song(id)
            );
            CREATE INDEX IF NOT EXISTS idx_request_song_id ON request(song_id);
            CREATE INDEX IF NOT EXISTS idx_request_status ON request(status);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_request_unique_pending
                ON request(requester_id, song_id) WHERE status = 'Pending';
            "#,
        )
        .execute(pool)
        .await?;

        // Lyrics check table, one row per song
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lyrics_check (
                song_id INTEGER PRIMARY KEY,
                excerpt TEXT,
                is_clean INTEGER NOT NULL,
                checked_at INTEGER NOT NULL,
                FOREIGN KEY (song_id) REFERENCES song(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Song like table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS song_like (
                song_id INTEGER NOT NULL,
                guest_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (song_id, guest_id),
                FOREIGN KEY (song_id) REFERENCES song(id)
            );
            CREATE INDEX IF NOT EXISTS idx_song_like_song_id ON song_like(song_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Lyric cache table, keyed by normalized (artist, title)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lyric_cache (
                artist TEXT NOT NULL,
                title TEXT NOT NULL,
                text TEXT,
                source TEXT,
                fetched_at INTEGER NOT NULL,
                PRIMARY KEY (artist, title)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
