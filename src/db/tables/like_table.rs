//! Song like table operations

use sqlx::SqlitePool;

/// Song like table operations
pub struct LikeTable;

impl LikeTable {
    /// Toggle a guest's like on a song. Returns true when the like now
    /// exists, false when it was removed.
    pub async fn toggle(
        pool: &SqlitePool,
        song_id: i64,
        guest_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let removed = sqlx::query("DELETE FROM song_like WHERE song_id = ? AND guest_id = ?")
            .bind(song_id)
            .bind(guest_id)
            .execute(pool)
            .await?
            .rows_affected();

        if removed > 0 {
            return Ok(false);
        }

        let created_at = chrono::Utc::now().timestamp();

        // OR IGNORE: a concurrent toggle for the same pair is a no-op
        sqlx::query(
            "INSERT OR IGNORE INTO song_like (song_id, guest_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(song_id)
        .bind(guest_id)
        .bind(created_at)
        .execute(pool)
        .await?;

        Ok(true)
    }

    /// Whether the guest currently likes the song
    pub async fn exists(
        pool: &SqlitePool,
        song_id: i64,
        guest_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM song_like WHERE song_id = ? AND guest_id = ?",
        )
        .bind(song_id)
        .bind(guest_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    /// Number of likes for a song
    pub async fn count_for_song(pool: &SqlitePool, song_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM song_like WHERE song_id = ?")
            .bind(song_id)
            .fetch_one(pool)
            .await
    }
}
