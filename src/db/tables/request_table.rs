//! Request table operations
//!
//! Status mutations go through guarded single-statement UPDATEs whose
//! affected-row count tells the caller whether the transition actually
//! happened. That keeps check-before-write atomic under concurrency:
//! a late automatic rejection can never overwrite a human decision.

use sqlx::{FromRow, SqlitePool};

use crate::models::{RequestStatus, SongRequest};

/// Database row for the request table
#[derive(Debug, FromRow)]
struct RequestRow {
    id: String,
    song_id: i64,
    requester_id: String,
    status: String,
    moderated: i64,
    requested_at: i64,
}

impl RequestRow {
    fn into_request(self) -> Option<SongRequest> {
        let status = RequestStatus::from_str(&self.status)?;
        Some(SongRequest {
            id: self.id,
            song_id: self.song_id,
            requester_id: self.requester_id,
            status,
            moderated: self.moderated != 0,
            requested_at: self.requested_at,
        })
    }
}

/// A pending request joined with its song and check state
#[derive(Debug, FromRow)]
pub struct PendingRequestRow {
    pub request_id: String,
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub explicit: i64,
    pub duration_ms: i64,
    pub requester_id: String,
    pub requested_at: i64,
    pub lyrics_checked: i64,
    pub lyrics_clean: Option<i64>,
    pub has_lyrics: Option<i64>,
}

/// Request table operations
pub struct RequestTable;

impl RequestTable {
    /// Get a request by ID
    pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<SongRequest>, sqlx::Error> {
        let row: Option<RequestRow> = sqlx::query_as("SELECT * FROM request WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.and_then(RequestRow::into_request))
    }

    /// Insert a new request
    pub async fn insert(pool: &SqlitePool, request: &SongRequest) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO request (id, song_id, requester_id, status, moderated, requested_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(request.song_id)
        .bind(&request.requester_id)
        .bind(request.status.as_str())
        .bind(request.moderated as i64)
        .bind(request.requested_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Whether the requester already has a Pending request for the song
    pub async fn has_pending(
        pool: &SqlitePool,
        requester_id: &str,
        song_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM request WHERE requester_id = ? AND song_id = ? AND status = 'Pending'",
        )
        .bind(requester_id)
        .bind(song_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    /// Transition a request by a human moderator, guarded on the
    /// expected current status. Returns true when the row changed.
    pub async fn moderate_from(
        pool: &SqlitePool,
        id: &str,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE request SET status = ?, moderated = 1 WHERE id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Automatically reject a request, but only while it is still
    /// Pending and untouched by a moderator. Returns true when the
    /// rejection was applied.
    pub async fn auto_reject(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE request SET status = 'Rejected' WHERE id = ? AND status = 'Pending' AND moderated = 0",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// IDs of Pending, unmoderated requests for a song. Candidates for
    /// automatic rejection after an unclean classification.
    pub async fn pending_unmoderated_for_song(
        pool: &SqlitePool,
        song_id: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM request WHERE song_id = ? AND status = 'Pending' AND moderated = 0",
        )
        .bind(song_id)
        .fetch_all(pool)
        .await
    }

    /// All pending requests joined with song and lyrics-check state,
    /// oldest first (the moderator queue view)
    pub async fn pending_with_songs(
        pool: &SqlitePool,
    ) -> Result<Vec<PendingRequestRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT r.id AS request_id, s.id AS song_id, s.title, s.artist, s.album,
                   s.explicit, s.duration_ms, r.requester_id, r.requested_at,
                   c.song_id IS NOT NULL AS lyrics_checked,
                   c.is_clean AS lyrics_clean,
                   c.excerpt IS NOT NULL AS has_lyrics
            FROM request r
            JOIN song s ON s.id = r.song_id
            LEFT JOIN lyrics_check c ON c.song_id = s.id
            WHERE r.status = 'Pending'
            ORDER BY r.requested_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Total request count
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM request")
            .fetch_one(pool)
            .await
    }

    /// Pending request count
    pub async fn count_pending(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM request WHERE status = 'Pending'")
            .fetch_one(pool)
            .await
    }

    /// Number of distinct requesters seen
    pub async fn count_requesters(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(DISTINCT requester_id) FROM request")
            .fetch_one(pool)
            .await
    }
}
