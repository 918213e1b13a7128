//! Request submission and moderation routes

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::Pipeline;
use crate::db::{PendingRequestRow, RequestTable};
use crate::error::{DomainError, Result};
use crate::models::{ModerationAction, SongRequest};

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub catalog_id: String,
    pub requester_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ModerateBody {
    pub action: ModerationAction,
}

/// Request as returned by the API
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub id: String,
    pub song_id: i64,
    pub requester_id: String,
    pub status: String,
    pub moderated: bool,
    pub requested_at: i64,
}

impl From<SongRequest> for RequestResponse {
    fn from(r: SongRequest) -> Self {
        Self {
            id: r.id,
            song_id: r.song_id,
            requester_id: r.requester_id,
            status: r.status.to_string(),
            moderated: r.moderated,
            requested_at: r.requested_at,
        }
    }
}

/// Pending queue entry for the moderator view
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub request_id: String,
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub explicit: bool,
    pub duration_ms: i64,
    pub requester_id: String,
    pub requested_at: i64,
    /// None until lyric retrieval has completed for the song
    pub lyrics_clean: Option<bool>,
    pub lyrics_found: Option<bool>,
}

impl From<PendingRequestRow> for PendingResponse {
    fn from(row: PendingRequestRow) -> Self {
        let checked = row.lyrics_checked != 0;
        Self {
            request_id: row.request_id,
            song_id: row.song_id,
            title: row.title,
            artist: row.artist,
            album: row.album,
            explicit: row.explicit != 0,
            duration_ms: row.duration_ms,
            requester_id: row.requester_id,
            requested_at: row.requested_at,
            lyrics_clean: checked.then(|| row.lyrics_clean.unwrap_or(0) != 0),
            lyrics_found: checked.then(|| row.has_lyrics.unwrap_or(0) != 0),
        }
    }
}

/// Submit a song request
#[post("")]
pub async fn submit_request(
    pipeline: web::Data<Pipeline>,
    body: web::Json<SubmitBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let request = pipeline.submit(&body.catalog_id, &body.requester_id).await?;
    Ok(HttpResponse::Created().json(RequestResponse::from(request)))
}

/// Get a single request
#[get("/{id}")]
pub async fn get_request(
    pipeline: web::Data<Pipeline>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let request = RequestTable::get(pipeline.pool(), &id)
        .await?
        .ok_or(DomainError::RequestNotFound(id))?;
    Ok(HttpResponse::Ok().json(RequestResponse::from(request)))
}

/// Pending queue for moderators, oldest first
#[get("/pending")]
pub async fn pending_requests(pipeline: web::Data<Pipeline>) -> Result<HttpResponse> {
    let rows = RequestTable::pending_with_songs(pipeline.pool()).await?;
    let items: Vec<PendingResponse> = rows.into_iter().map(PendingResponse::from).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// Apply a moderator action (approve, reject, override)
#[post("/{id}/moderate")]
pub async fn moderate_request(
    pipeline: web::Data<Pipeline>,
    path: web::Path<String>,
    body: web::Json<ModerateBody>,
) -> Result<HttpResponse> {
    let request = pipeline.moderate(&path.into_inner(), body.action).await?;
    Ok(HttpResponse::Ok().json(RequestResponse::from(request)))
}

/// Aggregate request counts
#[get("/stats")]
pub async fn request_stats(pipeline: web::Data<Pipeline>) -> Result<HttpResponse> {
    let pool = pipeline.pool();
    let total = RequestTable::count(pool).await?;
    let pending = RequestTable::count_pending(pool).await?;
    let requesters = RequestTable::count_requesters(pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "total_requests": total,
        "pending_requests": pending,
        "unique_requesters": requesters,
    })))
}

/// Configure request routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pending_requests)
        .service(request_stats)
        .service(submit_request)
        .service(moderate_request)
        .service(get_request);
}
