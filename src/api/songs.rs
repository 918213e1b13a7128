//! Song listing and like routes

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::{JukeEvent, Pipeline};
use crate::db::{LikeTable, SongTable};
use crate::error::{DomainError, Result};

#[derive(Debug, Deserialize)]
pub struct LikeBody {
    pub guest_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ApprovedSongResponse {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub like_count: i64,
    pub request_count: i64,
}

#[derive(Debug, Serialize)]
pub struct PopularSongResponse {
    pub title: String,
    pub artist: String,
    pub request_count: i64,
}

/// Songs with at least one approved request, most liked first
#[get("/approved")]
pub async fn approved_songs(pipeline: web::Data<Pipeline>) -> Result<HttpResponse> {
    let rows = SongTable::approved_with_stats(pipeline.pool()).await?;
    let items: Vec<ApprovedSongResponse> = rows
        .into_iter()
        .map(|r| ApprovedSongResponse {
            song_id: r.song_id,
            title: r.title,
            artist: r.artist,
            like_count: r.like_count,
            request_count: r.request_count,
        })
        .collect();
    Ok(HttpResponse::Ok().json(items))
}

/// Most requested songs across all statuses
#[get("/popular")]
pub async fn popular_songs(
    pipeline: web::Data<Pipeline>,
    query: web::Query<PopularQuery>,
) -> Result<HttpResponse> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let rows = SongTable::most_requested(pipeline.pool(), limit).await?;
    let items: Vec<PopularSongResponse> = rows
        .into_iter()
        .map(|r| PopularSongResponse {
            title: r.title,
            artist: r.artist,
            request_count: r.request_count,
        })
        .collect();
    Ok(HttpResponse::Ok().json(items))
}

/// Toggle a guest's like on a song
#[post("/{song_id}/like")]
pub async fn toggle_like(
    pipeline: web::Data<Pipeline>,
    path: web::Path<i64>,
    body: web::Json<LikeBody>,
) -> Result<HttpResponse> {
    let song_id = path.into_inner();
    let pool = pipeline.pool();

    SongTable::get(pool, song_id)
        .await?
        .ok_or(DomainError::SongNotFound(song_id))?;

    let liked = LikeTable::toggle(pool, song_id, &body.guest_id).await?;
    let count = LikeTable::count_for_song(pool, song_id).await?;

    pipeline.bus().emit(JukeEvent::LikeToggled {
        song_id,
        guest_id: body.guest_id.clone(),
        liked,
    });

    Ok(HttpResponse::Ok().json(json!({
        "song_id": song_id,
        "liked": liked,
        "like_count": count,
    })))
}

/// Configure song routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(approved_songs)
        .service(popular_songs)
        .service(toggle_like);
}
