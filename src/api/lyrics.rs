//! Lyrics check routes

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::core::Pipeline;
use crate::db::LyricsCheckTable;
use crate::error::{DomainError, Result};
use crate::models::LyricsCheck;

#[derive(Debug, Deserialize)]
pub struct ManualLyricsBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub song_id: i64,
    pub is_clean: bool,
    pub has_lyrics: bool,
    pub excerpt: Option<String>,
    pub checked_at: i64,
}

impl From<LyricsCheck> for CheckResponse {
    fn from(check: LyricsCheck) -> Self {
        Self {
            song_id: check.song_id,
            is_clean: check.is_clean,
            has_lyrics: check.excerpt.is_some(),
            excerpt: check.excerpt,
            checked_at: check.checked_at,
        }
    }
}

/// Get the stored check for a song, 404 if none exists yet
#[get("/{song_id}")]
pub async fn get_check(
    pipeline: web::Data<Pipeline>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let song_id = path.into_inner();
    let check = LyricsCheckTable::get(pipeline.pool(), song_id)
        .await?
        .ok_or(DomainError::SongNotFound(song_id))?;
    Ok(HttpResponse::Ok().json(CheckResponse::from(check)))
}

/// Re-fetch lyrics from the providers, bypassing the cache, and
/// re-classify. Runs inline; the moderator waits for the result.
#[post("/{song_id}/refresh")]
pub async fn refresh(pipeline: web::Data<Pipeline>, path: web::Path<i64>) -> Result<HttpResponse> {
    let check = pipeline.refresh_lyrics(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CheckResponse::from(check)))
}

/// Store moderator-supplied lyric text and classify it
#[post("/{song_id}/manual")]
pub async fn manual(
    pipeline: web::Data<Pipeline>,
    path: web::Path<i64>,
    body: web::Json<ManualLyricsBody>,
) -> Result<HttpResponse> {
    let check = pipeline.manual_lyrics(path.into_inner(), &body.text).await?;
    Ok(HttpResponse::Ok().json(CheckResponse::from(check)))
}

/// Configure lyrics routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_check).service(refresh).service(manual);
}
