//! Domain error taxonomy
//!
//! Every operation the core accepts surfaces failures as one of these
//! variants with a machine-readable reason string. Transient provider
//! failures never appear here; they are absorbed by the provider chain.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::models::RequestStatus;

pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    /// The requester already has a Pending request for this song
    #[error("a pending request for this song already exists")]
    DuplicatePending,

    /// No song with this database ID exists
    #[error("song {0} not found")]
    SongNotFound(i64),

    /// No request with this ID exists
    #[error("request {0} not found")]
    RequestNotFound(String),

    /// The requested moderation action is not valid for the request's
    /// current status (e.g. override on a non-Rejected request)
    #[error("cannot {action} a request in status {status}")]
    InvalidTransition {
        status: RequestStatus,
        action: &'static str,
    },

    /// Submitted lyric text was empty
    #[error("no lyric text provided")]
    EmptyLyrics,

    /// Catalog lookup failed; no song or request was created
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// Database operation error (wraps sqlx::Error)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    /// Stable machine-readable code for API responses
    pub fn reason(&self) -> &'static str {
        match self {
            DomainError::DuplicatePending => "duplicate_pending",
            DomainError::SongNotFound(_) => "song_not_found",
            DomainError::RequestNotFound(_) => "request_not_found",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::EmptyLyrics => "empty_lyrics",
            DomainError::Catalog(CatalogError::NotFound(_)) => "catalog_track_not_found",
            DomainError::Catalog(CatalogError::Unauthorized) => "catalog_unauthorized",
            DomainError::Catalog(_) => "catalog_unavailable",
            DomainError::Database(_) => "internal_error",
        }
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::DuplicatePending | DomainError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            DomainError::SongNotFound(_)
            | DomainError::RequestNotFound(_)
            | DomainError::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            DomainError::EmptyLyrics => StatusCode::BAD_REQUEST,
            DomainError::Catalog(CatalogError::Unauthorized) => StatusCode::BAD_GATEWAY,
            DomainError::Catalog(_) => StatusCode::BAD_GATEWAY,
            DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, DomainError::Database(_)) {
            tracing::error!(error = %self, "internal error");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.reason(),
            "message": self.to_string(),
        }))
    }
}
