//! Music catalog lookup
//!
//! The catalog is a collaborator: jukegate only needs one operation,
//! a track lookup by id. Token exchange is out of scope; the bearer
//! token arrives as an opaque string from settings or the environment.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "jukegate/0.3";

/// A track as reported by the catalog
#[derive(Debug, Clone)]
pub struct CatalogTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub explicit: bool,
    pub duration_ms: i64,
}

/// Catalog lookup failures. All of them are fatal to the submission
/// that triggered the lookup; no song or request is created.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("track {0} not found in catalog")]
    NotFound(String),

    #[error("catalog rejected the access token")]
    Unauthorized,

    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned an unexpected response: {0}")]
    BadResponse(String),
}

/// Track lookup boundary
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_track(&self, id: &str) -> Result<CatalogTrack, CatalogError>;
}

/// Spotify-shaped track payload
#[derive(Debug, Deserialize)]
struct TrackResponse {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    album: Option<AlbumRef>,
    explicit: bool,
    duration_ms: i64,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: String,
}

/// Catalog client talking to a Spotify-shaped /tracks/{id} endpoint
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, token: &str) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn get_track(&self, id: &str) -> Result<CatalogTrack, CatalogError> {
        let url = format!("{}/tracks/{}", self.base_url, urlencoding::encode(id));

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(CatalogError::NotFound(id.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(CatalogError::Unauthorized)
            }
            status if !status.is_success() => {
                return Err(CatalogError::BadResponse(format!("status {}", status)))
            }
            _ => {}
        }

        let track: TrackResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::BadResponse(e.to_string()))?;

        Ok(CatalogTrack {
            id: track.id,
            title: track.name,
            artist: track
                .artists
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            album: track.album.map(|a| a.name),
            explicit: track.explicit,
            duration_ms: track.duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_response_parsing() {
        let body = r#"{
            "id": "abc123",
            "name": "Some Song",
            "artists": [{"name": "Some Artist"}, {"name": "Feature"}],
            "album": {"name": "Some Album"},
            "explicit": true,
            "duration_ms": 215000
        }"#;

        let track: TrackResponse = serde_json::from_str(body).unwrap();
        assert_eq!(track.id, "abc123");
        assert_eq!(track.artists[0].name, "Some Artist");
        assert!(track.explicit);
    }

    #[test]
    fn test_track_response_without_album_or_artists() {
        let body = r#"{
            "id": "x",
            "name": "Orphan",
            "explicit": false,
            "duration_ms": 1000
        }"#;

        let track: TrackResponse = serde_json::from_str(body).unwrap();
        assert!(track.artists.is_empty());
        assert!(track.album.is_none());
    }
}
