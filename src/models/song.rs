//! Song model

use serde::{Deserialize, Serialize};

/// A track known to the server, mirrored from the music catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    /// Database ID
    pub id: i64,
    /// Catalog track identifier (opaque, unique)
    pub catalog_id: String,
    /// Track title
    pub title: String,
    /// Primary artist name
    pub artist: String,
    /// Album name, if the catalog reported one
    pub album: Option<String>,
    /// Explicit-content flag as reported by the catalog
    pub explicit: bool,
    /// Track duration in milliseconds
    pub duration_ms: i64,
    /// Unix timestamp when the song was first seen
    pub added_at: i64,
}
