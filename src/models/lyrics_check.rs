//! Lyrics check model

use serde::{Deserialize, Serialize};

/// Result of classifying a song's lyrics, one row per song
///
/// The excerpt is bounded; full lyric text is never persisted here.
/// A row with `excerpt = None` records a completed check that found
/// no lyrics (which classifies as clean).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsCheck {
    /// Song this check belongs to
    pub song_id: i64,
    /// Truncated lyric excerpt, if any lyrics were found
    pub excerpt: Option<String>,
    /// Whether the classifier found the lyrics clean
    pub is_clean: bool,
    /// Unix timestamp of the last classification
    pub checked_at: i64,
}
