//! Cached lyric record model

use serde::{Deserialize, Serialize};

/// A cached lyric lookup result keyed by normalized (artist, title)
///
/// `text = None` is a valid "known absent" record: the providers were
/// consulted and found nothing. It expires like any other record so
/// dead songs are eventually retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricRecord {
    /// Lyric text, or None when no provider had lyrics
    pub text: Option<String>,
    /// Name of the provider that supplied the text
    pub source: Option<String>,
    /// Unix timestamp of the fetch
    pub fetched_at: i64,
}
