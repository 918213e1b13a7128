//! Lyric resolver
//!
//! Composes the cache and the provider chain into one cache-first
//! resolve operation. A fresh cache hit returns without any network
//! call; a miss walks the chain and writes the outcome back, including
//! the "not found" case so dead songs are not re-queried until the
//! record expires. "Lyrics not found" is a valid outcome here, never
//! an error.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::providers::ProviderChain;
use crate::models::LyricRecord;

/// Durable keyed store for lyric records
///
/// Injected so the resolver can be exercised with an in-memory fake.
/// Implementations normalize keys with [`normalize_term`].
#[async_trait]
pub trait LyricStore: Send + Sync {
    async fn get(&self, artist: &str, title: &str) -> Option<LyricRecord>;
    async fn put(&self, artist: &str, title: &str, text: Option<&str>, source: Option<&str>);
}

/// Normalize one key component: case-folded, trimmed, inner whitespace
/// runs collapsed to a single space
pub fn normalize_term(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Result of one resolve call
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    /// Lyric text, or None when no provider had lyrics
    pub text: Option<String>,
    /// Provider that supplied the text
    pub source: Option<String>,
    /// True when the outcome came from the cache
    pub from_cache: bool,
}

/// Cache-first lyric resolution
pub struct LyricResolver {
    store: Arc<dyn LyricStore>,
    chain: ProviderChain,
    freshness_secs: i64,
}

impl LyricResolver {
    pub fn new(store: Arc<dyn LyricStore>, chain: ProviderChain, freshness_secs: i64) -> Self {
        Self {
            store,
            chain,
            freshness_secs,
        }
    }

    /// Resolve lyrics for a track. `force` bypasses the cache read
    /// (used by the moderator-facing refresh); the outcome is still
    /// written back.
    pub async fn resolve(&self, artist: &str, title: &str, force: bool) -> ResolveOutcome {
        if !force {
            if let Some(record) = self.store.get(artist, title).await {
                let age = chrono::Utc::now().timestamp() - record.fetched_at;
                if age < self.freshness_secs {
                    debug!(artist, title, "lyric cache hit");
                    return ResolveOutcome {
                        text: record.text,
                        source: record.source,
                        from_cache: true,
                    };
                }
                debug!(artist, title, age, "lyric cache record expired");
            }
        }

        let fetched = self.chain.fetch(artist, title).await;
        let (text, source) = match fetched {
            Some((text, source)) => (Some(text), Some(source.to_string())),
            None => (None, None),
        };

        // write back even on "not found" so the chain is not re-walked
        // for this song until the record expires
        self.store
            .put(artist, title, text.as_deref(), source.as_deref())
            .await;

        ResolveOutcome {
            text,
            source,
            from_cache: false,
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory fakes shared by resolver and pipeline tests

    use super::*;
    use crate::core::providers::LyricProvider;
    use anyhow::Result;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory LyricStore with controllable timestamps
    #[derive(Default)]
    pub struct MemoryLyricStore {
        records: Mutex<HashMap<(String, String), LyricRecord>>,
    }

    impl MemoryLyricStore {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Age the stored record for a key by the given seconds
        pub fn age_record(&self, artist: &str, title: &str, secs: i64) {
            let key = (normalize_term(artist), normalize_term(title));
            if let Some(record) = self.records.lock().get_mut(&key) {
                record.fetched_at -= secs;
            }
        }
    }

    #[async_trait]
    impl LyricStore for MemoryLyricStore {
        async fn get(&self, artist: &str, title: &str) -> Option<LyricRecord> {
            let key = (normalize_term(artist), normalize_term(title));
            self.records.lock().get(&key).cloned()
        }

        async fn put(&self, artist: &str, title: &str, text: Option<&str>, source: Option<&str>) {
            let key = (normalize_term(artist), normalize_term(title));
            self.records.lock().insert(
                key,
                LyricRecord {
                    text: text.map(|s| s.to_string()),
                    source: source.map(|s| s.to_string()),
                    fetched_at: chrono::Utc::now().timestamp(),
                },
            );
        }
    }

    /// Provider that counts calls and returns a fixed result
    pub struct CountingProvider {
        text: Option<String>,
        calls: Arc<AtomicUsize>,
    }

    impl CountingProvider {
        pub fn new(text: Option<&str>) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(Self {
                    text: text.map(|s| s.to_string()),
                    calls: calls.clone(),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl LyricProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(
            &self,
            _: &reqwest::Client,
            _: &str,
            _: &str,
        ) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    const DAY: i64 = 24 * 60 * 60;

    fn long_text() -> String {
        "tra la la ".repeat(20)
    }

    fn resolver_with(
        store: Arc<dyn LyricStore>,
        provider_text: Option<&str>,
    ) -> (LyricResolver, Arc<std::sync::atomic::AtomicUsize>) {
        let (provider, calls) = CountingProvider::new(provider_text);
        let chain = ProviderChain::new(vec![provider], 100);
        (LyricResolver::new(store, chain, 30 * DAY), calls)
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  The  Band "), "the band");
        assert_eq!(normalize_term("Song\tName"), "song name");
        assert_eq!(normalize_term("plain"), "plain");
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let store = MemoryLyricStore::new();
        let text = long_text();
        let (resolver, calls) = resolver_with(store.clone(), Some(&text));

        let first = resolver.resolve("Artist", "Title", false).await;
        assert!(!first.from_cache);
        assert!(first.text.is_some());

        let second = resolver.resolve("Artist", "Title", false).await;
        assert!(second.from_cache);
        assert_eq!(second.text, first.text);

        // exactly one provider call across both resolves
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached_and_not_retried() {
        let store = MemoryLyricStore::new();
        let (resolver, calls) = resolver_with(store.clone(), None);

        let first = resolver.resolve("Artist", "Title", false).await;
        assert!(first.text.is_none());
        assert!(!first.from_cache);

        let second = resolver.resolve("Artist", "Title", false).await;
        assert!(second.text.is_none());
        assert!(second.from_cache);

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_record_is_refetched_once() {
        let store = MemoryLyricStore::new();
        let (resolver, calls) = resolver_with(store.clone(), None);

        resolver.resolve("Artist", "Title", false).await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        store.age_record("Artist", "Title", 31 * DAY);

        let again = resolver.resolve("Artist", "Title", false).await;
        assert!(!again.from_cache);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);

        // the refetch wrote a fresh record back
        let third = resolver.resolve("Artist", "Title", false).await;
        assert!(third.from_cache);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_force_bypasses_cache_read() {
        let store = MemoryLyricStore::new();
        let text = long_text();
        let (resolver, calls) = resolver_with(store.clone(), Some(&text));

        resolver.resolve("Artist", "Title", false).await;
        let forced = resolver.resolve("Artist", "Title", true).await;

        assert!(!forced.from_cache);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_respects_key_normalization() {
        let store = MemoryLyricStore::new();
        let text = long_text();
        let (resolver, calls) = resolver_with(store.clone(), Some(&text));

        resolver.resolve("The Band", "Song Name", false).await;
        let hit = resolver.resolve("  THE  BAND ", "song  name", false).await;

        assert!(hit.from_cache);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
