//! Lyric providers and the provider chain
//!
//! Each provider knows its request shape and how to extract plain
//! lyric text from the response. The chain walks them in priority
//! order and stops at the first result whose trimmed length clears
//! the acceptance threshold. Every failure mode (transport, parse,
//! short text) just advances the chain; exhausting it is a valid
//! "not found" outcome, never an error.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ProviderEntry, Settings};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// One external lyric source
#[async_trait]
pub trait LyricProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch lyric text for a track. `Ok(None)` means the provider has
    /// no lyrics for it; `Err` covers transport and parse failures.
    /// Both advance the chain.
    async fn fetch(&self, client: &Client, artist: &str, title: &str) -> Result<Option<String>>;
}

/// lyrics.ovh: GET /v1/{artist}/{title}, JSON `lyrics` field
pub struct LyricsOvh {
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LyricsOvhResponse {
    #[serde(default)]
    lyrics: String,
}

impl LyricsOvh {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn extract(body: &str) -> Result<Option<String>> {
        let parsed: LyricsOvhResponse = serde_json::from_str(body)?;
        if parsed.lyrics.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(parsed.lyrics))
        }
    }
}

#[async_trait]
impl LyricProvider for LyricsOvh {
    fn name(&self) -> &'static str {
        "lyrics_ovh"
    }

    async fn fetch(&self, client: &Client, artist: &str, title: &str) -> Result<Option<String>> {
        let url = format!(
            "https://api.lyrics.ovh/v1/{}/{}",
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("status {}", response.status()));
        }

        Self::extract(&response.text().await?)
    }
}

/// LRCLIB: GET /api/get with artist/track query, `plainLyrics` field
pub struct Lrclib {
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LrclibResponse {
    #[serde(default, rename = "plainLyrics")]
    plain_lyrics: Option<String>,
}

impl Lrclib {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn extract(body: &str) -> Result<Option<String>> {
        let parsed: LrclibResponse = serde_json::from_str(body)?;
        Ok(parsed
            .plain_lyrics
            .filter(|lyrics| !lyrics.trim().is_empty()))
    }
}

#[async_trait]
impl LyricProvider for Lrclib {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn fetch(&self, client: &Client, artist: &str, title: &str) -> Result<Option<String>> {
        let url = format!(
            "https://lrclib.net/api/get?artist_name={}&track_name={}",
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("status {}", response.status()));
        }

        Self::extract(&response.text().await?)
    }
}

static AZ_LYRICS_BLOCK: Lazy<Regex> = Lazy::new(|| {
    // the lyrics div follows a fixed usage-warning comment on every page
    Regex::new(r"(?s)<!--\s*Usage of azlyrics\.com content[^>]*-->(.*?)</div>")
        .expect("valid regex")
});

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Last-resort structural scrape of azlyrics.com pages
pub struct AzScrape {
    timeout: Duration,
}

impl AzScrape {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// azlyrics URLs use lowercased alphanumerics only
    fn slug(s: &str) -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    }

    fn extract(html: &str) -> Option<String> {
        let block = AZ_LYRICS_BLOCK.captures(html)?.get(1)?.as_str();

        let text = HTML_TAG.replace_all(block, "");
        let text = text
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&#x27;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">");

        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[async_trait]
impl LyricProvider for AzScrape {
    fn name(&self) -> &'static str {
        "scrape"
    }

    async fn fetch(&self, client: &Client, artist: &str, title: &str) -> Result<Option<String>> {
        let url = format!(
            "https://www.azlyrics.com/lyrics/{}/{}.html",
            Self::slug(artist),
            Self::slug(title)
        );

        let response = client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("status {}", response.status()));
        }

        Ok(Self::extract(&response.text().await?))
    }
}

/// Ordered list of providers plus the acceptance rule
pub struct ProviderChain {
    client: Client,
    providers: Vec<Box<dyn LyricProvider>>,
    min_len: usize,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn LyricProvider>>, min_len: usize) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            providers,
            min_len,
        }
    }

    /// Build the chain from configured provider entries, preserving
    /// their order. Unknown names are skipped with a warning.
    pub fn from_settings(settings: &Settings) -> Self {
        let providers = settings
            .providers
            .iter()
            .filter_map(|entry| build_provider(entry))
            .collect();

        Self::new(providers, settings.min_lyrics_len)
    }

    /// Walk the chain until one provider yields acceptable text.
    /// Returns the text and the provider name, or None on exhaustion.
    pub async fn fetch(&self, artist: &str, title: &str) -> Option<(String, &'static str)> {
        for provider in &self.providers {
            match provider.fetch(&self.client, artist, title).await {
                Ok(Some(text)) if text.trim().len() > self.min_len => {
                    debug!(provider = provider.name(), artist, title, "lyrics found");
                    return Some((text, provider.name()));
                }
                Ok(Some(text)) => {
                    debug!(
                        provider = provider.name(),
                        len = text.trim().len(),
                        "result below acceptance threshold, trying next"
                    );
                }
                Ok(None) => {
                    debug!(provider = provider.name(), artist, title, "no lyrics");
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "provider failed, trying next");
                }
            }
        }

        None
    }
}

fn build_provider(entry: &ProviderEntry) -> Option<Box<dyn LyricProvider>> {
    let timeout = Duration::from_secs(entry.timeout_secs);

    match entry.name.as_str() {
        "lyrics_ovh" => Some(Box::new(LyricsOvh::new(timeout))),
        "lrclib" => Some(Box::new(Lrclib::new(timeout))),
        "scrape" => Some(Box::new(AzScrape::new(timeout))),
        other => {
            warn!("unknown lyric provider '{}' in settings, skipping", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lyrics_ovh_extract() {
        let body = r#"{"lyrics": "Hello darkness my old friend"}"#;
        let text = LyricsOvh::extract(body).unwrap().unwrap();
        assert_eq!(text, "Hello darkness my old friend");
    }

    #[test]
    fn test_lyrics_ovh_extract_empty_is_none() {
        assert!(LyricsOvh::extract(r#"{"lyrics": "  "}"#).unwrap().is_none());
        assert!(LyricsOvh::extract(r#"{}"#).unwrap().is_none());
    }

    #[test]
    fn test_lyrics_ovh_extract_garbage_is_err() {
        assert!(LyricsOvh::extract("<html>not json</html>").is_err());
    }

    #[test]
    fn test_lrclib_extract() {
        let body = r#"{"plainLyrics": "line one\nline two", "syncedLyrics": "[00:01.00] line one"}"#;
        let text = Lrclib::extract(body).unwrap().unwrap();
        assert_eq!(text, "line one\nline two");
    }

    #[test]
    fn test_lrclib_extract_null_lyrics() {
        assert!(Lrclib::extract(r#"{"plainLyrics": null}"#).unwrap().is_none());
    }

    #[test]
    fn test_az_slug() {
        assert_eq!(AzScrape::slug("Guns N' Roses"), "gunsnroses");
        assert_eq!(AzScrape::slug("Sweet Child O' Mine"), "sweetchildomine");
    }

    #[test]
    fn test_az_extract() {
        let html = r#"
            <div class="lyricsh"></div>
            <div>
            <!-- Usage of azlyrics.com content by any third-party lyrics provider is prohibited -->
            First line<br>
            Second &quot;quoted&quot; line<br>
            </div>
            <div>footer</div>
        "#;

        let text = AzScrape::extract(html).unwrap();
        assert!(text.contains("First line"));
        assert!(text.contains("Second \"quoted\" line"));
        assert!(!text.contains("footer"));
    }

    #[test]
    fn test_az_extract_missing_marker() {
        assert!(AzScrape::extract("<html><body>nothing here</body></html>").is_none());
    }

    /// Scripted provider for chain tests
    struct Scripted {
        name: &'static str,
        result: Result<Option<String>, String>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(name: &'static str, text: &str) -> Self {
            Self {
                name,
                result: Ok(Some(text.to_string())),
                calls: AtomicUsize::new(0),
            }
        }

        fn none(name: &'static str) -> Self {
            Self {
                name,
                result: Ok(None),
                calls: AtomicUsize::new(0),
            }
        }

        fn err(name: &'static str) -> Self {
            Self {
                name,
                result: Err("boom".to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LyricProvider for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _: &Client, _: &str, _: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(anyhow!(e.clone())),
            }
        }
    }

    fn long_text() -> String {
        "tra la la ".repeat(20)
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_acceptable() {
        let chain = ProviderChain::new(
            vec![
                Box::new(Scripted::ok("first", &long_text())),
                Box::new(Scripted::ok("second", &long_text())),
            ],
            100,
        );

        let (_, source) = chain.fetch("a", "t").await.unwrap();
        assert_eq!(source, "first");
    }

    #[tokio::test]
    async fn test_chain_skips_failures_and_short_results() {
        let chain = ProviderChain::new(
            vec![
                Box::new(Scripted::err("broken")),
                Box::new(Scripted::ok("short", "too short")),
                Box::new(Scripted::none("empty")),
                Box::new(Scripted::ok("good", &long_text())),
            ],
            100,
        );

        let (text, source) = chain.fetch("a", "t").await.unwrap();
        assert_eq!(source, "good");
        assert!(text.trim().len() > 100);
    }

    #[tokio::test]
    async fn test_chain_exhaustion_is_none() {
        let chain = ProviderChain::new(
            vec![
                Box::new(Scripted::err("broken")),
                Box::new(Scripted::none("empty")),
            ],
            100,
        );

        assert!(chain.fetch("a", "t").await.is_none());
    }

    #[tokio::test]
    async fn test_from_settings_skips_unknown_names() {
        let mut settings = Settings::default();
        settings.providers.push(ProviderEntry {
            name: "mystery".to_string(),
            timeout_secs: 8,
        });

        let chain = ProviderChain::from_settings(&settings);
        assert_eq!(chain.providers.len(), 3);
    }
}
