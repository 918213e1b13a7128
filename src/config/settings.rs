//! User-editable settings for jukegate
//!
//! Settings live in settings.json under the config directory. Every
//! field has a default so a missing or partial file still loads.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Paths;

/// One entry in the lyric provider chain, tried in listed order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    /// Provider key: "lyrics_ovh", "lrclib" or "scrape"
    pub name: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

/// User configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Server ID, generated on first start
    #[serde(default)]
    pub server_id: String,

    /// Lyric providers in priority order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderEntry>,

    /// Minimum trimmed length for fetched text to count as lyrics
    #[serde(default = "default_min_lyrics_len")]
    pub min_lyrics_len: usize,

    /// Days before a cached lyric record is treated as absent
    #[serde(default = "default_freshness_days")]
    pub freshness_days: i64,

    /// Maximum stored excerpt length for fetched lyrics
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,

    /// Maximum stored excerpt length for manually entered lyrics
    #[serde(default = "default_manual_excerpt_max_chars")]
    pub manual_excerpt_max_chars: usize,

    /// Deployment-specific denylist additions
    #[serde(default)]
    pub denylist_extra: Vec<String>,

    /// Number of background lyric resolution workers
    #[serde(default = "default_resolve_workers")]
    pub resolve_workers: usize,

    /// Capacity of the resolution job queue
    #[serde(default = "default_resolve_queue_size")]
    pub resolve_queue_size: usize,

    /// Event bus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Base URL of the music catalog API
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,

    /// Bearer token for the catalog API. Can also be supplied via the
    /// JUKEGATE_CATALOG_TOKEN environment variable, which wins.
    #[serde(default)]
    pub catalog_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_id: String::new(),
            providers: default_providers(),
            min_lyrics_len: default_min_lyrics_len(),
            freshness_days: default_freshness_days(),
            excerpt_max_chars: default_excerpt_max_chars(),
            manual_excerpt_max_chars: default_manual_excerpt_max_chars(),
            denylist_extra: Vec::new(),
            resolve_workers: default_resolve_workers(),
            resolve_queue_size: default_resolve_queue_size(),
            event_capacity: default_event_capacity(),
            catalog_base_url: default_catalog_base_url(),
            catalog_token: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from file, writing defaults on first run
    pub fn load(paths: &Paths) -> Result<Self> {
        let settings_path = paths.settings_path();

        if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .context("Failed to read settings file")?;
            let settings: Settings =
                serde_json::from_str(&content).context("Failed to parse settings file")?;
            Ok(settings)
        } else {
            let settings = Self::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Save settings to file
    pub fn save(&self, paths: &Paths) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(paths.settings_path(), content)
            .context("Failed to write settings file")?;
        Ok(())
    }

    /// Catalog token with the environment variable taking precedence
    pub fn resolved_catalog_token(&self) -> String {
        std::env::var("JUKEGATE_CATALOG_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.catalog_token.clone())
    }

    /// Freshness window in seconds
    pub fn freshness_secs(&self) -> i64 {
        self.freshness_days * 24 * 60 * 60
    }
}

// Default value functions for serde

fn default_providers() -> Vec<ProviderEntry> {
    ["lyrics_ovh", "lrclib", "scrape"]
        .into_iter()
        .map(|name| ProviderEntry {
            name: name.to_string(),
            timeout_secs: default_provider_timeout(),
        })
        .collect()
}

fn default_provider_timeout() -> u64 {
    8
}

fn default_min_lyrics_len() -> usize {
    100
}

fn default_freshness_days() -> i64 {
    30
}

fn default_excerpt_max_chars() -> usize {
    1000
}

fn default_manual_excerpt_max_chars() -> usize {
    2000
}

fn default_resolve_workers() -> usize {
    2
}

fn default_resolve_queue_size() -> usize {
    64
}

fn default_event_capacity() -> usize {
    256
}

fn default_catalog_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.min_lyrics_len, 100);
        assert_eq!(settings.freshness_days, 30);
        assert_eq!(settings.providers.len(), 3);
        assert_eq!(settings.providers[0].name, "lyrics_ovh");
        assert_eq!(settings.providers[0].timeout_secs, 8);
    }

    #[test]
    fn test_serialization_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings.min_lyrics_len, deserialized.min_lyrics_len);
        assert_eq!(settings.providers.len(), deserialized.providers.len());
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"freshnessDays": 7}"#).unwrap();
        assert_eq!(settings.freshness_days, 7);
        assert_eq!(settings.min_lyrics_len, 100);
        assert!(!settings.providers.is_empty());
    }

    #[test]
    fn test_load_writes_defaults_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::at(dir.path()).unwrap();

        let settings = Settings::load(&paths).unwrap();
        assert!(paths.settings_path().exists());
        assert_eq!(settings.min_lyrics_len, 100);

        // second load reads the file back
        let again = Settings::load(&paths).unwrap();
        assert_eq!(again.freshness_days, settings.freshness_days);
    }
}
