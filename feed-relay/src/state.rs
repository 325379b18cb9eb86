use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_DYNAMIC_SOURCES_FILE: &str = "dynamic_sources.json";

/// Sources added at runtime, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSources {
    #[serde(default)]
    pub youtube_channels: Vec<String>,
    #[serde(default)]
    pub rss_feeds: Vec<String>,
}

/// JSON file holding the dynamic sources. Read once at startup, rewritten
/// wholesale on every successful add.
#[derive(Debug, Clone)]
pub struct DynamicSourcesStore {
    path: PathBuf,
}

impl DynamicSourcesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file is not an error: it just means nothing
    /// was added yet.
    pub async fn load(&self) -> DynamicSources {
        match self.try_load().await {
            Ok(Some(sources)) => {
                debug!(
                    "Loaded {} channels and {} feeds from {}",
                    sources.youtube_channels.len(),
                    sources.rss_feeds.len(),
                    self.path.display()
                );
                sources
            }
            Ok(None) => DynamicSources::default(),
            Err(e) => {
                warn!("Could not load dynamic sources from {}: {}", self.path.display(), e);
                DynamicSources::default()
            }
        }
    }

    async fn try_load(&self) -> Result<Option<DynamicSources>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub async fn save(&self, sources: &DynamicSources) -> Result<()> {
        let content = serde_json::to_string_pretty(sources)?;
        tokio::fs::write(&self.path, content).await?;
        debug!("Saved dynamic sources to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_yields_empty_sources() {
        let dir = TempDir::new().unwrap();
        let store = DynamicSourcesStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().await, DynamicSources::default());
    }

    #[tokio::test]
    async fn corrupt_file_yields_empty_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dynamic_sources.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = DynamicSourcesStore::new(&path);
        assert_eq!(store.load().await, DynamicSources::default());
    }

    #[tokio::test]
    async fn save_then_load_uses_named_arrays() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dynamic_sources.json");
        let store = DynamicSourcesStore::new(&path);

        let sources = DynamicSources {
            youtube_channels: vec!["UC1yNl2E66ZzKApQdRuTQ4tw".to_string()],
            rss_feeds: vec!["https://example.com/feed.xml".to_string()],
        };
        store.save(&sources).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["youtube_channels"][0], "UC1yNl2E66ZzKApQdRuTQ4tw");
        assert_eq!(raw["rss_feeds"][0], "https://example.com/feed.xml");

        assert_eq!(store.load().await, sources);
    }

    #[tokio::test]
    async fn partial_document_fills_missing_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dynamic_sources.json");
        std::fs::write(&path, r#"{"rss_feeds": ["https://a.example/rss"]}"#).unwrap();

        let loaded = DynamicSourcesStore::new(&path).load().await;
        assert!(loaded.youtube_channels.is_empty());
        assert_eq!(loaded.rss_feeds, vec!["https://a.example/rss".to_string()]);
    }
}
