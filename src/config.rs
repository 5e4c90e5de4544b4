use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const KEY_ENV_VAR: &str = "WEBCOPY_API_KEY";
pub const DEFAULT_PROXY_BASE: &str = "https://api.allorigins.win";
pub const DEFAULT_API_BASE: &str = "https://api.firecrawl.dev";

/// How raw HTML is obtained for a scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    /// Third-party scraping API
    Api,
    /// Direct fetch through the CORS-relay proxy
    Proxy,
}

/// Per-session scrape configuration, owned by the caller. Nothing here is
/// process-global, so concurrent sessions with different keys do not collide.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub api_key: Option<String>,
    pub backend: BackendKind,
    /// Substitute the canned demo document when the backend fails.
    pub demo_fallback: bool,
    pub proxy_base: String,
    pub api_base: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            api_key: None,
            backend: BackendKind::Api,
            demo_fallback: true,
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Environment variable first, stored key second.
    pub fn from_env(store: &KeyStore) -> Self {
        let api_key = std::env::var(KEY_ENV_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| store.load());
        ScrapeConfig {
            api_key,
            ..Default::default()
        }
    }
}

/// Single stored credential, one key per file.
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KeyStore { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("WEBCOPY_KEY_FILE") {
            return PathBuf::from(path);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Path::new(&home).join(".webcopy_key")
    }

    pub fn save(&self, key: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(&self.path, key.trim())
            .with_context(|| format!("Failed to write key to {}", self.path.display()))
    }

    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other.with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// Shallow format check only; the backend is the real validator.
pub fn looks_valid(key: &str) -> bool {
    key.starts_with("fc-") && key.len() > 10
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path().join("key"));

        assert!(store.load().is_none());
        store.save("  fc-0123456789  ").unwrap();
        assert_eq!(store.load().as_deref(), Some("fc-0123456789"));
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path().join("absent"));
        store.clear().unwrap();
    }

    #[test]
    fn key_format_check() {
        assert!(looks_valid("fc-0123456789"));
        assert!(!looks_valid("fc-short"));
        assert!(!looks_valid("sk-0123456789"));
    }

    #[test]
    fn default_config() {
        let config = ScrapeConfig::default();
        assert_eq!(config.backend, BackendKind::Api);
        assert!(config.demo_fallback);
        assert!(config.api_key.is_none());
    }
}
