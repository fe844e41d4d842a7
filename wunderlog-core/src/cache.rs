//! Time-limited storage of raw API responses.
//!
//! Runs inside the expiry window reuse the stored body instead of hitting the
//! network.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Result, WunderlogError};

/// Default lifetime of a cached response: just under an hour.
pub const DEFAULT_TTL_MINUTES: i64 = 55;

pub fn default_ttl() -> TimeDelta {
    TimeDelta::minutes(DEFAULT_TTL_MINUTES)
}

pub const CACHE_FILE_NAME: &str = "cache.json";

#[async_trait]
pub trait ResponseCache: Send + Sync + Debug {
    /// Body stored for `key`, if it hasn't expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    body: String,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.fetched_at < ttl
    }
}

/// All entries live in one JSON file, read and rewritten on each access.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
    ttl: TimeDelta,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>, ttl: TimeDelta) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// Cache file inside `directory`.
    pub fn in_dir(directory: &Path, ttl: TimeDelta) -> Self {
        Self::new(directory.join(CACHE_FILE_NAME), ttl)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, CacheEntry>> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| WunderlogError::json(&self.path, e))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(WunderlogError::io(&self.path, e)),
        }
    }
}

#[async_trait]
impl ResponseCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let entries = self.load().await?;

        Ok(entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.body.clone()))
    }

    async fn put(&self, key: &str, body: &str) -> Result<()> {
        let now = Utc::now();
        let mut entries = self.load().await?;
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        entries.insert(
            key.to_owned(),
            CacheEntry {
                fetched_at: now,
                body: body.to_owned(),
            },
        );

        let bytes = serde_json::to_vec(&entries).map_err(|e| WunderlogError::json(&self.path, e))?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| WunderlogError::io(&self.path, e))
    }
}

/// Never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _body: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_an_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::in_dir(dir.path(), default_ttl());

        assert_eq!(cache.get("anything").await.unwrap(), None);
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn fresh_entry_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::in_dir(dir.path(), default_ttl());

        cache.put("url-a", "{\"a\":1}").await.unwrap();

        assert_eq!(cache.get("url-a").await.unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(cache.get("url-b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn entries_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        FileCache::in_dir(dir.path(), default_ttl())
            .put("url", "body")
            .await
            .unwrap();

        let reopened = FileCache::in_dir(dir.path(), default_ttl());
        assert_eq!(reopened.get("url").await.unwrap().as_deref(), Some("body"));
    }

    #[tokio::test]
    async fn expired_entries_are_ignored_and_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);

        let mut stale = BTreeMap::new();
        stale.insert(
            "old".to_string(),
            CacheEntry {
                fetched_at: Utc::now() - TimeDelta::hours(2),
                body: "stale".into(),
            },
        );
        std::fs::write(&path, serde_json::to_vec(&stale).unwrap()).unwrap();

        let cache = FileCache::new(&path, default_ttl());
        assert_eq!(cache.get("old").await.unwrap(), None);

        cache.put("new", "fresh").await.unwrap();
        let on_disk: BTreeMap<String, CacheEntry> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(on_disk.contains_key("new"));
        assert!(!on_disk.contains_key("old"));
    }

    #[tokio::test]
    async fn no_cache_never_hits() {
        NoCache.put("k", "v").await.unwrap();
        assert_eq!(NoCache.get("k").await.unwrap(), None);
    }
}
