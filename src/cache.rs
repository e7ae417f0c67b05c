//! Time-to-live cache on top of an embedded key-value store.
//!
//! The cache is an owned component handed to its consumers by
//! constructor, so tests can substitute their own instance and TTL.

use anyhow::{Result, anyhow};
use fjall::Keyspace;

use crate::error::WayfarerError;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// TTL cache with last-write-wins semantics. Cached data is not
/// safety-critical; concurrent writers racing on a key are acceptable.
#[derive(Clone)]
pub struct TtlCache {
    store: Keyspace,
}

impl Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl TtlCache {
    /// Open (or create) the cache database at the given path.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let db = fjall::Database::builder(&path).open().map_err(|e| {
            WayfarerError::cache(format!(
                "failed to open cache database at {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let items = db
            .keyspace("cache", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| WayfarerError::cache(format!("failed to open cache keyspace: {e}")))?;
        Ok(TtlCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        // Calculate expiry time
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        let _ = task::spawn_blocking(move || store.insert(key, bytes)).await?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        if let Some(bytes) = maybe_bytes {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

            if now < entry.expires_at {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            } else {
                tracing::debug!("Key found but expired");
                self.remove(key).await?;
                Ok(None)
            }
        } else {
            tracing::debug!("Key not found");
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        let _ = task::spawn_blocking(move || store.remove(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(test_name: &str) -> TtlCache {
        let path = std::env::temp_dir().join(format!(
            "wayfarer-cache-{test_name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        TtlCache::open(&path).expect("cache open")
    }

    #[tokio::test]
    async fn test_put_then_get_fresh_entry() {
        let cache = temp_cache("fresh");
        cache
            .put("k", vec![1u32, 2, 3], Duration::from_secs(3600))
            .await
            .unwrap();
        let value: Option<Vec<u32>> = cache.get("k").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = temp_cache("expired");
        cache
            .put("k", "short-lived".to_string(), Duration::ZERO)
            .await
            .unwrap();
        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_missing_key_is_a_miss() {
        let cache = temp_cache("missing");
        let value: Option<String> = cache.get("never-written").await.unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_open_on_unusable_path_is_a_cache_error() {
        // a plain file where the database directory should be
        let path = std::env::temp_dir().join(format!(
            "wayfarer-cache-not-a-dir-{}",
            std::process::id()
        ));
        std::fs::write(&path, b"occupied").unwrap();

        let err = TtlCache::open(&path).unwrap_err();
        assert!(matches!(err, WayfarerError::Cache { .. }));
        assert!(err.to_string().contains("cache database"));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = temp_cache("remove");
        cache
            .put("k", 7u64, Duration::from_secs(3600))
            .await
            .unwrap();
        cache.remove("k").await.unwrap();
        let value: Option<u64> = cache.get("k").await.unwrap();
        assert_eq!(value, None);
    }
}
