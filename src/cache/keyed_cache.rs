use chrono::{DateTime, Duration, Local};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{AnalysisParams, CacheEntry, CacheKey, CacheStats, EntryStamp};
use crate::constants::CACHE_FILE_EXTENSION;
use crate::utils::{Clock, SiteError, SystemClock};

/// TTL-gated result cache backed by one JSON file per key.
///
/// Expired entries are reclaimed lazily: on the first `get` that sees them,
/// or by an explicit `clear_expired`. There is no background sweeper.
/// Concurrent writers to the same key are last-write-wins.
pub struct KeyedCache {
    cache_dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl KeyedCache {
    /// Create a cache rooted at `cache_dir`, creating the directory if needed
    pub fn new(cache_dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self, SiteError> {
        Self::with_clock(cache_dir, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        cache_dir: impl Into<PathBuf>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SiteError> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            ttl,
            clock,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached data for `params`, or `None` on miss, expiry or store failure
    pub fn get<T: DeserializeOwned>(&self, params: &AnalysisParams) -> Option<T> {
        match self.try_get(params) {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache read error: {}", e);
                None
            }
        }
    }

    pub fn try_get<T: DeserializeOwned>(
        &self,
        params: &AnalysisParams,
    ) -> Result<Option<T>, SiteError> {
        let key = CacheKey::derive(params);
        let path = self.entry_path(&key);

        if !path.exists() {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        }

        let entry: CacheEntry<T> = read_record(&path)?;
        if self.is_expired(entry.created_at) {
            debug!("Cache EXPIRED for key: {}", key);
            fs::remove_file(&path)?;
            return Ok(None);
        }

        debug!("Cache HIT for key: {}", key);
        Ok(Some(entry.data))
    }

    /// Store `data` under `params`, replacing any previous entry; failures are logged only
    pub fn set<T: Serialize>(&self, params: &AnalysisParams, data: &T) {
        if let Err(e) = self.try_set(params, data) {
            warn!("Cache write error: {}", e);
        }
    }

    pub fn try_set<T: Serialize>(&self, params: &AnalysisParams, data: &T) -> Result<(), SiteError> {
        let key = CacheKey::derive(params);
        let entry = CacheEntry {
            key: key.clone(),
            created_at: self.clock.now(),
            params: params.clone(),
            data,
        };

        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.entry_path(&key), json)?;
        debug!("Cache SET for key: {}", key);
        Ok(())
    }

    /// Delete every entry older than the TTL; unreadable entries are skipped
    pub fn clear_expired(&self) -> usize {
        match self.try_clear_expired() {
            Ok(cleared) => cleared,
            Err(e) => {
                warn!("Cache sweep error: {}", e);
                0
            }
        }
    }

    pub fn try_clear_expired(&self) -> Result<usize, SiteError> {
        let mut cleared = 0;
        for path in self.entry_files()? {
            let stamp: EntryStamp = match read_record(&path) {
                Ok(stamp) => stamp,
                Err(e) => {
                    debug!("Skipping unreadable cache entry: {}", e);
                    continue;
                }
            };

            if self.is_expired(stamp.timestamp) {
                match fs::remove_file(&path) {
                    Ok(()) => cleared += 1,
                    Err(e) => debug!("Failed to remove {}: {}", path.display(), e),
                }
            }
        }
        Ok(cleared)
    }

    /// Delete every entry regardless of age
    pub fn clear_all(&self) -> usize {
        match self.try_clear_all() {
            Ok(cleared) => cleared,
            Err(e) => {
                warn!("Cache clear error: {}", e);
                0
            }
        }
    }

    pub fn try_clear_all(&self) -> Result<usize, SiteError> {
        let mut cleared = 0;
        for path in self.entry_files()? {
            match fs::remove_file(&path) {
                Ok(()) => cleared += 1,
                Err(e) => debug!("Failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(cleared)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let total_cached_items = self.entry_files().map(|files| files.len()).unwrap_or(0);
        CacheStats {
            total_cached_items,
            cache_dir: self.cache_dir.clone(),
            ttl_hours: self.ttl.num_seconds() as f64 / 3600.0,
        }
    }

    fn is_expired(&self, created_at: DateTime<Local>) -> bool {
        self.clock.now().signed_duration_since(created_at) > self.ttl
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", key, CACHE_FILE_EXTENSION))
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>, SiteError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(CACHE_FILE_EXTENSION)
            {
                files.push(path);
            }
        }
        Ok(files)
    }
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, SiteError> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| SiteError::CorruptRecord {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
