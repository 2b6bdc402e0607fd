//! JSON file backed response cache
//!
//! The file holds `{"scanned_links": {"<url>": {"url", "size", "response_code"}}}`
//! and lives under the user's cache directory by default.

use crate::storage::{CacheError, CacheResult, ResponseCache, ScannedLink};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const CACHE_DIR_NAME: &str = "deadlink-scout";
const CACHE_FILE_NAME: &str = "cache.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    scanned_links: HashMap<String, ScannedLink>,
}

/// Response cache persisted as a JSON file
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    data: Mutex<CacheFile>,
}

/// Returns the default cache file location
///
/// This is `<user cache dir>/deadlink-scout/cache.json`, e.g.
/// `$HOME/.cache/deadlink-scout/cache.json` on Linux.
pub fn default_cache_path() -> CacheResult<PathBuf> {
    let dir = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
    Ok(dir.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
}

impl JsonFileCache {
    /// Loads the cache from a file
    ///
    /// A missing file yields an empty cache that will be created on flush.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON cache file
    ///
    /// # Returns
    ///
    /// * `Ok(JsonFileCache)` - Loaded or empty cache
    /// * `Err(CacheError)` - The file exists but could not be read or parsed
    pub fn load(path: &Path) -> CacheResult<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheFile::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Loaded {} cached links from {}",
            data.scanned_links.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
        })
    }

    /// Number of cached links
    pub fn len(&self) -> usize {
        self.lock().scanned_links.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.lock().scanned_links.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, CacheFile> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseCache for JsonFileCache {
    fn get(&self, url: &str) -> Option<ScannedLink> {
        self.lock().scanned_links.get(url).cloned()
    }

    fn set(&self, url: &str, response_code: u16, size: u64) {
        self.lock().scanned_links.insert(
            url.to_string(),
            ScannedLink {
                url: url.to_string(),
                size,
                response_code,
            },
        );
    }

    fn flush(&self) -> CacheResult<()> {
        let mut json = serde_json::to_string_pretty(&*self.lock())?;
        json.push('\n');

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;

        tracing::debug!("Flushed response cache to {}", self.path.display());
        Ok(())
    }
}
