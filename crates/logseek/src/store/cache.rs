use crate::types::RawEntry;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bump to invalidate every previously cached source file.
pub const CACHE_SCHEMA_VERSION: u32 = 2;

const VERSION_FILE: &str = ".version";

/// Directory-backed cache of fetched source files, keyed by source name and
/// stamped with [`CACHE_SCHEMA_VERSION`]. Every operation is best-effort:
/// a cache that cannot be read or written degrades to a miss, never an error.
#[derive(Debug, Clone)]
pub struct EntryCache {
    dir: PathBuf,
}

#[derive(Serialize)]
struct CacheRecordRef<'a> {
    version: u32,
    source: &'a str,
    entries: &'a HashMap<String, RawEntry>,
}

#[derive(Deserialize)]
struct CacheRecord {
    version: u32,
    source: String,
    entries: HashMap<String, RawEntry>,
}

impl EntryCache {
    /// Opens (creating if needed) the cache under `dir`. A missing or stale
    /// version stamp resets the whole store; the cache is never partially
    /// migrated across schema versions.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("cache dir {} unusable: {}", dir.display(), e);
            return EntryCache { dir };
        }
        let stamp = dir.join(VERSION_FILE);
        let current = fs::read_to_string(&stamp)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok());
        if current != Some(CACHE_SCHEMA_VERSION) {
            if has_content(&dir) {
                info!(
                    "cache schema changed (found {:?}, want {}), resetting {}",
                    current,
                    CACHE_SCHEMA_VERSION,
                    dir.display()
                );
                remove_files(&dir);
            }
            if let Err(e) = fs::write(&stamp, CACHE_SCHEMA_VERSION.to_string()) {
                warn!("cache stamp write failed: {}", e);
            }
        }
        EntryCache { dir }
    }

    /// Returns the cached record map for `name`, or `None` on any miss,
    /// version/source mismatch, or read error.
    pub fn get(&self, name: &str) -> Option<HashMap<String, RawEntry>> {
        let path = self.entry_path(name);
        let text = fs::read_to_string(&path).ok()?;
        let rec: CacheRecord = match serde_json::from_str(&text) {
            Ok(rec) => rec,
            Err(e) => {
                debug!("cache entry {} unreadable: {}", path.display(), e);
                return None;
            }
        };
        if rec.version != CACHE_SCHEMA_VERSION || rec.source != name {
            debug!("cache miss for {} (stale record)", name);
            return None;
        }
        debug!("cache hit for {}", name);
        Some(rec.entries)
    }

    /// Stores the record map fetched for `name`. Failures are logged and
    /// swallowed; the load path never blocks on the cache.
    pub fn put(&self, name: &str, entries: &HashMap<String, RawEntry>) {
        let rec = CacheRecordRef {
            version: CACHE_SCHEMA_VERSION,
            source: name,
            entries,
        };
        let text = match serde_json::to_string(&rec) {
            Ok(text) => text,
            Err(e) => {
                warn!("cache encode failed for {}: {}", name, e);
                return;
            }
        };
        if let Err(e) = fs::write(self.entry_path(name), text) {
            warn!("cache write failed for {}: {}", name, e);
        }
    }

    /// Removes every cached record. Idempotent; silent when the store is
    /// absent or unwritable.
    pub fn clear(&self) {
        remove_files(&self.dir);
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(cache_file_name(name))
    }
}

/// Maps a source name to a flat file name, squashing path separators. Name
/// collisions are harmless: the stored record carries its source name and a
/// mismatch reads as a miss.
fn cache_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn has_content(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut it| it.next().is_some())
        .unwrap_or(false)
}

fn remove_files(dir: &Path) {
    let Ok(it) = fs::read_dir(dir) else {
        return;
    };
    for dent in it.flatten() {
        let path = dent.path();
        if path.is_file() {
            let _ = fs::remove_file(&path);
        }
    }
}
