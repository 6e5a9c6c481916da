use super::cache::EntryCache;
use super::EntryStore;
use crate::types::{Entry, RawEntry};
use anyhow::bail;
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

type ProgressFn = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Reads every source file, all concurrently, and populates an [`EntryStore`]
/// once every file has settled. Individual files that fail to read or parse
/// contribute nothing; the rest of the load proceeds.
pub struct StoreLoader {
    files: Vec<PathBuf>,
    cache: Option<EntryCache>,
    progress: Option<ProgressFn>,
    thread_cap: Option<usize>,
}

impl StoreLoader {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            cache: None,
            progress: None,
            thread_cap: None,
        }
    }

    /// Attaches a persistent cache consulted before each read and fed after
    /// each successful parse.
    pub fn cache(mut self, cache: EntryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Registers a callback invoked after each individual file settles with
    /// `(completed, total)`.
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn load_threads(mut self, n: usize) -> Self {
        self.thread_cap = Some(n.max(1));
        self
    }

    /// Runs the load into `store`, returning the final entry count. The
    /// caller is not told which files failed, only how many entries
    /// survived the merge.
    pub fn load_into(self, store: &EntryStore) -> anyhow::Result<usize> {
        if !store.begin_load() {
            bail!("another load is already in progress");
        }
        // Leaves the store in Failed rather than wedged in Loading if the
        // fan-out panics.
        let mut guard = LoadGuard { store, done: false };
        let mut entries = self.fetch_all();
        entries.sort_by_key(Entry::id_num);
        let count = entries.len();
        store.finish_load(entries);
        guard.done = true;
        info!("loaded {} entries", count);
        Ok(count)
    }

    /// One-shot convenience over [`StoreLoader::load_into`].
    pub fn load(self) -> anyhow::Result<EntryStore> {
        let store = EntryStore::new();
        self.load_into(&store)?;
        Ok(store)
    }

    fn fetch_all(&self) -> Vec<Entry> {
        use rayon::prelude::*;
        use rayon::ThreadPoolBuilder;

        let total = self.files.len();
        let done = AtomicUsize::new(0);
        let cache = self.cache.as_ref();
        let progress = self.progress.as_ref();

        let fetch_one = |path: &PathBuf| -> Vec<Entry> {
            let name = path.to_string_lossy();
            let records = match cache.and_then(|c| c.get(&name)) {
                Some(records) => Some(records),
                None => match std::fs::read_to_string(path) {
                    Ok(text) => match serde_json::from_str::<HashMap<String, RawEntry>>(&text) {
                        Ok(records) => {
                            if let Some(c) = cache {
                                c.put(&name, &records);
                            }
                            Some(records)
                        }
                        Err(e) => {
                            warn!("failed to parse {}: {}", path.display(), e);
                            None
                        }
                    },
                    Err(e) => {
                        warn!("failed to load {}: {}", path.display(), e);
                        None
                    }
                },
            };
            let out = records
                .map(|m| {
                    m.into_iter()
                        .map(|(key, raw)| Entry::from_raw(key, raw))
                        .collect()
                })
                .unwrap_or_default();
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(cb) = progress {
                cb(finished, total);
            }
            out
        };

        let avail = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let default_cap = std::cmp::min(avail, 8).max(1);
        let env_cap = std::env::var("LOGSEEK_LOAD_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .map(|n| n.max(1));
        let cap = self
            .thread_cap
            .or(env_cap)
            .unwrap_or(default_cap)
            .min(avail)
            .max(1);

        let fetched: Vec<Vec<Entry>> =
            if let Ok(pool) = ThreadPoolBuilder::new().num_threads(cap).build() {
                pool.install(|| self.files.par_iter().map(&fetch_one).collect())
            } else {
                self.files.par_iter().map(&fetch_one).collect()
            };
        fetched.into_iter().flatten().collect()
    }
}

struct LoadGuard<'a> {
    store: &'a EntryStore,
    done: bool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.store.fail_load();
        }
    }
}
