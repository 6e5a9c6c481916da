// Copyright 2025 Logseek Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod cache;
mod error;
pub mod loader;

pub use cache::{EntryCache, CACHE_SCHEMA_VERSION};
pub use error::StoreError;
pub use loader::StoreLoader;

use crate::types::Entry;
use parking_lot::RwLock;
use std::sync::Arc;

/// Lifecycle of the entry store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Never loaded.
    Empty,
    /// A load is in flight.
    Loading,
    /// A load ran to completion; the store holds its final contents,
    /// which may legitimately be zero entries.
    Ready,
    /// The last load aborted before completion.
    Failed,
}

#[derive(Debug)]
pub struct EntryStoreInner {
    pub entries: Vec<Entry>,
    pub state: LoadState,
}

/// The in-memory corpus: a flat entry vector sorted ascending by numeric id,
/// immutable between loads. Handles are cheap to clone and share one store.
#[derive(Debug, Clone)]
pub struct EntryStore {
    inner: Arc<RwLock<EntryStoreInner>>,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    pub fn new() -> Self {
        EntryStore {
            inner: Arc::new(RwLock::new(EntryStoreInner {
                entries: Vec::new(),
                state: LoadState::Empty,
            })),
        }
    }

    /// crate-local constructor used by the loader and test helpers
    pub(crate) fn from_entries(mut entries: Vec<Entry>) -> Self {
        entries.sort_by_key(Entry::id_num);
        EntryStore {
            inner: Arc::new(RwLock::new(EntryStoreInner {
                entries,
                state: LoadState::Ready,
            })),
        }
    }

    pub fn state(&self) -> LoadState {
        self.inner.read().state
    }

    /// True once a load has run to completion.
    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Ready
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Public accessor to retrieve a cloned entry by store position.
    pub fn entry(&self, idx: usize) -> Option<Entry> {
        let inner = self.inner.read();
        inner.entries.get(idx).cloned()
    }

    /// Moves `Empty`/`Ready`/`Failed` to `Loading`; refuses while another
    /// load is in flight.
    pub(crate) fn begin_load(&self) -> bool {
        let mut inner = self.inner.write();
        if inner.state == LoadState::Loading {
            return false;
        }
        inner.state = LoadState::Loading;
        true
    }

    /// Installs the merged entries, already sorted, and moves to `Ready`.
    pub(crate) fn finish_load(&self, entries: Vec<Entry>) {
        let mut inner = self.inner.write();
        inner.entries = entries;
        inner.state = LoadState::Ready;
    }

    pub(crate) fn fail_load(&self) {
        self.inner.write().state = LoadState::Failed;
    }

    pub(crate) fn read_inner(&self) -> parking_lot::RwLockReadGuard<'_, EntryStoreInner> {
        self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawEntry;

    fn entry(id: &str) -> Entry {
        Entry::from_raw(id, RawEntry::default())
    }

    #[test]
    fn fresh_store_is_empty_not_ready() {
        let store = EntryStore::new();
        assert_eq!(store.state(), LoadState::Empty);
        assert!(!store.is_loaded());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn load_lifecycle_transitions() {
        let store = EntryStore::new();
        assert!(store.begin_load());
        assert_eq!(store.state(), LoadState::Loading);
        assert!(!store.begin_load());
        store.finish_load(vec![entry("1"), entry("2")]);
        assert_eq!(store.state(), LoadState::Ready);
        assert_eq!(store.len(), 2);
        // a completed zero-entry load is Ready, distinguishable from Empty
        let empty = EntryStore::new();
        assert!(empty.begin_load());
        empty.finish_load(Vec::new());
        assert_eq!(empty.state(), LoadState::Ready);
        assert!(empty.is_empty());
    }

    #[test]
    fn from_entries_orders_by_numeric_id() {
        let store = EntryStore::from_entries(vec![entry("10"), entry("2"), entry("na")]);
        let ids: Vec<String> = (0..store.len())
            .filter_map(|i| store.entry(i).map(|e| e.id))
            .collect();
        assert_eq!(ids, vec!["na", "2", "10"]);
    }
}
