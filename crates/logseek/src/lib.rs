//! In-memory search over question/answer log archives.
//! Focus: load JSON logs once, answer interactive queries synchronously.

mod highlight;
pub mod query;
pub mod store;
pub mod types;

pub use crate::query::{DateFilter, QueryError, QueryPlan, Searcher};
pub use crate::store::{
    EntryCache, EntryStore, LoadState, StoreError, StoreLoader, CACHE_SCHEMA_VERSION,
};
pub use crate::types::{
    Entry, RawEntry, SearchHit, SearchIn, SearchRequest, SearchResponse, SortBy,
};

/// Convenience for callers who want a simple one-shot load: every `.json`
/// file directly under `dir` becomes a source.
pub fn load_log_dir(dir: impl AsRef<std::path::Path>) -> anyhow::Result<EntryStore> {
    let mut files: Vec<std::path::PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    StoreLoader::new(files).load()
}

pub mod test_helpers {
    use crate::store::EntryStore;
    use crate::types::{Entry, RawEntry};

    /// Test-only wrapper to reach EntryStore::from_entries (pub(crate)) so
    /// integration tests can build a store without touching the filesystem.
    pub fn store_from_entries(entries: Vec<Entry>) -> EntryStore {
        EntryStore::from_entries(entries)
    }

    /// Builds a store from `(id, question, answer, date, link)` rows.
    pub fn store_from_rows(rows: &[(&str, &str, &str, &str, &str)]) -> EntryStore {
        let entries = rows
            .iter()
            .map(|(id, question, answer, date, link)| {
                Entry::from_raw(
                    *id,
                    RawEntry {
                        question: (*question).into(),
                        answer: (*answer).into(),
                        date: (*date).into(),
                        link: (*link).into(),
                    },
                )
            })
            .collect();
        EntryStore::from_entries(entries)
    }
}
