use std::path::Path;
pub use tempfile;

use logseek::{EntryStore, StoreLoader};

/// Create a temporary log directory and return its guard.
pub fn new_log_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Write one log file from `(id, question, answer, date, link)` rows, using
/// the same keyed-object shape the loader expects.
pub fn write_log(dir: &Path, name: &str, rows: &[(&str, &str, &str, &str, &str)]) {
    let mut body = serde_json::Map::new();
    for (id, question, answer, date, link) in rows {
        body.insert(
            (*id).to_string(),
            serde_json::json!({
                "question": question,
                "answer": answer,
                "date": date,
                "link": link,
            }),
        );
    }
    let text = serde_json::Value::Object(body).to_string();
    std::fs::write(dir.join(name), text).expect("write log file");
}

/// Load every file in the directory into a fresh store.
pub fn load_dir(dir: &Path) -> EntryStore {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .expect("read log dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    StoreLoader::new(files).load().expect("load store")
}
