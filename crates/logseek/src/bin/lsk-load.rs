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

use clap::Parser;
use log::info;
use logseek::{EntryCache, EntryStore, StoreError, StoreLoader};
use std::path::PathBuf;
use std::result::Result as StdResult;

#[derive(Parser, Debug)]
#[command(name = "lsk-load", about = "Load log files, warm the cache, report counts")]
struct Args {
    /// Directory holding the *.json log files
    logs: PathBuf,
    /// Cache directory (defaults to <logs>/.cache)
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Skip the persistent cache entirely
    #[arg(long)]
    no_cache: bool,
    /// Cap the load fan-out at this many threads
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> StdResult<(), StoreError> {
    let args = Args::parse();
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::Builder::from_env(env).init();

    let files = source_files(&args.logs)?;
    let total = files.len();

    let mut loader = StoreLoader::new(files).on_progress(|done, total| {
        info!("fetched {}/{} files", done, total);
    });
    if !args.no_cache {
        let dir = args
            .cache_dir
            .clone()
            .unwrap_or_else(|| args.logs.join(".cache"));
        loader = loader.cache(EntryCache::open(dir));
    }
    if let Some(n) = args.threads {
        loader = loader.load_threads(n);
    }

    let store = EntryStore::new();
    let count = loader.load_into(&store)?;
    println!("loaded {} entries from {} files", count, total);
    Ok(())
}

fn source_files(dir: &PathBuf) -> StdResult<Vec<PathBuf>, StoreError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(StoreError::NoSources(dir.display().to_string()));
    }
    Ok(files)
}
