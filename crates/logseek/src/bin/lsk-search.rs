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
use logseek::{
    EntryCache, SearchIn, SearchRequest, Searcher, SortBy, StoreError, StoreLoader,
};
use std::path::PathBuf;
use std::result::Result as StdResult;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "lsk-search", about = "One-shot search over a question/answer log directory")]
struct Args {
    /// Query string (supports quotes, AND/OR/XOR, date directives, REGEX=)
    query: String,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the *.json log files
    #[arg(long)]
    logs: Option<PathBuf>,
    /// Result ordering: newest|oldest|frequency|random
    #[arg(long)]
    sort: Option<String>,
    /// Field selection: both|question|answer|dual-req|q-excl|a-excl|date-incl
    #[arg(long)]
    mode: Option<String>,
    /// Cache directory (defaults to <logs>/.cache)
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Skip the persistent cache entirely
    #[arg(long)]
    no_cache: bool,
    /// Print at most this many hits
    #[arg(long)]
    limit: Option<usize>,
    /// Emit JSON (NDJSON)
    #[arg(long)]
    json: bool,
}

#[derive(Debug, serde::Deserialize)]
struct AppConfig {
    logs: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    sort: Option<String>,
    mode: Option<String>,
}

impl AppConfig {
    fn load(path: Option<&PathBuf>) -> StdResult<(Self, PathBuf), StoreError> {
        let cfg_path = path
            .cloned()
            .unwrap_or_else(|| PathBuf::from("logseek.toml"));
        if cfg_path.exists() {
            let s = std::fs::read_to_string(&cfg_path)?;
            let cfg: AppConfig = toml::from_str(&s)?;
            Ok((cfg, cfg_path))
        } else {
            Ok((
                AppConfig {
                    logs: None,
                    cache_dir: None,
                    sort: None,
                    mode: None,
                },
                cfg_path,
            ))
        }
    }
}

fn main() -> StdResult<(), StoreError> {
    let args = Args::parse();
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::Builder::from_env(env).init();

    let (cfg, cfg_path) = AppConfig::load(args.config.as_ref())?;
    if cfg_path.exists() {
        info!("loaded config from {}", cfg_path.display());
    }

    let logs = args
        .logs
        .clone()
        .or_else(|| cfg.logs.clone())
        .unwrap_or_else(|| PathBuf::from("logs"));
    let sort_by = match args.sort.as_deref().or(cfg.sort.as_deref()) {
        Some(s) => SortBy::from_str(s).map_err(StoreError::Config)?,
        None => SortBy::default(),
    };
    let search_in = match args.mode.as_deref().or(cfg.mode.as_deref()) {
        Some(s) => SearchIn::from_str(s).map_err(StoreError::Config)?,
        None => SearchIn::default(),
    };

    let files = source_files(&logs)?;
    let mut loader = StoreLoader::new(files);
    if !args.no_cache {
        let dir = args
            .cache_dir
            .clone()
            .or_else(|| cfg.cache_dir.clone())
            .unwrap_or_else(|| logs.join(".cache"));
        loader = loader.cache(EntryCache::open(dir));
    }
    let store = loader.load()?;

    let searcher = Searcher::new(&store);
    let request = SearchRequest::new(&args.query)
        .sort_by(sort_by)
        .search_in(search_in);
    let resp = searcher.search(&request);

    if !resp.is_ok() {
        println!("{}", resp.message);
        return Ok(());
    }

    if !args.json {
        println!("{} result(s)", resp.results.len());
    }
    let shown = match args.limit {
        Some(n) => &resp.results[..resp.results.len().min(n)],
        None => &resp.results[..],
    };
    for hit in shown {
        if args.json {
            println!("{}", serde_json::to_string(hit)?);
        } else {
            println!("#{} [{}] {} match(es)", hit.id, hit.date, hit.match_count);
            println!("  Q: {}", hit.question);
            println!("  A: {}", hit.answer);
            println!("  {}", hit.link);
        }
    }
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
