mod eval;
mod rank;

use std::cell::RefCell;

use lru::LruCache;
use regex::Regex;

use crate::highlight::{decorate, decorate_raw, term_alternation};
use crate::store::EntryStore;
use crate::types::{Entry, SearchHit, SearchIn, SearchRequest, SearchResponse};

use super::error::QueryError;
use super::plan::QueryPlan;
use eval::{eval_entry, prepare_terms, PreparedTerm};

/// Runs parsed queries against a store snapshot. Cheap to construct; create
/// one per store handle and reuse it so pattern compiles are shared.
pub struct Searcher<'a> {
    store: &'a EntryStore,
    // small LRU for repeated pattern compiles across searches
    patterns: RefCell<LruCache<String, Regex>>,
}

impl<'a> Searcher<'a> {
    pub fn new(store: &'a EntryStore) -> Self {
        Self {
            store,
            patterns: RefCell::new(LruCache::new(std::num::NonZeroUsize::new(64).unwrap())),
        }
    }

    /// Compiles `pattern`, reusing a recent compile of the same string.
    /// `None` when the pattern does not compile.
    fn compile_cached(&self, pattern: &str) -> Option<Regex> {
        let mut cache = self.patterns.borrow_mut();
        if let Some(re) = cache.get(pattern) {
            return Some(re.clone());
        }
        match Regex::new(pattern) {
            Ok(re) => {
                cache.put(pattern.to_string(), re.clone());
                Some(re)
            }
            Err(_) => None,
        }
    }

    /// Parses the request's query once and evaluates it against a single
    /// snapshot of the store. A rejected query yields zero results and a
    /// non-empty message; a successful search always has an empty message,
    /// even with zero hits.
    pub fn search(&self, req: &SearchRequest) -> SearchResponse {
        let plan = match QueryPlan::parse(&req.query) {
            Ok(plan) => plan,
            Err(err) => return SearchResponse::failure(err.to_string()),
        };
        let inner = self.store.read_inner();

        let mut hits = if let Some(pattern) = &plan.raw_pattern {
            // case-sensitive, verbatim; matches count against the original
            // field text and decoration skips the markup guard
            let Some(re) = self.compile_cached(pattern) else {
                return SearchResponse::failure(QueryError::BadPattern.to_string());
            };
            let prepared = vec![PreparedTerm::Exact(Some(re.clone()))];
            collect_hits(&inner.entries, &plan, &prepared, req.search_in, |text| {
                decorate_raw(text, &re)
            })
        } else {
            let prepared = prepare_terms(&plan.terms, |p| self.compile_cached(p));
            let marker = term_alternation(&plan.terms).and_then(|p| self.compile_cached(&p));
            collect_hits(
                &inner.entries,
                &plan,
                &prepared,
                req.search_in,
                |text| match &marker {
                    Some(re) => decorate(text, re),
                    None => text.to_string(),
                },
            )
        };

        rank::sort_hits(&mut hits, req.sort_by);
        SearchResponse::ok(hits)
    }
}

/// Walks every entry in the snapshot: date filter first, then term
/// evaluation, then decoration of whichever fields the mode selects.
fn collect_hits<F>(
    entries: &[Entry],
    plan: &QueryPlan,
    prepared: &[PreparedTerm],
    mode: SearchIn,
    decorate_field: F,
) -> Vec<SearchHit>
where
    F: Fn(&str) -> String,
{
    let mut hits = Vec::new();
    for entry in entries {
        if let Some(filter) = &plan.date {
            if !filter.accepts(&entry.timestamp) {
                continue;
            }
        }
        let Some(match_count) =
            eval_entry(entry, prepared, plan.expr.as_ref(), plan.is_complex, mode)
        else {
            continue;
        };
        let question = if mode.selects_question() {
            decorate_field(&entry.question)
        } else {
            entry.question.clone()
        };
        let answer = if mode.selects_answer() {
            decorate_field(&entry.answer)
        } else {
            entry.answer.clone()
        };
        hits.push(SearchHit {
            id: entry.id.clone(),
            question,
            answer,
            date: entry.date.clone(),
            link: entry.link.clone(),
            match_count,
        });
    }
    hits
}
