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

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One record as it appears in a source log file. Source files are JSON
/// objects mapping an id key to one of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub link: String,
}

/// A normalized corpus entry. The derived fields are computed once when the
/// entry enters the store and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub date: String,
    pub link: String,
    pub question_lower: String,
    pub answer_lower: String,
    pub date_lower: String,
    /// Punctuation-collapsed lowercase copy, for phrase matching that should
    /// tolerate punctuation drift.
    pub question_clean: String,
    pub answer_clean: String,
    /// Digits extracted from `link`, compared lexicographically for
    /// chronological filtering.
    pub timestamp: String,
}

impl Entry {
    pub fn from_raw(id: impl Into<String>, raw: RawEntry) -> Self {
        let question_lower = raw.question.to_lowercase();
        let answer_lower = raw.answer.to_lowercase();
        let date_lower = raw.date.to_lowercase();
        let question_clean = clean_text(&raw.question);
        let answer_clean = clean_text(&raw.answer);
        let timestamp = raw.link.chars().filter(char::is_ascii_digit).collect();
        Entry {
            id: id.into(),
            question: raw.question,
            answer: raw.answer,
            date: raw.date,
            link: raw.link,
            question_lower,
            answer_lower,
            date_lower,
            question_clean,
            answer_clean,
            timestamp,
        }
    }

    /// Numeric value of `id` for ordering. Ids that do not parse order as 0.
    pub fn id_num(&self) -> i64 {
        parse_id(&self.id)
    }
}

/// Parses the leading integer of an id string; anything else orders as 0.
pub(crate) fn parse_id(id: &str) -> i64 {
    let s = id.trim();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => (-1, r),
        None => (1, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().map(|v| sign * v).unwrap_or(0)
}

/// Word characters for boundary and cleaning purposes: ASCII alphanumerics
/// and underscore.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lowercases `text` and collapses every run of non-word characters into a
/// single space, trimming the ends.
pub(crate) fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut gap = false;
    for c in text.chars() {
        if is_word_char(c) {
            if gap && !out.is_empty() {
                out.push(' ');
            }
            gap = false;
            out.push(c.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    out
}

/// Result list orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    Frequency,
    Random,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::Oldest => "oldest",
            SortBy::Frequency => "frequency",
            SortBy::Random => "random",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortBy::Newest),
            "oldest" => Ok(SortBy::Oldest),
            "frequency" => Ok(SortBy::Frequency),
            "random" => Ok(SortBy::Random),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Field-selection modes for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchIn {
    #[default]
    #[serde(rename = "both")]
    Both,
    #[serde(rename = "question")]
    Question,
    #[serde(rename = "answer")]
    Answer,
    /// Match only when both fields match.
    #[serde(rename = "dual-req")]
    DualRequired,
    /// Match in the question and nowhere else.
    #[serde(rename = "q-excl")]
    QuestionExclusive,
    /// Match in the answer and nowhere else.
    #[serde(rename = "a-excl")]
    AnswerExclusive,
    /// Like `Both`, with the date field also searched and counted.
    #[serde(rename = "date-incl")]
    DateInclusive,
}

impl SearchIn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIn::Both => "both",
            SearchIn::Question => "question",
            SearchIn::Answer => "answer",
            SearchIn::DualRequired => "dual-req",
            SearchIn::QuestionExclusive => "q-excl",
            SearchIn::AnswerExclusive => "a-excl",
            SearchIn::DateInclusive => "date-incl",
        }
    }

    /// Whether the question field is selected for display decoration.
    pub(crate) fn selects_question(&self) -> bool {
        !matches!(self, SearchIn::Answer | SearchIn::AnswerExclusive)
    }

    /// Whether the answer field is selected for display decoration.
    pub(crate) fn selects_answer(&self) -> bool {
        !matches!(self, SearchIn::Question | SearchIn::QuestionExclusive)
    }
}

impl FromStr for SearchIn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(SearchIn::Both),
            "question" => Ok(SearchIn::Question),
            "answer" => Ok(SearchIn::Answer),
            "dual-req" => Ok(SearchIn::DualRequired),
            "q-excl" => Ok(SearchIn::QuestionExclusive),
            "a-excl" => Ok(SearchIn::AnswerExclusive),
            "date-incl" => Ok(SearchIn::DateInclusive),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

/// Parameters for one search invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub search_in: SearchIn,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        SearchRequest {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn search_in(mut self, search_in: SearchIn) -> Self {
        self.search_in = search_in;
        self
    }
}

/// One surviving entry. Display fields carry highlight spans when their
/// field was selected by the search mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub date: String,
    pub link: String,
    pub match_count: usize,
}

/// A successful search (even one with zero hits) has an empty message; a
/// rejected query has zero results and a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub message: String,
}

impl SearchResponse {
    pub(crate) fn ok(results: Vec<SearchHit>) -> Self {
        SearchResponse {
            results,
            message: String::new(),
        }
    }

    pub(crate) fn failure(message: impl Into<String>) -> Self {
        SearchResponse {
            results: Vec::new(),
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.message.is_empty()
    }
}
