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

use super::error::QueryError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Width of a fully specified timestamp: YYYYMMDDHHMMSS.
const TIMESTAMP_DIGITS: usize = 14;

static DATE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(before|bfr|after|aft|range|rng):(\d+(?:[-.:]\d+)*)(?:\.\.(\d+(?:[-.:]\d+)*))?")
        .unwrap()
});

/// Predicate over an entry's normalized timestamp. Bounds are padded to
/// [`TIMESTAMP_DIGITS`] so that plain lexicographic comparison orders
/// partial dates correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    /// Strictly earlier than the bound.
    Before(String),
    /// At or later than the bound.
    After(String),
    /// Inclusive between both bounds.
    Range(String, String),
}

impl DateFilter {
    pub fn accepts(&self, ts: &str) -> bool {
        match self {
            DateFilter::Before(b) => ts < b.as_str(),
            DateFilter::After(b) => ts >= b.as_str(),
            DateFilter::Range(lo, hi) => lo.as_str() <= ts && ts <= hi.as_str(),
        }
    }
}

/// Result of scanning a query for a date directive: the query with the
/// directive removed, and the filter it produced (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateExtraction {
    pub remainder: String,
    pub filter: Option<DateFilter>,
}

/// Extracts the first `before:`/`bfr:`, `after:`/`aft:` or `range:`/`rng:`
/// directive. Later directives are left in place and parse as ordinary
/// terms. A value with fewer than 4 digits, or a `range` missing its second
/// bound, rejects the whole query.
pub fn extract_date_filter(query: &str) -> Result<DateExtraction, QueryError> {
    if let Some(caps) = DATE_DIRECTIVE.captures(query) {
        if let (Some(all), Some(op), Some(first)) = (caps.get(0), caps.get(1), caps.get(2)) {
            let lo = normalize(first.as_str())?;
            let filter = match op.as_str().to_ascii_lowercase().as_str() {
                "range" | "rng" => {
                    let second = caps.get(3).ok_or(QueryError::OpenRange)?;
                    let hi = normalize(second.as_str())?;
                    DateFilter::Range(pad(&lo, '0'), pad(&hi, '9'))
                }
                "after" | "aft" => DateFilter::After(pad(&lo, '0')),
                // before | bfr
                _ => DateFilter::Before(pad(&lo, '0')),
            };
            let mut remainder = String::with_capacity(query.len());
            remainder.push_str(&query[..all.start()]);
            remainder.push_str(&query[all.end()..]);
            return Ok(DateExtraction {
                remainder,
                filter: Some(filter),
            });
        }
    }
    Ok(DateExtraction {
        remainder: query.to_string(),
        filter: None,
    })
}

/// Strips separators down to bare digits; fewer than 4 digits is too
/// ambiguous to filter on.
fn normalize(value: &str) -> Result<String, QueryError> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return Err(QueryError::ShortDate);
    }
    Ok(digits)
}

/// Right-pads to the full timestamp width; bounds already longer are kept.
fn pad(value: &str, fill: char) -> String {
    let mut out = value.to_string();
    while out.len() < TIMESTAMP_DIGITS {
        out.push(fill);
    }
    out
}
