use crate::highlight::boundary_pattern;
use crate::query::ast::{Expr, Term};
use crate::types::{clean_text, is_word_char, Entry, SearchIn};
use regex::Regex;

/// A term compiled for matching. Exact terms carry their boundary pattern
/// (`None` when it failed to build, in which case the term counts nothing);
/// other terms scan by substring over the field copy the needle calls for.
pub(super) enum PreparedTerm {
    Exact(Option<Regex>),
    Scan {
        /// Cleaned needle, present unless the term is punctuation-heavy or
        /// cleans to nothing; those fall back to the raw lowercase pair.
        clean: Option<String>,
        lower: String,
    },
}

/// Compiles every term once up front. `compile` is the searcher's cached
/// pattern constructor.
pub(super) fn prepare_terms<F>(terms: &[Term], mut compile: F) -> Vec<PreparedTerm>
where
    F: FnMut(&str) -> Option<Regex>,
{
    terms
        .iter()
        .map(|term| {
            if term.exact {
                let pattern = compile(&format!("(?i){}", boundary_pattern(&term.text)));
                PreparedTerm::Exact(pattern)
            } else {
                let lower = term.text.to_lowercase();
                let cleaned = clean_text(&term.text);
                let symbolic = lower
                    .chars()
                    .any(|c| !is_word_char(c) && !c.is_whitespace());
                let clean = (!symbolic && !cleaned.is_empty()).then_some(cleaned);
                PreparedTerm::Scan { clean, lower }
            }
        })
        .collect()
}

impl PreparedTerm {
    fn count_question(&self, entry: &Entry) -> usize {
        match self {
            PreparedTerm::Exact(p) => pattern_count(p, &entry.question),
            PreparedTerm::Scan {
                clean: Some(needle),
                ..
            } => substring_count(&entry.question_clean, needle),
            PreparedTerm::Scan { lower, .. } => substring_count(&entry.question_lower, lower),
        }
    }

    fn count_answer(&self, entry: &Entry) -> usize {
        match self {
            PreparedTerm::Exact(p) => pattern_count(p, &entry.answer),
            PreparedTerm::Scan {
                clean: Some(needle),
                ..
            } => substring_count(&entry.answer_clean, needle),
            PreparedTerm::Scan { lower, .. } => substring_count(&entry.answer_lower, lower),
        }
    }

    // The date field has no cleaned copy; substring scans use its lowercase
    // form whatever the needle preference.
    fn count_date(&self, entry: &Entry) -> usize {
        match self {
            PreparedTerm::Exact(p) => pattern_count(p, &entry.date),
            PreparedTerm::Scan { lower, .. } => substring_count(&entry.date_lower, lower),
        }
    }
}

fn pattern_count(pattern: &Option<Regex>, text: &str) -> usize {
    match pattern {
        Some(re) => re.find_iter(text).count(),
        None => 0,
    }
}

/// Overlapping occurrence count: the scan advances one character past each
/// match start, so "aa" occurs twice in "aaa".
pub(super) fn substring_count(hay: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut offset = 0;
    while let Some(pos) = hay[offset..].find(needle) {
        count += 1;
        let abs = offset + pos;
        let step = hay[abs..]
            .chars()
            .next()
            .map(|c| c.len_utf8())
            .unwrap_or(1);
        offset = abs + step;
    }
    count
}

/// Per-term verdict for one entry: whether the term "has a match" under the
/// field-selection mode, and how much it contributes to the ranking total.
pub(super) fn mode_verdict(mode: SearchIn, d: usize, q: usize, a: usize) -> (bool, usize) {
    match mode {
        SearchIn::Both => (q > 0 || a > 0, d + q + a),
        SearchIn::Question => (q > 0, q),
        SearchIn::Answer => (a > 0, a),
        SearchIn::DualRequired => (q > 0 && a > 0, d + q + a),
        SearchIn::QuestionExclusive => (q > 0 && a == 0, q),
        SearchIn::AnswerExclusive => (a > 0 && q == 0, a),
        SearchIn::DateInclusive => (d > 0 || q > 0 || a > 0, d + q + a),
    }
}

fn count_term(entry: &Entry, term: &PreparedTerm, mode: SearchIn) -> (bool, usize) {
    let q = if mode == SearchIn::Answer {
        0
    } else {
        term.count_question(entry)
    };
    let a = if mode == SearchIn::Question {
        0
    } else {
        term.count_answer(entry)
    };
    let d = if mode == SearchIn::DateInclusive {
        term.count_date(entry)
    } else {
        0
    };
    mode_verdict(mode, d, q, a)
}

/// Evaluates one entry. `Some(match_count)` when it survives, where the
/// count sums every term's counted total.
pub(super) fn eval_entry(
    entry: &Entry,
    terms: &[PreparedTerm],
    expr: Option<&Expr>,
    is_complex: bool,
    mode: SearchIn,
) -> Option<usize> {
    if terms.is_empty() {
        // date-only search: every entry that reached us passes
        return Some(0);
    }
    let mut total = 0usize;
    if !is_complex {
        for term in terms {
            let (hit, counted) = count_term(entry, term, mode);
            if !hit {
                return None;
            }
            total += counted;
        }
        return Some(total);
    }
    let mut vals = Vec::with_capacity(terms.len());
    for term in terms {
        let (hit, counted) = count_term(entry, term, mode);
        vals.push(hit);
        total += counted;
    }
    let matched = match expr {
        Some(e) => eval_expr(e, &vals).unwrap_or(false),
        None => false,
    };
    if matched {
        Some(total)
    } else {
        None
    }
}

/// Walks the boolean tree against the per-term vector. `None` marks an
/// evaluation anomaly (a term index out of range) and reads as non-match.
/// `And`/`Or` short-circuit left to right; `Xor` is "not equal", composing
/// left to right when chained.
pub(super) fn eval_expr(expr: &Expr, vals: &[bool]) -> Option<bool> {
    match expr {
        Expr::Term(i) => vals.get(*i).copied(),
        Expr::And(l, r) => Some(eval_expr(l, vals)? && eval_expr(r, vals)?),
        Expr::Or(l, r) => Some(eval_expr(l, vals)? || eval_expr(r, vals)?),
        Expr::Xor(l, r) => Some(eval_expr(l, vals)? != eval_expr(r, vals)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawEntry;

    fn entry(question: &str, answer: &str) -> Entry {
        Entry::from_raw(
            "1",
            RawEntry {
                question: question.into(),
                answer: answer.into(),
                date: "March 2020".into(),
                link: "https://x/20200301".into(),
            },
        )
    }

    fn compile(p: &str) -> Option<Regex> {
        Regex::new(p).ok()
    }

    #[test]
    fn substring_counts_overlap() {
        assert_eq!(substring_count("aaa", "aa"), 2);
        assert_eq!(substring_count("banana", "ana"), 2);
        assert_eq!(substring_count("abc", "d"), 0);
        assert_eq!(substring_count("abc", ""), 0);
        assert_eq!(substring_count("ééé", "éé"), 2);
    }

    #[test]
    fn preparation_follows_the_cleaned_raw_heuristic() {
        let terms = vec![
            Term {
                text: "red car".into(),
                exact: false,
            },
            Term {
                text: "c++".into(),
                exact: false,
            },
            Term {
                text: "cat".into(),
                exact: true,
            },
        ];
        let prepared = prepare_terms(&terms, compile);
        assert!(matches!(
            &prepared[0],
            PreparedTerm::Scan { clean: Some(c), .. } if c == "red car"
        ));
        assert!(matches!(
            &prepared[1],
            PreparedTerm::Scan { clean: None, lower } if lower == "c++"
        ));
        assert!(matches!(&prepared[2], PreparedTerm::Exact(Some(_))));
    }

    #[test]
    fn exact_terms_match_on_word_boundaries() {
        let terms = vec![Term {
            text: "cat".into(),
            exact: true,
        }];
        let prepared = prepare_terms(&terms, compile);
        let hit = entry("A Cat sat.", "");
        let miss = entry("concatenate", "");
        assert_eq!(
            eval_entry(&hit, &prepared, None, false, SearchIn::Question),
            Some(1)
        );
        assert_eq!(
            eval_entry(&miss, &prepared, None, false, SearchIn::Question),
            None
        );
    }

    #[test]
    fn cleaned_scan_tolerates_punctuation_drift() {
        let terms = vec![Term {
            text: "red car".into(),
            exact: false,
        }];
        let prepared = prepare_terms(&terms, compile);
        let drifted = entry("A red, car!", "");
        assert_eq!(
            eval_entry(&drifted, &prepared, None, false, SearchIn::Question),
            Some(1)
        );
    }

    #[test]
    fn exact_phrases_require_literal_adjacency() {
        // quoting the same phrase turns off the drift tolerance
        let terms = vec![Term {
            text: "red car".into(),
            exact: true,
        }];
        let prepared = prepare_terms(&terms, compile);
        let literal = entry("The red car is parked.", "");
        let drifted = entry("A red, car!", "");
        let split = entry("red wine in the car", "");
        assert_eq!(
            eval_entry(&literal, &prepared, None, false, SearchIn::Question),
            Some(1)
        );
        assert_eq!(
            eval_entry(&drifted, &prepared, None, false, SearchIn::Question),
            None
        );
        assert_eq!(
            eval_entry(&split, &prepared, None, false, SearchIn::Question),
            None
        );
    }

    #[test]
    fn symbolic_terms_match_literally() {
        let terms = vec![Term {
            text: "c++".into(),
            exact: false,
        }];
        let prepared = prepare_terms(&terms, compile);
        let hit = entry("I like C++ a lot", "");
        let miss = entry("plain c here", "");
        assert_eq!(
            eval_entry(&hit, &prepared, None, false, SearchIn::Question),
            Some(1)
        );
        assert_eq!(
            eval_entry(&miss, &prepared, None, false, SearchIn::Question),
            None
        );
    }

    #[test]
    fn verdict_table() {
        use SearchIn::*;
        assert_eq!(mode_verdict(Both, 0, 2, 0), (true, 2));
        assert_eq!(mode_verdict(Both, 0, 0, 0), (false, 0));
        assert_eq!(mode_verdict(Question, 0, 1, 5), (true, 1));
        assert_eq!(mode_verdict(Answer, 0, 5, 0), (false, 0));
        assert_eq!(mode_verdict(DualRequired, 0, 1, 1), (true, 2));
        assert_eq!(mode_verdict(DualRequired, 0, 1, 0), (false, 1));
        assert_eq!(mode_verdict(QuestionExclusive, 0, 2, 0), (true, 2));
        assert_eq!(mode_verdict(QuestionExclusive, 0, 2, 1), (false, 2));
        assert_eq!(mode_verdict(AnswerExclusive, 0, 0, 3), (true, 3));
        assert_eq!(mode_verdict(AnswerExclusive, 0, 1, 3), (false, 3));
        assert_eq!(mode_verdict(DateInclusive, 1, 0, 0), (true, 1));
        assert_eq!(mode_verdict(DateInclusive, 0, 0, 0), (false, 0));
    }

    #[test]
    fn xor_composes_left_to_right() {
        // (a != b) != c
        let e = Expr::Xor(
            Box::new(Expr::Xor(Box::new(Expr::Term(0)), Box::new(Expr::Term(1)))),
            Box::new(Expr::Term(2)),
        );
        assert_eq!(eval_expr(&e, &[true, true, true]), Some(true));
        assert_eq!(eval_expr(&e, &[true, false, true]), Some(false));
        assert_eq!(eval_expr(&e, &[false, false, false]), Some(false));
    }

    #[test]
    fn out_of_range_terms_read_as_anomalies() {
        let e = Expr::Term(7);
        assert_eq!(eval_expr(&e, &[true]), None);
        // short-circuit skips the bad index, like the host expression would
        let e = Expr::And(Box::new(Expr::Term(0)), Box::new(Expr::Term(7)));
        assert_eq!(eval_expr(&e, &[false]), Some(false));
        assert_eq!(eval_expr(&e, &[true]), None);
    }

    #[test]
    fn complex_entries_collect_all_terms() {
        let terms = vec![
            Term {
                text: "cat".into(),
                exact: false,
            },
            Term {
                text: "dog".into(),
                exact: false,
            },
        ];
        let prepared = prepare_terms(&terms, compile);
        let or = Expr::Or(Box::new(Expr::Term(0)), Box::new(Expr::Term(1)));
        let only_cat = entry("cat cat", "");
        assert_eq!(
            eval_entry(&only_cat, &prepared, Some(&or), true, SearchIn::Question),
            Some(2)
        );
        let neither = entry("bird", "");
        assert_eq!(
            eval_entry(&neither, &prepared, Some(&or), true, SearchIn::Question),
            None
        );
    }

    #[test]
    fn date_only_plans_pass_with_zero_count() {
        let e = entry("anything", "at all");
        assert_eq!(eval_entry(&e, &[], None, false, SearchIn::Both), Some(0));
    }

    #[test]
    fn date_counts_only_in_date_inclusive_mode() {
        let terms = vec![Term {
            text: "march".into(),
            exact: false,
        }];
        let prepared = prepare_terms(&terms, compile);
        let e = entry("no month here", "none here either");
        assert_eq!(
            eval_entry(&e, &prepared, None, false, SearchIn::Both),
            None
        );
        assert_eq!(
            eval_entry(&e, &prepared, None, false, SearchIn::DateInclusive),
            Some(1)
        );
    }
}
