use crate::query::Term;
use crate::types::{clean_text, is_word_char};
use regex::Regex;

pub(crate) const HIGHLIGHT_OPEN: &str = "<span class=\"highlight\">";
pub(crate) const HIGHLIGHT_CLOSE: &str = "</span>";

/// Escaped literal with word-boundary anchors on whichever ends start/stop
/// with a word character. ASCII boundaries keep behavior stable next to
/// non-ASCII text.
pub(crate) fn boundary_pattern(text: &str) -> String {
    let escaped = regex::escape(text);
    let mut pattern = String::with_capacity(escaped.len() + 16);
    if text.chars().next().map(is_word_char).unwrap_or(false) {
        pattern.push_str(r"(?-u:\b)");
    }
    pattern.push_str(&escaped);
    if text.chars().last().map(is_word_char).unwrap_or(false) {
        pattern.push_str(r"(?-u:\b)");
    }
    pattern
}

/// Combines every term into one alternation pattern, or `None` when no term
/// yields a usable sub-pattern. Exact terms contribute their boundary
/// literal; other terms contribute their cleaned pieces joined by a
/// separator spanning whatever non-word characters the source text used.
pub(crate) fn term_alternation(terms: &[Term]) -> Option<String> {
    let mut subs: Vec<String> = Vec::new();
    for term in terms {
        if term.exact {
            subs.push(boundary_pattern(&term.text));
            continue;
        }
        let cleaned = clean_text(&term.text);
        if cleaned.is_empty() {
            continue;
        }
        let pieces: Vec<String> = cleaned.split_whitespace().map(|p| regex::escape(p)).collect();
        // complement of is_word_char; \W would be Unicode-aware here
        subs.push(pieces.join("[^0-9A-Za-z_]+"));
    }
    if subs.is_empty() {
        return None;
    }
    Some(format!("(?i)(?:{})", subs.join("|")))
}

/// Wraps every match in the highlight span, except candidates sitting inside
/// an HTML tag delimiter sequence (a `>` ahead with no `<` in between);
/// those are emitted unmarked.
pub(crate) fn decorate(text: &str, pattern: &Regex) -> String {
    decorate_matches(text, pattern, true)
}

/// Raw-pattern decoration: a plain global pass, no tag guard.
pub(crate) fn decorate_raw(text: &str, pattern: &Regex) -> String {
    decorate_matches(text, pattern, false)
}

fn decorate_matches(text: &str, pattern: &Regex, guard: bool) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    let mut last = 0;
    for m in pattern.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        if guard && inside_tag(text, m.end()) {
            out.push_str(m.as_str());
        } else {
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(m.as_str());
            out.push_str(HIGHLIGHT_CLOSE);
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// True when the first angle bracket at or after `from` is a closing `>`,
/// i.e. the position is inside a tag delimiter sequence.
fn inside_tag(text: &str, from: usize) -> bool {
    for c in text[from..].chars() {
        match c {
            '>' => return true,
            '<' => return false,
            _ => {}
        }
    }
    false
}
