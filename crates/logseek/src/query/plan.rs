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

use super::ast::{Expr, Term};
use super::dates::{extract_date_filter, DateFilter};
use super::error::QueryError;

/// Punctuation stripped from the ends of unquoted tokens.
const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}'];

/// A fully parsed query, ready to run against the store.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub terms: Vec<Term>,
    /// Boolean structure over term indices. `None` for raw-pattern and
    /// date-only plans.
    pub expr: Option<Expr>,
    pub date: Option<DateFilter>,
    /// Set when the query began with `REGEX=`; the remainder is used as a
    /// pattern verbatim and nothing else is parsed.
    pub raw_pattern: Option<String>,
    pub is_complex: bool,
}

impl QueryPlan {
    /// Parses a query string. Errors carry the user-facing message.
    pub fn parse(query: &str) -> Result<QueryPlan, QueryError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        if let Some(pattern) = trimmed.strip_prefix("REGEX=") {
            return Ok(QueryPlan {
                terms: Vec::new(),
                expr: None,
                date: None,
                raw_pattern: Some(pattern.to_string()),
                is_complex: false,
            });
        }
        let extraction = extract_date_filter(trimmed)?;
        let rest = extraction.remainder.trim().to_string();
        if rest.is_empty() {
            // date-only query: every date-passing entry matches with count 0
            return Ok(QueryPlan {
                terms: Vec::new(),
                expr: None,
                date: extraction.filter,
                raw_pattern: None,
                is_complex: false,
            });
        }
        let (terms, expr) = parse_boolean(&rest)?;
        let is_complex = expr.is_complex();
        Ok(QueryPlan {
            terms,
            expr: Some(expr),
            date: extraction.filter,
            raw_pattern: None,
            is_complex,
        })
    }
}

struct RawToken {
    text: String,
    quoted: bool,
}

/// Scans left to right for double-quoted spans, single-quoted spans, or
/// maximal runs of other non-whitespace characters, in that priority. An
/// empty quoted span produces no token; an unmatched quote is skipped.
fn tokenize(input: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < input.len() {
        let Some(c) = input[i..].chars().next() else {
            break;
        };
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }
        if c == '"' || c == '\'' {
            let after = i + 1;
            match input[after..].find(c) {
                Some(j) => {
                    let span = &input[after..after + j];
                    if !span.is_empty() {
                        tokens.push(RawToken {
                            text: span.to_string(),
                            quoted: true,
                        });
                    }
                    i = after + j + 1;
                }
                None => {
                    i = after;
                }
            }
            continue;
        }
        let start = i;
        let mut end = i;
        for (off, ch) in input[i..].char_indices() {
            if ch.is_whitespace() || ch == '"' || ch == '\'' {
                break;
            }
            end = i + off + ch.len_utf8();
        }
        tokens.push(RawToken {
            text: input[start..end].to_string(),
            quoted: false,
        });
        i = end;
    }
    tokens
}

fn trim_punctuation(token: &str) -> &str {
    let trimmed = token.trim_matches(PUNCTUATION);
    if trimmed.is_empty() {
        token
    } else {
        trimmed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PTok {
    Term(usize),
    And,
    Or,
    Xor,
    Open,
    Close,
}

struct Draft {
    text: String,
    explicit_quote: bool,
}

/// Builds the term list and boolean expression from a query remainder.
fn parse_boolean(source: &str) -> Result<(Vec<Term>, Expr), QueryError> {
    let mut drafts: Vec<Draft> = Vec::new();
    let mut ptoks: Vec<PTok> = Vec::new();

    for tok in tokenize(source) {
        if !tok.quoted {
            match tok.text.as_str() {
                "AND" => {
                    ptoks.push(PTok::And);
                    continue;
                }
                "OR" => {
                    ptoks.push(PTok::Or);
                    continue;
                }
                "XOR" => {
                    ptoks.push(PTok::Xor);
                    continue;
                }
                "(" => {
                    ptoks.push(PTok::Open);
                    continue;
                }
                ")" => {
                    ptoks.push(PTok::Close);
                    continue;
                }
                _ => {}
            }
        }
        let text = if tok.quoted {
            tok.text
        } else {
            trim_punctuation(&tok.text).to_string()
        };
        // A term token directly after another term token extends it into a
        // multi-word phrase.
        if let Some(&PTok::Term(idx)) = ptoks.last() {
            let draft = &mut drafts[idx];
            draft.text.push(' ');
            draft.text.push_str(&text);
            if tok.quoted {
                draft.explicit_quote = true;
            }
        } else {
            drafts.push(Draft {
                text,
                explicit_quote: tok.quoted,
            });
            ptoks.push(PTok::Term(drafts.len() - 1));
        }
    }

    if drafts.is_empty() {
        return Err(QueryError::Syntax);
    }

    let terms: Vec<Term> = drafts
        .into_iter()
        .map(|d| {
            let exact = d.explicit_quote
                || source.contains(&format!("\"{}\"", d.text))
                || source.contains(&format!("'{}'", d.text));
            Term {
                text: d.text,
                exact,
            }
        })
        .collect();

    let expr = ExprParser::parse(&ptoks)?;
    Ok((terms, expr))
}

/// Recursive descent over the token stream. Precedence, loosest first:
/// `OR`, `AND`, `XOR`; all left-associative, parentheses grouping.
struct ExprParser<'a> {
    toks: &'a [PTok],
    pos: usize,
}

impl ExprParser<'_> {
    fn parse(toks: &[PTok]) -> Result<Expr, QueryError> {
        let mut parser = ExprParser { toks, pos: 0 };
        let expr = parser.parse_or()?;
        if parser.pos != toks.len() {
            return Err(QueryError::Syntax);
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_and()?;
        while self.eat(PTok::Or) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_xor()?;
        while self.eat(PTok::And) {
            let right = self.parse_xor()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_xor(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_primary()?;
        while self.eat(PTok::Xor) {
            let right = self.parse_primary()?;
            left = Expr::Xor(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        match self.advance() {
            Some(PTok::Term(i)) => Ok(Expr::Term(i)),
            Some(PTok::Open) => {
                let inner = self.parse_or()?;
                if !self.eat(PTok::Close) {
                    return Err(QueryError::Syntax);
                }
                Ok(inner)
            }
            _ => Err(QueryError::Syntax),
        }
    }

    fn advance(&mut self) -> Option<PTok> {
        let tok = self.toks.get(self.pos).copied();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: PTok) -> bool {
        if self.toks.get(self.pos) == Some(&tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(q: &str) -> QueryPlan {
        QueryPlan::parse(q).unwrap()
    }

    fn term_texts(p: &QueryPlan) -> Vec<&str> {
        p.terms.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn bare_words_merge_into_one_phrase_term() {
        let p = plan("red car");
        assert_eq!(term_texts(&p), vec!["red car"]);
        assert!(!p.terms[0].exact);
        assert_eq!(p.expr.as_ref().map(|e| e.to_string()), Some("T0".into()));
        assert!(!p.is_complex);
    }

    #[test]
    fn operators_split_terms() {
        let p = plan("cat AND dog");
        assert_eq!(term_texts(&p), vec!["cat", "dog"]);
        assert_eq!(
            p.expr.as_ref().map(|e| e.to_string()),
            Some("(AND T0 T1)".into())
        );
        assert!(!p.is_complex);
    }

    #[test]
    fn or_and_xor_mark_complex() {
        assert!(plan("cat OR dog").is_complex);
        assert!(plan("cat XOR dog").is_complex);
        assert!(!plan("cat AND dog").is_complex);
    }

    #[test]
    fn precedence_or_loosest_xor_tightest() {
        let p = plan("a OR b AND c");
        assert_eq!(
            p.expr.as_ref().map(|e| e.to_string()),
            Some("(OR T0 (AND T1 T2))".into())
        );
        let p = plan("a AND b XOR c");
        assert_eq!(
            p.expr.as_ref().map(|e| e.to_string()),
            Some("(AND T0 (XOR T1 T2))".into())
        );
        let p = plan("a XOR b XOR c");
        assert_eq!(
            p.expr.as_ref().map(|e| e.to_string()),
            Some("(XOR (XOR T0 T1) T2)".into())
        );
    }

    #[test]
    fn parentheses_group() {
        let p = plan("( a OR b ) AND c");
        assert_eq!(
            p.expr.as_ref().map(|e| e.to_string()),
            Some("(AND (OR T0 T1) T2)".into())
        );
    }

    #[test]
    fn quoted_terms_are_exact() {
        let p = plan("\"red car\"");
        assert_eq!(term_texts(&p), vec!["red car"]);
        assert!(p.terms[0].exact);
        let p = plan("'red car' AND dog");
        assert!(p.terms[0].exact);
        assert!(!p.terms[1].exact);
    }

    #[test]
    fn quoted_continuation_marks_whole_term_exact() {
        let p = plan("red 'car'");
        assert_eq!(term_texts(&p), vec!["red car"]);
        assert!(p.terms[0].exact);
    }

    #[test]
    fn quoted_operators_are_terms() {
        let p = plan("'AND'");
        assert_eq!(term_texts(&p), vec!["AND"]);
        let p = plan("cat 'OR' dog");
        assert_eq!(term_texts(&p), vec!["cat OR dog"]);
    }

    #[test]
    fn lowercase_operators_are_terms() {
        let p = plan("cat and dog");
        assert_eq!(term_texts(&p), vec!["cat and dog"]);
    }

    #[test]
    fn punctuation_is_trimmed_from_bare_tokens() {
        let p = plan("(cat), dog!");
        assert_eq!(term_texts(&p), vec!["cat dog"]);
        // attached parens are token punctuation, not grouping
        assert!(!p.is_complex);
    }

    #[test]
    fn all_punctuation_tokens_survive_trimming() {
        let p = plan("...");
        assert_eq!(term_texts(&p), vec!["..."]);
    }

    #[test]
    fn empty_quotes_are_dropped() {
        let p = plan("'' cat");
        assert_eq!(term_texts(&p), vec!["cat"]);
        assert!(matches!(QueryPlan::parse("\"\""), Err(QueryError::Syntax)));
    }

    #[test]
    fn unmatched_quote_is_skipped() {
        let p = plan("don't panic");
        assert_eq!(term_texts(&p), vec!["don t panic"]);
    }

    #[test]
    fn syntax_errors() {
        for q in [
            "AND",
            "cat AND",
            "AND cat",
            "cat AND AND dog",
            "( cat",
            "cat )",
            "( )",
            "cat ( dog )",
            "( a AND b ) c",
        ] {
            assert!(
                matches!(QueryPlan::parse(q), Err(QueryError::Syntax)),
                "expected syntax error for {q:?}"
            );
        }
    }

    #[test]
    fn empty_queries_are_rejected() {
        assert!(matches!(QueryPlan::parse(""), Err(QueryError::Empty)));
        assert!(matches!(QueryPlan::parse("   "), Err(QueryError::Empty)));
    }

    #[test]
    fn raw_pattern_mode_skips_all_parsing() {
        let p = plan("REGEX=cat|dog before:2020");
        assert_eq!(p.raw_pattern.as_deref(), Some("cat|dog before:2020"));
        assert!(p.terms.is_empty());
        assert!(p.date.is_none());
    }

    #[test]
    fn date_directive_is_extracted_from_boolean_queries() {
        let p = plan("cat before:2020");
        assert_eq!(term_texts(&p), vec!["cat"]);
        assert!(p.date.is_some());
    }

    #[test]
    fn date_only_queries_plan_with_no_terms() {
        let p = plan("before:2020");
        assert!(p.terms.is_empty());
        assert!(p.expr.is_none());
        assert!(p.date.is_some());
    }

    #[test]
    fn invalid_dates_reject_the_query() {
        assert!(matches!(
            QueryPlan::parse("cat before:20"),
            Err(QueryError::ShortDate)
        ));
        assert!(matches!(
            QueryPlan::parse("cat range:2019"),
            Err(QueryError::OpenRange)
        ));
    }
}
