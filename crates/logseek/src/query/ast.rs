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

use std::fmt;

/// One searchable unit of a query: a single word or a multi-word phrase
/// assembled from adjacent tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    /// Quoted terms (and terms whose text appears quoted in the query)
    /// match on word boundaries instead of by substring.
    pub exact: bool,
}

/// Boolean structure of a parsed query. `Term` holds an index into the
/// plan's term list; operators pair sub-expressions.
///
/// `Xor` evaluates as "not equal"; chains compose left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(usize),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// True when the expression contains `Or` or `Xor` anywhere; such
    /// queries need every term evaluated before combining.
    pub fn is_complex(&self) -> bool {
        match self {
            Expr::Term(_) => false,
            Expr::And(a, b) => a.is_complex() || b.is_complex(),
            Expr::Or(_, _) | Expr::Xor(_, _) => true,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(i) => write!(f, "T{}", i),
            Expr::And(a, b) => write!(f, "(AND {} {})", a, b),
            Expr::Or(a, b) => write!(f, "(OR {} {})", a, b),
            Expr::Xor(a, b) => write!(f, "(XOR {} {})", a, b),
        }
    }
}
