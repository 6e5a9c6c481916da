use std::error::Error;
use std::fmt::{self, Display};

/// Query-level failures. The `Display` text is the user-facing response
/// message; callers compare message content, not error codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query was empty or whitespace.
    Empty,
    /// The parser could not build a well-formed expression.
    Syntax,
    /// The raw pattern after `REGEX=` did not compile.
    BadPattern,
    /// A date directive value normalized to fewer than 4 digits.
    ShortDate,
    /// A `range:` directive was missing its second bound.
    OpenRange,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Empty => write!(f, "Empty query."),
            QueryError::Syntax => write!(f, "Invalid query syntax."),
            QueryError::BadPattern => write!(f, "Invalid regex."),
            QueryError::ShortDate => write!(f, "Invalid date: need at least 4 digits."),
            QueryError::OpenRange => write!(f, "Invalid range: expected start..end."),
        }
    }
}

impl Error for QueryError {}
