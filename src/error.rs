//! The `^kind` error tag taxonomy.
//!
//! Hand-rolled enum with manual `Display`/`Error` impls, matching the
//! teacher's own `syntax::error::SyntaxError` rather than pulling in a
//! derive-macro error crate.

use std::error::Error;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KError {
    /// Operand kind mismatch (e.g. `_` applied to Nil).
    Type,
    /// Wrong arity for callable, or unary-only verb called binary and vice versa.
    Rank,
    /// Shape mismatch in zip/conform; out-of-range index in assignment.
    Length,
    /// Heterogeneous grade input; invalid numeric domain.
    Domain,
    /// Name not bound.
    Var,
    /// LHS of `:` is neither a name nor an indexing call.
    Assign,
    /// Operator slot empty for the requested arity.
    Nyi,
    /// Parser failed.
    Parse,
    /// File could not be opened.
    Io,
    /// Allocator could not satisfy a request.
    Oom,
}

impl KError {
    pub fn tag(self) -> &'static str {
        match self {
            KError::Type => "^type",
            KError::Rank => "^rank",
            KError::Length => "^length",
            KError::Domain => "^domain",
            KError::Var => "^var",
            KError::Assign => "^assign",
            KError::Nyi => "^nyi",
            KError::Parse => "^parse",
            KError::Io => "^io",
            KError::Oom => "^oom",
        }
    }
}

impl fmt::Display for KError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Error for KError {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tags() {
        assert_eq!(KError::Type.to_string(), "^type");
        assert_eq!(KError::Oom.to_string(), "^oom");
    }
}
