//! Error types raised by the combinator engine.
//!
//! Ordinary parse failure is not an error: it is the `Ok(None)` outcome of
//! evaluating a parser and is what alternation and repetition recover from.
//! The types here cover the two situations that must *not* be recovered:
//!
//! - [`ParseError`] aborts a parse in progress. It passes through every
//!   enclosing combinator (including alternation) via `?` and surfaces at the
//!   top-level caller.
//! - [`GrammarError`] is returned while a grammar is being constructed, before
//!   any input is touched.
//!
//! # Examples
//!
//! ```rust
//! # use parcom::ParseError;
//! let err = ParseError::BacktrackPastCut {
//!     target: 1,
//!     cut_point: 3,
//!     reason: "after opening bracket".into(),
//! };
//! assert!(err.to_string().contains("after opening bracket"));
//! ```

use smartstring::alias::String;
use thiserror::Error;

/// Fatal errors that abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The grammar asked the cursor to backtrack to `target`, which lies
    /// before an active cut placed at `cut_point`.
    #[error("cannot backtrack to position {target}: committed at {cut_point} ({reason})")]
    BacktrackPastCut {
        /// Position the cursor was asked to move back to.
        target: usize,
        /// Position of the active cut.
        cut_point: usize,
        /// Diagnostic reason recorded with the cut.
        reason: String,
    },

    /// A forward reference was evaluated but its rule was never defined or
    /// has already been dropped.
    #[error("rule {name:?} is not defined")]
    UnresolvedRule {
        /// Name given to the rule at declaration.
        name: String,
    },
}

/// Errors detected while building a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// An alternation or sequence was built from fewer than two children.
    #[error("{kind} needs at least 2 children, got {len}")]
    TooFewChildren {
        /// `"alternation"` or `"sequence"`.
        kind: &'static str,
        /// Number of children supplied.
        len: usize,
    },

    /// A literal sequence parser was requested for an empty input.
    #[error("literal sequence is empty")]
    EmptyLiteral,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn errors_are_send_sync_static() {
        _assert_send_sync_static::<ParseError>();
        _assert_send_sync_static::<GrammarError>();
    }

    #[test]
    fn backtrack_error_display() {
        let err = ParseError::BacktrackPastCut {
            target: 0,
            cut_point: 2,
            reason: "list body".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("position 0"));
        assert!(msg.contains("committed at 2"));
        assert!(msg.contains("list body"));
    }

    #[test]
    fn unresolved_rule_display() {
        let err = ParseError::UnresolvedRule { name: "expr".into() };
        assert_eq!(err.to_string(), "rule \"expr\" is not defined");
    }

    #[test]
    fn grammar_error_display() {
        let err = GrammarError::TooFewChildren {
            kind: "sequence",
            len: 1,
        };
        assert_eq!(err.to_string(), "sequence needs at least 2 children, got 1");
        assert_eq!(GrammarError::EmptyLiteral.to_string(), "literal sequence is empty");
    }
}
