//! # parcom
//!
//! Backtracking parser combinators over arbitrary element sequences, with
//! cuts and packrat memoization.
//!
//! A grammar is a graph of shared, immutable [`Parser`] nodes built from a
//! handful of primitives and combinators. Running it against a [`Cursor`]
//! walks the graph top-down; each node reads and moves the cursor and returns
//! `Ok(Some(value))` on a match, `Ok(None)` on ordinary failure, or
//! `Err(ParseError)` when the parse must stop.
//!
//! ## Overview
//!
//! - [`cursor`] — the mutable position, cut state and memo table of one
//!   parse, plus [`ParseOptions`] and [`CursorStats`].
//! - [`parser`] — parser nodes and combinators: matching, ordered choice,
//!   sequencing, repetition, transforms, cuts, memoization, lookahead,
//!   guards and lifecycle hooks.
//! - [`rule`] — forward-declared rules for recursive grammars.
//! - [`value`] — the [`Value`] produced by a successful parse.
//! - [`error`] — [`ParseError`] and [`GrammarError`].
//!
//! ## Semantics in brief
//!
//! - Alternation is ordered choice: the cursor is reset to the start before
//!   each alternative and the first match wins.
//! - Sequences do not rewind when a child fails.
//! - [`Parser::cut`] commits the parse: resetting the cursor before the cut
//!   afterwards raises [`ParseError::BacktrackPastCut`], which no alternation
//!   absorbs.
//! - [`Parser::memoize`] caches results per node and start position for the
//!   lifetime of one cursor.
//!
//! ## Example
//!
//! ```rust
//! use parcom::{Parser, Value, parse_str, recursive};
//!
//! type P = Parser<char, i64>;
//!
//! let digit = P::element(|c: &char| c.is_ascii_digit());
//! let number = digit
//!     .one_or_more()
//!     .map_data(|v| v.text().parse().unwrap_or_default());
//!
//! // sum := number '+' sum | number
//! let sum = recursive(|sum: P| {
//!     number
//!         .clone()
//!         .then(P::literal('+'))
//!         .then(sum)
//!         .map_data(|v| {
//!             let items = v.into_list();
//!             items[0].as_data().copied().unwrap_or_default()
//!                 + items[2].as_data().copied().unwrap_or_default()
//!         })
//!         .or(number.clone())
//!         .memoize()
//! });
//!
//! assert_eq!(parse_str(&sum, "2+3+4").unwrap(), Some(Value::Data(9)));
//! assert_eq!(parse_str(&sum, "+").unwrap(), None);
//! ```

pub mod cursor;
pub mod error;
pub mod parser;
pub mod rule;
pub mod value;

pub use crate::cursor::{Cursor, CursorStats, ParseOptions};
pub use crate::error::{GrammarError, ParseError};
pub use crate::parser::{NodeId, ParseResult, Parsed, Parser, parse, parse_str, parse_with};
pub use crate::rule::{Rule, recursive, recursive_named};
pub use crate::value::Value;
