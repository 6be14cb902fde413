//! # parcom-calc
//!
//! Example grammars built on **parcom**. The crate contains no engine logic;
//! each module is ordinary client code that assembles parsers from the
//! combinator API and turns results into its own data types.
//!
//! ## Modules
//!
//! - [`arith`] — integer arithmetic with `+`, `*` and parentheses, written
//!   right-recursively and memoized.
//! - [`brackets`] — nested `()`, `[]`, `{}` matching with cuts for
//!   diagnosable mismatches.
//! - [`sexpr`] — an s-expression reader.
//! - [`error`] — [`CalcError`], the error surface shared by all three.
//!
//! Every grammar recurses once per nesting level, so each entry point refuses
//! input nested deeper than its module's `MAX_DEPTH` with
//! [`CalcError::TooDeep`] before parsing.
//!
//! ## Example
//!
//! ```rust
//! use parcom_calc::{arith, brackets, sexpr};
//!
//! assert_eq!(arith::eval("2+3+4").unwrap(), 9);
//! assert_eq!(brackets::depth("[[]]").unwrap(), Some(2));
//! assert_eq!(sexpr::read("(a b)").unwrap().to_string(), "(a b)");
//! ```
pub mod arith;
pub mod brackets;
pub mod error;
mod nesting;
pub mod sexpr;

pub use arith::Expr;
pub use error::CalcError;
pub use sexpr::SExpr;
