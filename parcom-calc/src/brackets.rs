//! # Bracket matching
//!
//! Checks that `()`, `[]` and `{}` pairs nest properly and reports the
//! nesting depth:
//!
//! ```text
//! document := group*
//! group    := '(' group* ')' | '[' group* ']' | '{' group* '}'
//! ```
//!
//! Every opening bracket places a cut. Once a bracket is open, the only way
//! out is its matching closer, so a mismatch cannot be backtracked over and
//! aborts the parse with the cut's reason (for example `unclosed '['`).
//!
//! ```rust
//! # use parcom_calc::brackets;
//! assert_eq!(brackets::depth("([]{})").unwrap(), Some(2));
//! assert!(brackets::depth("([)]").is_err());
//! ```

use crate::CalcError;
use crate::nesting::{self, Nesting};
use parcom::{ParseOptions, Parser, Value, parse_with, recursive_named};
use std::sync::LazyLock;

/// Deepest bracket nesting [`depth`] accepts.
pub const MAX_DEPTH: usize = 64;

type P = Parser<char, usize>;

static GRAMMAR: LazyLock<P> = LazyLock::new(grammar);

fn deepest(v: &Value<char, usize>) -> usize {
    v.data_items().into_iter().copied().max().unwrap_or(0)
}

/// Builds the bracket grammar. Each group yields its depth; the document
/// yields the deepest group, or 0 when empty.
pub fn grammar() -> Parser<char, usize> {
    let group = recursive_named("group", |group: P| {
        let pair = |open: char, close: char, reason: &str| {
            P::literal(open)
                .cut(reason)
                .then(group.clone().zero_or_more())
                .then(P::literal(close))
                .map_data(|v| deepest(&v) + 1)
        };
        pair('(', ')', "unclosed '('")
            .or(pair('[', ']', "unclosed '['"))
            .or(pair('{', '}', "unclosed '{'"))
    });
    group.zero_or_more().map_data(|v| deepest(&v))
}

/// Returns the nesting depth of a balanced `text`.
///
/// `Ok(None)` means `text` holds something other than brackets or a stray
/// closer; an opener without its matching closer is an error, and so is
/// nesting deeper than [`MAX_DEPTH`].
pub fn depth(text: &str) -> Result<Option<usize>, CalcError> {
    nesting::check(text, MAX_DEPTH, |c| match c {
        '(' | '[' | '{' => Nesting::Open,
        ')' | ']' | '}' => Nesting::Close,
        _ => Nesting::Flat,
    })?;
    let input: Vec<char> = text.chars().collect();
    let parsed = parse_with(&*GRAMMAR, &input, ParseOptions::default().consume_all(true))?;
    Ok(parsed.value.and_then(Value::into_data))
}
