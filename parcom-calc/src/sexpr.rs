//! # S-expressions
//!
//! Reads Lisp-style s-expressions into an [`SExpr`] tree:
//!
//! ```text
//! document := ws (expr ws)*
//! expr     := list | atom
//! list     := '(' ws (expr ws)* ')'
//! atom     := (any char except whitespace, '(' and ')')+
//! ```
//!
//! Atoms that parse as `i64` become [`SExpr::Int`], all others
//! [`SExpr::Symbol`]. An opening parenthesis commits the parser to the list,
//! so a missing `)` is reported as `unclosed list` instead of a generic
//! mismatch.
//!
//! ```rust
//! # use parcom_calc::sexpr::{self, SExpr};
//! let e = sexpr::read("(add 1 (neg 2))").unwrap();
//! assert_eq!(e.to_string(), "(add 1 (neg 2))");
//! assert_eq!(sexpr::read("( )").unwrap(), SExpr::List(vec![]));
//! ```

use crate::CalcError;
use crate::nesting::{self, Nesting};
use parcom::{ParseOptions, Parser, Value, parse_with, recursive_named};
use smartstring::alias::String;
use std::fmt;
use std::sync::LazyLock;

/// Deepest list nesting [`read_all`] accepts.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExpr {
    Int(i64),
    Symbol(String),
    List(Vec<SExpr>),
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExpr::Int(n) => write!(f, "{n}"),
            SExpr::Symbol(s) => f.write_str(s),
            SExpr::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

type P = Parser<char, SExpr>;

static GRAMMAR: LazyLock<P> = LazyLock::new(grammar);

fn ws() -> P {
    P::element(|c: &char| c.is_whitespace()).zero_or_more()
}

fn is_delimiter(c: &char) -> bool {
    c.is_whitespace() || *c == '(' || *c == ')'
}

fn children(v: &Value<char, SExpr>) -> Vec<SExpr> {
    v.data_items().into_iter().cloned().collect()
}

fn expr() -> P {
    let atom = P::element(|c: &char| !is_delimiter(c))
        .one_or_more()
        .map_data(|v| {
            let text = v.text();
            match text.parse::<i64>() {
                Ok(n) => SExpr::Int(n),
                Err(_) => SExpr::Symbol(text.into()),
            }
        });
    recursive_named("expr", |expr: P| {
        let list = P::literal('(')
            .cut("unclosed list")
            .then(ws())
            .then(expr.then(ws()).zero_or_more())
            .then(P::literal(')'))
            .map_data(|v| SExpr::List(children(&v)));
        list.or(atom)
    })
}

/// Parser for a whole document: any number of expressions separated and
/// surrounded by whitespace. Yields one [`SExpr::List`] of the expressions.
pub fn grammar() -> Parser<char, SExpr> {
    ws().then(expr().then(ws()).zero_or_more())
        .map_data(|v| SExpr::List(children(&v)))
}

/// Reads every expression in `text`. Lists nested deeper than
/// [`MAX_DEPTH`] are refused with [`CalcError::TooDeep`].
pub fn read_all(text: &str) -> Result<Vec<SExpr>, CalcError> {
    nesting::check(text, MAX_DEPTH, |c| match c {
        '(' => Nesting::Open,
        ')' => Nesting::Close,
        _ => Nesting::Flat,
    })?;
    let input: Vec<char> = text.chars().collect();
    let parsed = parse_with(&*GRAMMAR, &input, ParseOptions::default().consume_all(true))?;
    match parsed.value.and_then(Value::into_data) {
        Some(SExpr::List(items)) => Ok(items),
        _ => Err(CalcError::Syntax(text.into())),
    }
}

/// Reads exactly one expression from `text`.
pub fn read(text: &str) -> Result<SExpr, CalcError> {
    let mut items = read_all(text)?;
    match items.len() {
        1 => Ok(items.remove(0)),
        _ => Err(CalcError::Syntax(text.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sym(s: &str) -> SExpr {
        SExpr::Symbol(s.into())
    }

    #[test]
    fn atoms() {
        assert_eq!(read("42").unwrap(), SExpr::Int(42));
        assert_eq!(read("-7").unwrap(), SExpr::Int(-7));
        assert_eq!(read("foo-bar").unwrap(), sym("foo-bar"));
        assert_eq!(read("  x  ").unwrap(), sym("x"));
    }

    #[test]
    fn empty_list_consumes_all() {
        init_logger();
        assert_eq!(read("( )").unwrap(), SExpr::List(vec![]));
        assert_eq!(read("()").unwrap(), SExpr::List(vec![]));
    }

    #[test]
    fn nested_lists() {
        init_logger();
        let e = read("(define (sq x) (* x x))").unwrap();
        assert_eq!(
            e,
            SExpr::List(vec![
                sym("define"),
                SExpr::List(vec![sym("sq"), sym("x")]),
                SExpr::List(vec![sym("*"), sym("x"), sym("x")]),
            ])
        );
        assert_eq!(e.to_string(), "(define (sq x) (* x x))");
    }

    #[test]
    fn several_documents() {
        let all = read_all(" 1 (a) b\n(c (d))\t").unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].to_string(), "(c (d))");
        assert!(read_all("").unwrap().is_empty());
        assert!(matches!(read("1 2"), Err(CalcError::Syntax(_))));
    }

    #[test]
    fn unclosed_list_is_committed() {
        let err = read("(a (b c)").unwrap_err();
        assert!(matches!(err, CalcError::Parse(_)));
        assert!(err.to_string().contains("unclosed list"), "{err}");
    }

    #[test]
    fn deep_lists_are_refused_before_parsing() {
        init_logger();
        let text = format!("{}x{}", "(".repeat(5_000), ")".repeat(5_000));
        assert!(matches!(read(&text), Err(CalcError::TooDeep { limit: MAX_DEPTH })));
        // many shallow lists in a row are fine
        assert_eq!(read_all(&"(a) ".repeat(1_000)).unwrap().len(), 1_000);
    }

    #[test]
    fn stray_closer_is_syntax_error() {
        assert!(matches!(read(")"), Err(CalcError::Syntax(_))));
        assert!(matches!(read("(a))"), Err(CalcError::Syntax(_))));
    }
}
