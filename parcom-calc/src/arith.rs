//! # Arithmetic expressions
//!
//! Integer expressions with `+`, `*`, parentheses and optional whitespace:
//!
//! ```text
//! expr           := ws additive
//! additive       := multiplicative '+' additive | multiplicative
//! multiplicative := primary '*' multiplicative | primary
//! primary        := number | '(' additive ')'
//! number         := '-'? digit+
//! ```
//!
//! Both binary rules are right-recursive, so `2+3+4` groups as `2+(3+4)`.
//! Each rule retries its first operand in the second alternative; the
//! operands are memoized, so the retry is a cache hit instead of a re-parse.
//!
//! Right recursion means every operator, as well as every parenthesis, adds a
//! level of nesting until its enclosing group closes. Input deeper than
//! [`MAX_DEPTH`] levels is refused with [`CalcError::TooDeep`].
//!
//! ```rust
//! # use parcom_calc::arith;
//! assert_eq!(arith::eval("2 * (3 + 4)").unwrap(), 14);
//! ```

use crate::CalcError;
use crate::nesting::{self, Nesting};
use parcom::{ParseOptions, Parsed, Parser, Rule, Value, parse_with, recursive_named};
use smartstring::alias::String;
use std::sync::LazyLock;

/// Syntax tree of an arithmetic expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal, kept as text until evaluation.
    Num(String),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluates the tree with overflow checking.
    pub fn eval(&self) -> Result<i64, CalcError> {
        match self {
            Expr::Num(digits) => Ok(digits.parse()?),
            Expr::Add(a, b) => {
                let (x, y) = (a.eval()?, b.eval()?);
                x.checked_add(y)
                    .ok_or_else(|| CalcError::Overflow(format!("{x} + {y}").into()))
            }
            Expr::Mul(a, b) => {
                let (x, y) = (a.eval()?, b.eval()?);
                x.checked_mul(y)
                    .ok_or_else(|| CalcError::Overflow(format!("{x} * {y}").into()))
            }
        }
    }
}

/// Deepest nesting of parentheses and operators the parser accepts.
pub const MAX_DEPTH: usize = 32;

type P = Parser<char, Expr>;

static GRAMMAR: LazyLock<P> = LazyLock::new(grammar);

fn ws() -> P {
    P::element(|c: &char| c.is_whitespace()).zero_or_more()
}

/// `p` followed by optional whitespace, keeping `p`'s result.
fn lexeme(p: P) -> P {
    p.then(ws())
        .map(|v| v.into_list().into_iter().next().unwrap_or(Value::Nothing))
}

fn symbol(c: char) -> P {
    lexeme(P::literal(c))
}

/// Combines the first and third item of `lhs op rhs`.
fn binary(v: Value<char, Expr>, op: fn(Box<Expr>, Box<Expr>) -> Expr) -> Value<char, Expr> {
    let mut items = v.into_list().into_iter();
    let lhs = items.next().and_then(Value::into_data);
    let rhs = items.nth(1).and_then(Value::into_data);
    match (lhs, rhs) {
        (Some(a), Some(b)) => Value::Data(op(Box::new(a), Box::new(b))),
        _ => Value::Nothing,
    }
}

fn second(v: Value<char, Expr>) -> Value<char, Expr> {
    v.into_list().into_iter().nth(1).unwrap_or(Value::Nothing)
}

/// Builds the expression grammar. The parser accepts leading whitespace and
/// stops after the last token; use [`parse`] to require the whole input.
pub fn grammar() -> Parser<char, Expr> {
    let additive = Rule::declare("additive");

    let digits = P::element(|c: &char| c.is_ascii_digit()).one_or_more();
    let number = lexeme(
        P::literal('-')
            .zero_or_one()
            .then(digits)
            .map_data(|v| Expr::Num(v.text().into())),
    );
    let parens = symbol('(')
        .then(additive.reference())
        .then(symbol(')'))
        .map(second);
    let primary = number.or(parens).memoize();

    let multiplicative = recursive_named("multiplicative", |mul: P| {
        primary
            .clone()
            .then(symbol('*'))
            .then(mul)
            .map(|v| binary(v, Expr::Mul))
            .or(primary.clone())
            .memoize()
    });

    let sum = multiplicative
        .clone()
        .then(symbol('+'))
        .then(additive.reference())
        .map(|v| binary(v, Expr::Add))
        .or(multiplicative)
        .memoize();
    let additive = additive.define(sum);

    ws().then(additive).map(second)
}

/// Parses `text` completely into an [`Expr`], returning the raw parse
/// statistics alongside.
pub fn parse_with_stats(text: &str) -> Result<(Expr, Parsed<char, Expr>), CalcError> {
    nesting::check(text, MAX_DEPTH, |c| match c {
        '(' => Nesting::Open,
        ')' => Nesting::Close,
        '+' | '*' => Nesting::Step,
        _ => Nesting::Flat,
    })?;
    let input: Vec<char> = text.chars().collect();
    let parsed = parse_with(&*GRAMMAR, &input, ParseOptions::default().consume_all(true))?;
    log::debug!("arith {:?}: {:?}", text, parsed.stats);
    match parsed.value.clone().and_then(Value::into_data) {
        Some(expr) => Ok((expr, parsed)),
        None => Err(CalcError::Syntax(text.into())),
    }
}

/// Parses `text` completely into an [`Expr`].
pub fn parse(text: &str) -> Result<Expr, CalcError> {
    parse_with_stats(text).map(|(expr, _)| expr)
}

/// Parses and evaluates `text`.
pub fn eval(text: &str) -> Result<i64, CalcError> {
    parse(text)?.eval()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn num(s: &str) -> Box<Expr> {
        Box::new(Expr::Num(s.into()))
    }

    #[test]
    fn addition_groups_right() {
        init_logger();
        let expr = parse("2+3+4").unwrap();
        assert_eq!(
            expr,
            Expr::Add(num("2"), Box::new(Expr::Add(num("3"), num("4"))))
        );
        assert_eq!(expr.eval().unwrap(), 9);
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(eval("1+2*3").unwrap(), 7);
        assert_eq!(eval("(1+2)*3").unwrap(), 9);
        assert_eq!(eval(" 2 * ( 3 + 4 ) ").unwrap(), 14);
        assert_eq!(eval("((7))").unwrap(), 7);
        assert_eq!(eval("-5*2").unwrap(), -10);
    }

    #[test]
    fn numeral() {
        assert_eq!(parse("101").unwrap(), Expr::Num("101".into()));
        assert_eq!(eval("101").unwrap(), 101);
    }

    #[test]
    fn syntax_errors() {
        for text in ["", "1+", "*2", "(1", "1)", "2-3", "1 2"] {
            let err = parse(text).unwrap_err();
            assert!(matches!(err, CalcError::Syntax(_)), "{text}: {err}");
        }
    }

    #[test]
    fn evaluation_errors() {
        let err = eval("9223372036854775807 + 1").unwrap_err();
        assert!(matches!(err, CalcError::Overflow(_)));
        let err = eval("99999999999999999999").unwrap_err();
        assert!(matches!(err, CalcError::ParseInt(_)));
    }

    #[test]
    fn deep_input_is_refused_before_parsing() {
        init_logger();
        let n = 2_000;
        let text = format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert!(matches!(parse(&text), Err(CalcError::TooDeep { limit: MAX_DEPTH })));

        let long_sum = vec!["1"; n].join("+");
        assert!(matches!(eval(&long_sum), Err(CalcError::TooDeep { .. })));

        assert_eq!(eval("((((1))))").unwrap(), 1);
        assert_eq!(eval(&vec!["2"; 4].join("*")).unwrap(), 16);
    }

    #[test]
    fn retried_operands_come_from_the_memo() {
        init_logger();
        let (_, parsed) = parse_with_stats("1*2+3*4").unwrap();
        assert_eq!(parsed.position, 7);
        assert!(parsed.stats.memo_hits > 0);
    }
}
