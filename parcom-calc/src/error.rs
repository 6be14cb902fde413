//! # Demo Error Type
//!
//! [`CalcError`] aggregates failures from the example grammars:
//!
//! - **Syntax** (the grammar did not match the input),
//! - **Committed parse errors** raised by a cut ([`ParseError`]),
//! - **Numeric parsing** (digits → integer),
//! - **Arithmetic overflow** while evaluating,
//! - **Nesting limits** refusing input too deep to parse safely.
//!
//! Conversions from underlying error types are derived with `#[from]`, so
//! functions returning `Result<T, CalcError>` can use `?` directly.
use parcom::ParseError;
use smartstring::alias::String;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    /// The input does not match the grammar.
    #[error("syntax error in {0:?}")]
    Syntax(String),

    /// The parse was aborted by a violated commitment.
    ///
    /// Wraps a [`ParseError`], whose message carries the cut reason.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An integer literal could not be parsed from its digits.
    #[error("unable to parse {0:?}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// The result of an operation does not fit in an `i64`.
    #[error("overflow evaluating {0}")]
    Overflow(String),

    /// The input nests deeper than the grammar accepts.
    #[error("input nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_maps_to_calc_error() {
        let res: Result<i64, CalcError> = "99999999999999999999".parse::<i64>().map_err(CalcError::from);
        let err = res.unwrap_err();
        assert!(matches!(err, CalcError::ParseInt(_)));
        assert!(err.to_string().contains("unable to parse"));
    }

    #[test]
    fn parse_error_maps_to_calc_error() {
        let underlying = ParseError::BacktrackPastCut {
            target: 0,
            cut_point: 1,
            reason: "unclosed '('".into(),
        };
        let err: CalcError = underlying.into();
        assert!(matches!(err, CalcError::Parse(_)));
        assert!(err.to_string().contains("unclosed '('"));
    }

    #[test]
    fn too_deep_names_the_limit() {
        let err = CalcError::TooDeep { limit: 64 };
        assert_eq!(err.to_string(), "input nested deeper than 64 levels");
    }

    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}
    #[test]
    fn calc_error_is_send_sync_static() {
        _assert_send_sync_static::<CalcError>();
    }
}
