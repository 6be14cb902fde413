//! # Nesting limits
//!
//! The example grammars recurse once per nesting level of their input, and
//! every level costs a handful of stack frames. Input that nests deeply
//! enough would exhaust the stack before the parser could fail, so each entry
//! point measures its input with [`check`] and refuses anything deeper than
//! its limit with [`CalcError::TooDeep`].

use crate::CalcError;

/// Effect of one character on the recursion depth of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nesting {
    /// Opens a level that the matching [`Nesting::Close`] leaves again.
    Open,
    Close,
    /// Recurses once more until the enclosing level closes, like a
    /// right-recursive operator.
    Step,
    Flat,
}

/// Deepest recursion `text` can cause, stopping early once `limit` is
/// exceeded.
pub(crate) fn depth(text: &str, limit: usize, classify: impl Fn(char) -> Nesting) -> usize {
    let mut levels = Vec::new();
    let mut current = 0usize;
    let mut deepest = 0usize;
    for c in text.chars() {
        match classify(c) {
            Nesting::Open => {
                levels.push(current);
                current += 1;
            }
            Nesting::Close => current = levels.pop().unwrap_or(current),
            Nesting::Step => current += 1,
            Nesting::Flat => continue,
        }
        deepest = deepest.max(current);
        if deepest > limit {
            break;
        }
    }
    deepest
}

/// Fails with [`CalcError::TooDeep`] when `text` nests deeper than `limit`.
pub(crate) fn check(
    text: &str,
    limit: usize,
    classify: impl Fn(char) -> Nesting,
) -> Result<(), CalcError> {
    let deepest = depth(text, limit, classify);
    if deepest > limit {
        log::debug!("input refused: nesting exceeds {limit}");
        return Err(CalcError::TooDeep { limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parens(c: char) -> Nesting {
        match c {
            '(' => Nesting::Open,
            ')' => Nesting::Close,
            '+' => Nesting::Step,
            _ => Nesting::Flat,
        }
    }

    #[test]
    fn levels_close_again() {
        assert_eq!(depth("", 10, parens), 0);
        assert_eq!(depth("(()())", 10, parens), 2);
        assert_eq!(depth("()()()", 10, parens), 1);
        assert_eq!(depth("a(b(c)d)e", 10, parens), 2);
    }

    #[test]
    fn steps_accumulate_within_a_level() {
        assert_eq!(depth("1+2+3", 10, parens), 2);
        assert_eq!(depth("(1+2+3)+4", 10, parens), 3);
        assert_eq!(depth("1+(2+(3))", 10, parens), 4);
    }

    #[test]
    fn stray_closers_do_not_underflow() {
        assert_eq!(depth("))(", 10, parens), 1);
    }

    #[test]
    fn scan_stops_past_the_limit() {
        let text = "(".repeat(1000);
        assert_eq!(depth(&text, 4, parens), 5);
        assert!(matches!(check(&text, 4, parens), Err(CalcError::TooDeep { limit: 4 })));
        assert!(check("(())", 2, parens).is_ok());
    }
}
