use crate::error::ParseError;
use crate::parser::NodeId;
use crate::value::Value;
use smartstring::alias::String;
use std::collections::HashMap;

/// Per-call switches for a top-level parse.
///
/// ```rust
/// # use parcom::ParseOptions;
/// let opts = ParseOptions::default().memoize(false).consume_all(true);
/// assert!(!opts.memoize_enabled());
/// assert!(opts.consume_all_enabled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    memoize: bool,
    consume_all: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            memoize: true,
            consume_all: false,
        }
    }
}

impl ParseOptions {
    /// Enables or disables the packrat cache. When disabled, memoized nodes
    /// delegate straight to their child.
    pub fn memoize(mut self, on: bool) -> Self {
        self.memoize = on;
        self
    }

    /// Requires a successful parse to end at the end of input; a success that
    /// stops short is reported as failure.
    pub fn consume_all(mut self, on: bool) -> Self {
        self.consume_all = on;
        self
    }

    #[inline]
    pub fn memoize_enabled(&self) -> bool {
        self.memoize
    }

    #[inline]
    pub fn consume_all_enabled(&self) -> bool {
        self.consume_all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorStats {
    pub advances: usize,
    pub resets: usize,
    pub cuts: usize,
    pub memo_hits: usize,
    pub memo_misses: usize,
}

type MemoEntry<E, T> = (Option<Value<E, T>>, usize);

/// Mutable position over an input sequence.
///
/// `Cursor` owns everything that changes while a parser graph runs: the
/// current position, the active cut and the packrat memo table. A cursor is
/// created for one top-level parse and dropped with it; the memo table is
/// never shared between inputs.
///
/// `current()` is derived from `position()` on every call, so it always names
/// the element at the current position, or `None` at end of input.
pub struct Cursor<'a, E, T> {
    input: &'a [E],
    position: usize,
    cut_point: Option<usize>,
    cut_reason: String,
    memo: HashMap<(NodeId, usize), MemoEntry<E, T>>,
    options: ParseOptions,
    stats: CursorStats,
}

impl<'a, E, T> Cursor<'a, E, T>
where
    E: Clone,
    T: Clone,
{
    pub fn new(input: &'a [E]) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &'a [E], options: ParseOptions) -> Self {
        Self {
            input,
            position: 0,
            cut_point: None,
            cut_reason: String::new(),
            memo: HashMap::new(),
            options,
            stats: CursorStats::default(),
        }
    }

    #[inline]
    pub fn input(&self) -> &'a [E] {
        self.input
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The element at the current position, or `None` past the end.
    #[inline]
    pub fn current(&self) -> Option<&'a E> {
        self.input.get(self.position)
    }

    /// Elements from the current position to the end of input.
    pub fn remaining(&self) -> &'a [E] {
        self.input.get(self.position..).unwrap_or(&[])
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    #[inline]
    pub fn cut_point(&self) -> Option<usize> {
        self.cut_point
    }

    #[inline]
    pub fn cut_reason(&self) -> &str {
        &self.cut_reason
    }

    #[inline]
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn stats(&self) -> CursorStats {
        self.stats.clone()
    }

    /// Moves one element forward. Moving past the end is allowed; `current()`
    /// then reports end of input.
    pub fn advance(&mut self) {
        self.position += 1;
        self.stats.advances += 1;
    }

    /// Backtracks (or jumps) to `target`.
    ///
    /// Fails with [`ParseError::BacktrackPastCut`] if `target` lies before the
    /// active cut. That error is fatal for the whole parse.
    pub fn reset(&mut self, target: usize) -> Result<(), ParseError> {
        if let Some(cut_point) = self.cut_point {
            if target < cut_point {
                log::debug!(
                    "reset to {} rejected by cut at {} ({})",
                    target,
                    cut_point,
                    self.cut_reason
                );
                return Err(ParseError::BacktrackPastCut {
                    target,
                    cut_point,
                    reason: self.cut_reason.clone(),
                });
            }
        }
        self.position = target;
        self.stats.resets += 1;
        Ok(())
    }

    /// Commits to the current position: later resets before it are fatal.
    pub fn cut(&mut self, reason: &str) {
        log::debug!("cut at {} ({})", self.position, reason);
        self.cut_point = Some(self.position);
        self.cut_reason = String::from(reason);
        self.stats.cuts += 1;
    }

    pub(crate) fn memo_get(&mut self, id: NodeId, start: usize) -> Option<MemoEntry<E, T>> {
        match self.memo.get(&(id, start)) {
            Some(entry) => {
                self.stats.memo_hits += 1;
                Some(entry.clone())
            }
            None => {
                self.stats.memo_misses += 1;
                None
            }
        }
    }

    pub(crate) fn memo_put(
        &mut self,
        id: NodeId,
        start: usize,
        result: Option<Value<E, T>>,
        end: usize,
    ) {
        self.memo.insert((id, start), (result, end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn current_tracks_position() {
        let input = chars("ab");
        let mut cur: Cursor<char, ()> = Cursor::new(&input);
        assert_eq!(cur.current(), Some(&'a'));
        cur.advance();
        assert_eq!(cur.current(), Some(&'b'));
        assert_eq!(cur.remaining(), &['b']);
        cur.advance();
        assert_eq!(cur.current(), None);
        assert!(cur.is_at_end());
        cur.advance();
        assert_eq!(cur.position(), 3);
        assert_eq!(cur.current(), None);
        assert!(cur.remaining().is_empty());
    }

    #[test]
    fn reset_respects_cut() {
        let input = chars("abcd");
        let mut cur: Cursor<char, ()> = Cursor::new(&input);
        cur.advance();
        cur.advance();
        cur.reset(0).unwrap();
        cur.advance();
        cur.advance();
        cur.cut("two in");
        assert_eq!(cur.cut_point(), Some(2));
        assert_eq!(cur.cut_reason(), "two in");
        cur.advance();
        cur.reset(2).unwrap();
        let err = cur.reset(1).unwrap_err();
        assert_eq!(
            err,
            ParseError::BacktrackPastCut {
                target: 1,
                cut_point: 2,
                reason: "two in".into(),
            }
        );
        assert_eq!(cur.position(), 2);
    }

    #[test]
    fn recut_at_same_position_restates() {
        let input = chars("ab");
        let mut cur: Cursor<char, ()> = Cursor::new(&input);
        cur.advance();
        cur.cut("first");
        cur.cut("second");
        assert_eq!(cur.cut_point(), Some(1));
        assert_eq!(cur.cut_reason(), "second");
        assert_eq!(cur.stats().cuts, 2);
    }

    #[test]
    fn memo_round_trip_counts_stats() {
        let input = chars("x");
        let mut cur: Cursor<char, ()> = Cursor::new(&input);
        let id = NodeId::fresh();
        assert!(cur.memo_get(id, 0).is_none());
        cur.memo_put(id, 0, Some(Value::Element('x')), 1);
        assert_eq!(cur.memo_get(id, 0), Some((Some(Value::Element('x')), 1)));
        assert!(cur.memo_get(id, 1).is_none());
        let stats = cur.stats();
        assert_eq!(stats.memo_hits, 1);
        assert_eq!(stats.memo_misses, 2);
    }
}
