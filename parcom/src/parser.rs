use crate::cursor::{Cursor, CursorStats, ParseOptions};
use crate::error::{GrammarError, ParseError};
use crate::rule::RuleSlot;
use crate::value::Value;
use smartstring::alias::String;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Outcome of evaluating a parser: `Ok(Some(_))` on a match, `Ok(None)` on
/// ordinary failure, `Err(_)` when the parse must be aborted.
pub type ParseResult<E, T> = Result<Option<Value<E, T>>, ParseError>;

/// Stable identity of a parser node, assigned once at construction.
///
/// Memo entries are keyed by this id, so two structurally identical nodes
/// built separately never share cache entries, while one node reached
/// through several parents always does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type MatchFn<E> = dyn Fn(&E) -> bool + Send + Sync;
type MapFn<E, T> = dyn Fn(Value<E, T>) -> Value<E, T> + Send + Sync;
type LazyFn<E, T> = dyn Fn() -> Parser<E, T> + Send + Sync;
type GuardFn<E, T> = dyn for<'c> Fn(&Cursor<'c, E, T>) -> bool + Send + Sync;
type CursorHook<E, T> = dyn for<'c> Fn(&Cursor<'c, E, T>) + Send + Sync;
type SuccessHook<E, T> = dyn for<'c> Fn(&Cursor<'c, E, T>, &Value<E, T>) + Send + Sync;
type ExitHook<E, T> = dyn for<'c> Fn(&Cursor<'c, E, T>, Option<&Value<E, T>>) + Send + Sync;

pub(crate) enum Kind<E, T> {
    Match(Arc<MatchFn<E>>),
    Alternation(Vec<Parser<E, T>>),
    Sequence(Vec<Parser<E, T>>),
    OneOrMore(Parser<E, T>),
    ZeroOrOne(Parser<E, T>),
    ZeroOrMore(Parser<E, T>),
    Transform(Parser<E, T>, Arc<MapFn<E, T>>),
    Lazy(Arc<LazyFn<E, T>>),
    Memoized(Parser<E, T>),
    Cut(Parser<E, T>, String),
    Guarded(Parser<E, T>, Arc<GuardFn<E, T>>),
    PositiveLookahead(Parser<E, T>),
    NegativeLookahead(Parser<E, T>),
    OnEnter(Parser<E, T>, Arc<CursorHook<E, T>>),
    OnSuccess(Parser<E, T>, Arc<SuccessHook<E, T>>),
    OnFailure(Parser<E, T>, Arc<CursorHook<E, T>>),
    OnExit(Parser<E, T>, Arc<ExitHook<E, T>>),
    Rule(Arc<RuleSlot<E, T>>),
    Forward { name: String, slot: Weak<RuleSlot<E, T>> },
}

impl<E, T> Kind<E, T> {
    fn name(&self) -> &'static str {
        match self {
            Kind::Match(_) => "match",
            Kind::Alternation(_) => "alternation",
            Kind::Sequence(_) => "sequence",
            Kind::OneOrMore(_) => "one-or-more",
            Kind::ZeroOrOne(_) => "zero-or-one",
            Kind::ZeroOrMore(_) => "zero-or-more",
            Kind::Transform(..) => "transform",
            Kind::Lazy(_) => "lazy",
            Kind::Memoized(_) => "memoized",
            Kind::Cut(..) => "cut",
            Kind::Guarded(..) => "guarded",
            Kind::PositiveLookahead(_) => "lookahead",
            Kind::NegativeLookahead(_) => "negative-lookahead",
            Kind::OnEnter(..) => "on-enter",
            Kind::OnSuccess(..) => "on-success",
            Kind::OnFailure(..) => "on-failure",
            Kind::OnExit(..) => "on-exit",
            Kind::Rule(_) => "rule",
            Kind::Forward { .. } => "forward",
        }
    }
}

pub(crate) struct Node<E, T> {
    id: NodeId,
    kind: Kind<E, T>,
}

/// A node in a parser graph over elements `E`, producing application data `T`.
///
/// `Parser` is a cheap handle to an immutable, shared node: cloning it shares
/// the node (and its identity) rather than copying it. Every combinator
/// returns a new node and leaves its operands untouched, so a sub-parser can
/// be linked into any number of parents.
///
/// A grammar is built once, then run any number of times against fresh
/// [`Cursor`]s. Grammars are `Send + Sync`; concurrent parses are fine as long
/// as each owns its cursor.
///
/// ```rust
/// use parcom::{Parser, Value, parse_str};
///
/// let digit = Parser::<char, i64>::element(|c: &char| c.is_ascii_digit());
/// let number = digit
///     .one_or_more()
///     .map(|v| Value::Data(v.text().parse().unwrap_or_default()));
/// assert_eq!(parse_str(&number, "101").unwrap(), Some(Value::Data(101)));
/// ```
pub struct Parser<E, T> {
    node: Arc<Node<E, T>>,
}

impl<E, T> Clone for Parser<E, T> {
    fn clone(&self) -> Self {
        Parser {
            node: Arc::clone(&self.node),
        }
    }
}

impl<E, T> fmt::Debug for Parser<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("id", &self.node.id)
            .field("kind", &self.node.kind.name())
            .finish()
    }
}

impl<E, T> Parser<E, T> {
    pub(crate) fn from_kind(kind: Kind<E, T>) -> Self {
        Parser {
            node: Arc::new(Node {
                id: NodeId::fresh(),
                kind,
            }),
        }
    }

    /// Identity used as the memo key.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Short name of the node variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        self.node.kind.name()
    }
}

// === Construction ===

impl<E, T> Parser<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
{
    /// Matches one element satisfying `pred`.
    pub fn element<F>(pred: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::from_kind(Kind::Match(Arc::new(pred)))
    }

    /// Matches any single element.
    pub fn any() -> Self {
        Self::element(|_| true)
    }

    /// Succeeds, consuming nothing, only at end of input.
    pub fn end() -> Self {
        Self::any().negative_lookahead()
    }

    /// Ordered choice over `children`; at least two are required.
    pub fn alternation(children: Vec<Parser<E, T>>) -> Result<Self, GrammarError> {
        if children.len() < 2 {
            return Err(GrammarError::TooFewChildren {
                kind: "alternation",
                len: children.len(),
            });
        }
        Ok(Self::from_kind(Kind::Alternation(children)))
    }

    /// Sequence of `children`; at least two are required.
    pub fn sequence(children: Vec<Parser<E, T>>) -> Result<Self, GrammarError> {
        if children.len() < 2 {
            return Err(GrammarError::TooFewChildren {
                kind: "sequence",
                len: children.len(),
            });
        }
        Ok(Self::from_kind(Kind::Sequence(children)))
    }

    /// Defers construction of the real parser to parse time.
    ///
    /// `producer` runs on every evaluation of this node; nothing is cached
    /// here. Wrap the produced parser in [`Parser::memoize`] to cache its
    /// results. This lets a rule mention a parser that does not exist yet
    /// when the rule is built. [`Rule`](crate::Rule) and
    /// [`recursive`](crate::recursive) cover the common self-reference case.
    ///
    /// A self-referential rule kept in a static cell:
    ///
    /// ```rust
    /// use parcom::{Parser, parse_str};
    /// use std::sync::OnceLock;
    ///
    /// // nested := '[' nested* ']'
    /// fn nested() -> Parser<char, ()> {
    ///     static NESTED: OnceLock<Parser<char, ()>> = OnceLock::new();
    ///     NESTED
    ///         .get_or_init(|| {
    ///             Parser::literal('[')
    ///                 .then(Parser::lazy(nested).zero_or_more())
    ///                 .then(Parser::literal(']'))
    ///         })
    ///         .clone()
    /// }
    ///
    /// assert!(parse_str(&nested(), "[[][[]]]").unwrap().is_some());
    /// assert!(parse_str(&nested(), "[[]").unwrap().is_none());
    /// ```
    pub fn lazy<F>(producer: F) -> Self
    where
        F: Fn() -> Parser<E, T> + Send + Sync + 'static,
    {
        Self::from_kind(Kind::Lazy(Arc::new(producer)))
    }
}

impl<E, T> Parser<E, T>
where
    E: Clone + PartialEq + Send + Sync + 'static,
    T: Clone + 'static,
{
    /// Matches one element equal to `expected`.
    pub fn literal(expected: E) -> Self {
        Self::element(move |e| *e == expected)
    }

    /// Matches one element equal to any of `choices`.
    pub fn one_of<I>(choices: I) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        let choices: Vec<E> = choices.into_iter().collect();
        Self::element(move |e| choices.contains(e))
    }

    /// Matches the elements of `expected` in order.
    ///
    /// A single element gives a plain match; longer inputs give a sequence.
    pub fn literals<I>(expected: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = E>,
    {
        let mut parts: Vec<Self> = expected.into_iter().map(Self::literal).collect();
        match parts.len() {
            0 => Err(GrammarError::EmptyLiteral),
            1 => Ok(parts.remove(0)),
            _ => Self::sequence(parts),
        }
    }
}

// === Combinators ===

impl<E, T> Parser<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
{
    /// Ordered choice: `self`, else `other`.
    ///
    /// Chaining onto an alternation yields one flat alternation with the old
    /// children plus `other`; the receiver node is not modified.
    pub fn or(self, other: Parser<E, T>) -> Self {
        if let Kind::Alternation(children) = &self.node.kind {
            let mut children = children.clone();
            children.push(other);
            return Self::from_kind(Kind::Alternation(children));
        }
        Self::from_kind(Kind::Alternation(vec![self, other]))
    }

    /// Sequence: `self` followed by `other`, flattened like [`Parser::or`].
    pub fn then(self, other: Parser<E, T>) -> Self {
        if let Kind::Sequence(children) = &self.node.kind {
            let mut children = children.clone();
            children.push(other);
            return Self::from_kind(Kind::Sequence(children));
        }
        Self::from_kind(Kind::Sequence(vec![self, other]))
    }

    pub fn one_or_more(self) -> Self {
        Self::from_kind(Kind::OneOrMore(self))
    }

    pub fn zero_or_one(self) -> Self {
        Self::from_kind(Kind::ZeroOrOne(self))
    }

    pub fn zero_or_more(self) -> Self {
        Self::from_kind(Kind::ZeroOrMore(self))
    }

    /// Maps a successful result through `f`.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value<E, T>) -> Value<E, T> + Send + Sync + 'static,
    {
        Self::from_kind(Kind::Transform(self, Arc::new(f)))
    }

    /// Maps a successful result to application data.
    pub fn map_data<F>(self, f: F) -> Self
    where
        F: Fn(Value<E, T>) -> T + Send + Sync + 'static,
    {
        self.map(move |v| Value::Data(f(v)))
    }

    /// Caches results per start position for the lifetime of one cursor.
    pub fn memoize(self) -> Self {
        Self::from_kind(Kind::Memoized(self))
    }

    /// Commits to the position reached once `self` succeeds.
    ///
    /// Any later attempt to backtrack before that position aborts the parse
    /// with [`ParseError::BacktrackPastCut`] carrying `reason`.
    pub fn cut(self, reason: &str) -> Self {
        Self::from_kind(Kind::Cut(self, String::from(reason)))
    }

    /// Runs `self` only if `pred` holds for the cursor.
    pub fn guard<F>(self, pred: F) -> Self
    where
        F: Fn(&Cursor<'_, E, T>) -> bool + Send + Sync + 'static,
    {
        Self::from_kind(Kind::Guarded(self, Arc::new(pred)))
    }

    /// Zero-width: succeeds with `self`'s result without consuming input.
    pub fn lookahead(self) -> Self {
        Self::from_kind(Kind::PositiveLookahead(self))
    }

    /// Zero-width: succeeds with [`Value::Marker`] only if `self` fails.
    pub fn negative_lookahead(self) -> Self {
        Self::from_kind(Kind::NegativeLookahead(self))
    }

    pub fn on_enter<F>(self, hook: F) -> Self
    where
        F: Fn(&Cursor<'_, E, T>) + Send + Sync + 'static,
    {
        Self::from_kind(Kind::OnEnter(self, Arc::new(hook)))
    }

    pub fn on_success<F>(self, hook: F) -> Self
    where
        F: Fn(&Cursor<'_, E, T>, &Value<E, T>) + Send + Sync + 'static,
    {
        Self::from_kind(Kind::OnSuccess(self, Arc::new(hook)))
    }

    pub fn on_failure<F>(self, hook: F) -> Self
    where
        F: Fn(&Cursor<'_, E, T>) + Send + Sync + 'static,
    {
        Self::from_kind(Kind::OnFailure(self, Arc::new(hook)))
    }

    /// Runs `hook` after `self` whatever the outcome. Not called when the
    /// parse is aborted by a [`ParseError`].
    pub fn on_exit<F>(self, hook: F) -> Self
    where
        F: Fn(&Cursor<'_, E, T>, Option<&Value<E, T>>) + Send + Sync + 'static,
    {
        Self::from_kind(Kind::OnExit(self, Arc::new(hook)))
    }
}

// === Evaluation ===

impl<E, T> Parser<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
{
    /// Evaluates this parser at the cursor's current position.
    pub fn parse(&self, cursor: &mut Cursor<'_, E, T>) -> ParseResult<E, T> {
        let start = cursor.position();
        log::trace!("{} {} enter at {}", self.node.id, self.kind_name(), start);
        let result = self.eval(cursor)?;
        log::trace!(
            "{} {} {} at {}..{}",
            self.node.id,
            self.kind_name(),
            if result.is_some() { "matched" } else { "failed" },
            start,
            cursor.position()
        );
        Ok(result)
    }

    fn eval(&self, cursor: &mut Cursor<'_, E, T>) -> ParseResult<E, T> {
        match &self.node.kind {
            Kind::Match(pred) => match cursor.current() {
                Some(e) if pred(e) => {
                    let e = e.clone();
                    cursor.advance();
                    Ok(Some(Value::Element(e)))
                }
                _ => Ok(None),
            },

            Kind::Alternation(children) => {
                let start = cursor.position();
                for child in children {
                    cursor.reset(start)?;
                    if let Some(v) = child.parse(cursor)? {
                        return Ok(Some(v));
                    }
                }
                Ok(None)
            }

            // No rewind on failure: the cursor stays where the failing child
            // left it.
            Kind::Sequence(children) => {
                let mut items = Vec::with_capacity(children.len());
                for child in children {
                    match child.parse(cursor)? {
                        Some(v) => items.push(v),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::List(items)))
            }

            Kind::OneOrMore(child) => repeat(child, cursor),

            Kind::ZeroOrOne(child) => {
                let start = cursor.position();
                match child.parse(cursor)? {
                    Some(v) => Ok(Some(v)),
                    None => {
                        cursor.reset(start)?;
                        Ok(Some(Value::Nothing))
                    }
                }
            }

            Kind::ZeroOrMore(child) => {
                let start = cursor.position();
                match repeat(child, cursor)? {
                    Some(v) => Ok(Some(v)),
                    None => {
                        cursor.reset(start)?;
                        Ok(Some(Value::Nothing))
                    }
                }
            }

            Kind::Transform(child, f) => Ok(child.parse(cursor)?.map(|v| f(v))),

            Kind::Lazy(producer) => producer().parse(cursor),

            Kind::Memoized(child) => {
                if !cursor.options().memoize_enabled() {
                    return child.parse(cursor);
                }
                let start = cursor.position();
                if let Some((result, end)) = cursor.memo_get(self.node.id, start) {
                    log::trace!("{} memo hit at {} -> {}", self.node.id, start, end);
                    cursor.reset(end)?;
                    return Ok(result);
                }
                let result = child.parse(cursor)?;
                let end = cursor.position();
                cursor.memo_put(self.node.id, start, result.clone(), end);
                Ok(result)
            }

            Kind::Cut(child, reason) => {
                let result = child.parse(cursor)?;
                if result.is_some() {
                    cursor.cut(reason);
                }
                Ok(result)
            }

            Kind::Guarded(child, pred) => {
                if pred(cursor) {
                    child.parse(cursor)
                } else {
                    Ok(None)
                }
            }

            Kind::PositiveLookahead(child) => {
                let start = cursor.position();
                match child.parse(cursor)? {
                    Some(v) => {
                        cursor.reset(start)?;
                        Ok(Some(v))
                    }
                    None => Ok(None),
                }
            }

            Kind::NegativeLookahead(child) => {
                let start = cursor.position();
                match child.parse(cursor)? {
                    Some(_) => Ok(None),
                    None => {
                        cursor.reset(start)?;
                        Ok(Some(Value::Marker))
                    }
                }
            }

            Kind::OnEnter(child, hook) => {
                hook(cursor);
                child.parse(cursor)
            }

            Kind::OnSuccess(child, hook) => {
                let result = child.parse(cursor)?;
                if let Some(v) = &result {
                    hook(cursor, v);
                }
                Ok(result)
            }

            Kind::OnFailure(child, hook) => {
                let result = child.parse(cursor)?;
                if result.is_none() {
                    hook(cursor);
                }
                Ok(result)
            }

            Kind::OnExit(child, hook) => {
                let result = child.parse(cursor)?;
                hook(cursor, result.as_ref());
                Ok(result)
            }

            Kind::Rule(slot) => match slot.body.get() {
                Some(body) => body.parse(cursor),
                None => Err(ParseError::UnresolvedRule {
                    name: slot.name.clone(),
                }),
            },

            Kind::Forward { name, slot } => {
                let body = slot.upgrade().and_then(|s| s.body.get().cloned());
                match body {
                    Some(body) => body.parse(cursor),
                    None => Err(ParseError::UnresolvedRule { name: name.clone() }),
                }
            }
        }
    }
}

/// One-or-more loop shared by both repetition forms.
fn repeat<E, T>(child: &Parser<E, T>, cursor: &mut Cursor<'_, E, T>) -> ParseResult<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
{
    let mut start = cursor.position();
    let Some(first) = child.parse(cursor)? else {
        return Ok(None);
    };
    let mut items = vec![first];
    // A success that consumed nothing would match forever.
    while cursor.position() > start {
        start = cursor.position();
        match child.parse(cursor)? {
            Some(v) => items.push(v),
            None => {
                cursor.reset(start)?;
                break;
            }
        }
    }
    Ok(Some(Value::List(items)))
}

// === Entry points ===

/// Result of [`parse_with`].
#[derive(Debug, Clone)]
pub struct Parsed<E, T> {
    /// Top-level result, `None` on failure.
    pub value: Option<Value<E, T>>,
    /// Cursor position when the parse returned.
    pub position: usize,
    pub stats: CursorStats,
}

/// Runs `parser` over `input` with a fresh cursor and default options.
pub fn parse<E, T>(parser: &Parser<E, T>, input: &[E]) -> ParseResult<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
{
    Ok(parse_with(parser, input, ParseOptions::default())?.value)
}

/// Runs `parser` over `input` with a fresh cursor configured by `options`.
///
/// ```rust
/// use parcom::{ParseOptions, Parser, parse_with};
///
/// let a = Parser::<char, ()>::literal('a');
/// let input: Vec<char> = "ab".chars().collect();
/// let out = parse_with(&a, &input, ParseOptions::default()).unwrap();
/// assert!(out.value.is_some());
/// assert_eq!(out.position, 1);
///
/// let strict = ParseOptions::default().consume_all(true);
/// assert!(parse_with(&a, &input, strict).unwrap().value.is_none());
/// ```
pub fn parse_with<E, T>(
    parser: &Parser<E, T>,
    input: &[E],
    options: ParseOptions,
) -> Result<Parsed<E, T>, ParseError>
where
    E: Clone + 'static,
    T: Clone + 'static,
{
    let mut cursor = Cursor::with_options(input, options);
    let mut value = parser.parse(&mut cursor)?;
    if options.consume_all_enabled() && !cursor.is_at_end() {
        value = None;
    }
    let stats = cursor.stats();
    log::debug!(
        "parse {} at {} of {}: {:?}",
        if value.is_some() { "matched" } else { "failed" },
        cursor.position(),
        input.len(),
        stats
    );
    Ok(Parsed {
        value,
        position: cursor.position(),
        stats,
    })
}

/// Runs a character parser over the characters of `text`.
pub fn parse_str<T>(parser: &Parser<char, T>, text: &str) -> ParseResult<char, T>
where
    T: Clone + 'static,
{
    let input: Vec<char> = text.chars().collect();
    parse(parser, &input)
}
