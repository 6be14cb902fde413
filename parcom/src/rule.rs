//! Forward-declared rules for recursive grammars.
//!
//! A grammar rule that mentions itself (or a rule defined later) cannot be
//! built as a plain value: the reference is needed before the body exists.
//! [`Rule`] solves this with an indirection cell. Declare the rule, hand out
//! [`Rule::reference`] parsers while building bodies, then
//! [`Rule::define`] the body. References resolve when they are first
//! evaluated during a parse.
//!
//! References hold the cell weakly and the parser returned by `define` holds
//! it strongly, so recursive grammars do not form reference cycles. Keep the
//! defined parser alive for as long as anything that refers to the rule is
//! in use; evaluating a reference to a dropped or undefined rule aborts the
//! parse with [`ParseError::UnresolvedRule`](crate::ParseError).
//!
//! # Examples
//!
//! Mutually recursive rules:
//!
//! ```rust
//! use parcom::{Parser, Rule, parse_str};
//!
//! // list := '(' item* ')'    item := 'x' | list
//! let list = Rule::<char, ()>::declare("list");
//! let item = Rule::declare("item");
//!
//! let item = item.define(Parser::literal('x').or(list.reference()));
//! let list = list.define(
//!     Parser::literal('(')
//!         .then(item.clone().zero_or_more())
//!         .then(Parser::literal(')')),
//! );
//!
//! assert!(parse_str(&list, "(x(x)())").unwrap().is_some());
//! assert!(parse_str(&list, "(x(x)").unwrap().is_none());
//! ```

use crate::parser::{Kind, Parser};
use smartstring::alias::String;
use std::sync::{Arc, OnceLock};

pub(crate) struct RuleSlot<E, T> {
    pub(crate) name: String,
    pub(crate) body: OnceLock<Parser<E, T>>,
}

/// A declared, not yet defined, grammar rule.
pub struct Rule<E, T> {
    slot: Arc<RuleSlot<E, T>>,
}

impl<E, T> Rule<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
{
    pub fn declare(name: &str) -> Self {
        Self {
            slot: Arc::new(RuleSlot {
                name: String::from(name),
                body: OnceLock::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.slot.name
    }

    /// A parser that evaluates this rule's body once it is defined.
    pub fn reference(&self) -> Parser<E, T> {
        Parser::from_kind(Kind::Forward {
            name: self.slot.name.clone(),
            slot: Arc::downgrade(&self.slot),
        })
    }

    /// Sets the body and returns the parser that owns the rule.
    pub fn define(self, body: Parser<E, T>) -> Parser<E, T> {
        log::debug!("rule {:?} defined as {:?}", self.slot.name, body);
        // The slot is reachable only through this rule until now, so it is
        // still empty.
        let fresh = self.slot.body.set(body).is_ok();
        debug_assert!(fresh, "rule {:?} defined twice", self.slot.name);
        Parser::from_kind(Kind::Rule(self.slot))
    }
}

/// Builds a self-referential parser.
///
/// `build` receives a reference to the parser being defined and returns its
/// body.
///
/// ```rust
/// use parcom::{Parser, parse_str, recursive};
///
/// // nested := '[' nested* ']'
/// let nested = recursive(|this| {
///     Parser::<char, ()>::literal('[')
///         .then(this.zero_or_more())
///         .then(Parser::literal(']'))
/// });
/// assert!(parse_str(&nested, "[[][[]]]").unwrap().is_some());
/// ```
///
/// The rule is named `"recursive"`; use [`recursive_named`] when error
/// messages should say which rule is meant.
pub fn recursive<E, T, F>(build: F) -> Parser<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
    F: FnOnce(Parser<E, T>) -> Parser<E, T>,
{
    recursive_named("recursive", build)
}

/// [`recursive`] with a rule name, reported by
/// [`ParseError::UnresolvedRule`](crate::ParseError) and trace logs.
pub fn recursive_named<E, T, F>(name: &str, build: F) -> Parser<E, T>
where
    E: Clone + 'static,
    T: Clone + 'static,
    F: FnOnce(Parser<E, T>) -> Parser<E, T>,
{
    let rule = Rule::declare(name);
    let body = build(rule.reference());
    rule.define(body)
}
