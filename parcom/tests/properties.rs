use parcom::{Cursor, ParseOptions, Parser, parse_with};
use proptest::prelude::*;

type P = Parser<u8, u32>;

/// Shape of a small random grammar over the alphabet `0..4`.
#[derive(Debug, Clone)]
enum Shape {
    Lit(u8),
    Any,
    Or(Box<Shape>, Box<Shape>),
    Then(Box<Shape>, Box<Shape>),
    Many(Box<Shape>),
    Plus(Box<Shape>),
    Opt(Box<Shape>),
    Peek(Box<Shape>),
    Not(Box<Shape>),
    Count(Box<Shape>),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![(0u8..4).prop_map(Shape::Lit), Just(Shape::Any)];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Or(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Then(Box::new(a), Box::new(b))),
            inner.clone().prop_map(|a| Shape::Many(Box::new(a))),
            inner.clone().prop_map(|a| Shape::Plus(Box::new(a))),
            inner.clone().prop_map(|a| Shape::Opt(Box::new(a))),
            inner.clone().prop_map(|a| Shape::Peek(Box::new(a))),
            inner.clone().prop_map(|a| Shape::Not(Box::new(a))),
            inner.prop_map(|a| Shape::Count(Box::new(a))),
        ]
    })
}

/// Builds the grammar, optionally memoizing every node. A memoized node is
/// shared by both branches of `Or` so that cache hits actually happen.
fn build(shape: &Shape, memo: bool) -> P {
    let p = match shape {
        Shape::Lit(b) => P::literal(*b),
        Shape::Any => P::any(),
        Shape::Or(a, b) => {
            let a = build(a, memo);
            a.clone().then(build(b, memo)).or(a)
        }
        Shape::Then(a, b) => build(a, memo).then(build(b, memo)),
        Shape::Many(a) => build(a, memo).zero_or_more(),
        Shape::Plus(a) => build(a, memo).one_or_more(),
        Shape::Opt(a) => build(a, memo).zero_or_one(),
        Shape::Peek(a) => build(a, memo).lookahead(),
        Shape::Not(a) => build(a, memo).negative_lookahead(),
        Shape::Count(a) => build(a, memo).map_data(|v| v.into_list().len() as u32),
    };
    if memo { p.memoize() } else { p }
}

proptest! {
    #[test]
    fn memoization_is_transparent(
        shape in shape_strategy(),
        input in proptest::collection::vec(0u8..4, 0..12),
    ) {
        let plain = build(&shape, false);
        let memo = build(&shape, true);
        let a = parse_with(&plain, &input, ParseOptions::default()).unwrap();
        let b = parse_with(&memo, &input, ParseOptions::default()).unwrap();
        prop_assert_eq!(&a.value, &b.value);
        prop_assert_eq!(a.position, b.position);

        // Same grammar with the cache switched off.
        let c = parse_with(&memo, &input, ParseOptions::default().memoize(false)).unwrap();
        prop_assert_eq!(&b.value, &c.value);
        prop_assert_eq!(b.position, c.position);
    }

    #[test]
    fn match_rejection_keeps_position(
        input in proptest::collection::vec(0u8..4, 1..12),
        start in 0usize..12,
        wanted in 0u8..4,
    ) {
        let start = start % input.len();
        let mut cur: Cursor<u8, u32> = Cursor::new(&input);
        for _ in 0..start {
            cur.advance();
        }
        let lit = P::literal(wanted);
        let out = lit.parse(&mut cur).unwrap();
        if input[start] == wanted {
            prop_assert!(out.is_some());
            prop_assert_eq!(cur.position(), start + 1);
        } else {
            prop_assert!(out.is_none());
            prop_assert_eq!(cur.position(), start);
        }
    }

    #[test]
    fn zero_or_more_of_own_element_is_idempotent(
        input in proptest::collection::vec(0u8..4, 1..12),
    ) {
        let first = input[0];
        let many = P::literal(first).zero_or_more();
        let mut cur: Cursor<u8, u32> = Cursor::new(&input);
        let a = many.parse(&mut cur).unwrap();
        let end = cur.position();
        cur.reset(0).unwrap();
        let b = many.parse(&mut cur).unwrap();
        prop_assert!(a.is_some());
        prop_assert_eq!(a, b);
        prop_assert_eq!(cur.position(), end);
        prop_assert!(end >= 1);
    }
}
