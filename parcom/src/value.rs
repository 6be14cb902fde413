//! Success payloads produced by parsers.
//!
//! A parser evaluation returns `Option<Value<E, T>>`: `None` is ordinary
//! failure, `Some(value)` is success. Because failure lives outside
//! [`Value`], an application may legitimately produce an empty or "null"
//! value (for example [`Value::Nothing`]) from a transform without it being
//! mistaken for a failed match.

/// Result of a successful parse over elements of type `E`, where `T` is the
/// application data produced by transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<E, T> {
    /// A single element consumed by a match.
    Element(E),
    /// Ordered results of a sequence or a repetition.
    List(Vec<Value<E, T>>),
    /// Empty result of an optional parser that matched nothing.
    Nothing,
    /// Zero-width success of a negative lookahead.
    Marker,
    /// Application value returned by a transform.
    Data(T),
}

impl<E, T> Value<E, T> {
    /// Returns the element if this is [`Value::Element`].
    pub fn as_element(&self) -> Option<&E> {
        match self {
            Value::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the items if this is [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value<E, T>]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the data if this is [`Value::Data`].
    pub fn as_data(&self) -> Option<&T> {
        match self {
            Value::Data(t) => Some(t),
            _ => None,
        }
    }

    /// Consumes the value and returns its data, if any.
    pub fn into_data(self) -> Option<T> {
        match self {
            Value::Data(t) => Some(t),
            _ => None,
        }
    }

    /// Converts repetition-style results into a vector.
    ///
    /// [`Value::List`] yields its items and [`Value::Nothing`] yields an empty
    /// vector, so a zero-or-more result can be consumed uniformly. Any other
    /// value becomes a one-item vector.
    pub fn into_list(self) -> Vec<Value<E, T>> {
        match self {
            Value::List(items) => items,
            Value::Nothing => Vec::new(),
            other => vec![other],
        }
    }

    /// Returns `true` for [`Value::Nothing`].
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Collects every element reachable from this value, depth first.
    ///
    /// Handy for recovering the matched text of a sub-parse.
    pub fn elements(&self) -> Vec<&E> {
        let mut out = Vec::new();
        self.collect_elements(&mut out);
        out
    }

    /// Collects every [`Value::Data`] reachable from this value, depth first,
    /// without looking inside the data itself.
    ///
    /// Transforms usually turn a whole sub-parse into one `Data`, so this
    /// picks out the already-built children of a sequence while skipping
    /// punctuation and optional gaps.
    pub fn data_items(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_data(&mut out);
        out
    }

    fn collect_data<'v>(&'v self, out: &mut Vec<&'v T>) {
        match self {
            Value::Data(t) => out.push(t),
            Value::List(items) => items.iter().for_each(|v| v.collect_data(out)),
            Value::Element(_) | Value::Nothing | Value::Marker => {}
        }
    }

    fn collect_elements<'v>(&'v self, out: &mut Vec<&'v E>) {
        match self {
            Value::Element(e) => out.push(e),
            Value::List(items) => items.iter().for_each(|v| v.collect_elements(out)),
            Value::Nothing | Value::Marker | Value::Data(_) => {}
        }
    }
}

impl<T> Value<char, T> {
    /// Concatenates every character reachable from this value.
    ///
    /// ```rust
    /// # use parcom::Value;
    /// let v: Value<char, ()> = Value::List(vec![Value::Element('4'), Value::Element('2')]);
    /// assert_eq!(v.text(), "42");
    /// ```
    pub fn text(&self) -> std::string::String {
        self.elements().into_iter().collect()
    }
}
