//! Parsed values and the raw input they are parsed from.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::PrimKind;
use crate::symbol::Symbol;

/// A value produced by a successful parse.
///
/// The shape of a value always follows the [type][crate::core::TypeSpec] it
/// was parsed as: a `list[int]` produces a [`Value::Seq`] of [`Value::Int`]s,
/// a record produces a [`Value::Record`] with its fields in declaration
/// order, and so on.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value, produced by the `None` marker.
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Ordered sequences.
    Seq(Vec<Value>),
    /// Sets, in the order the elements appeared in the input. Elements are
    /// unique.
    Set(Vec<Value>),
    /// Mappings, in the order the entries appeared in the input. Keys are
    /// unique.
    Map(Vec<(Value, Value)>),
    /// Fixed length tuples.
    Tuple(Vec<Value>),
    /// Records, with one entry per declared field, in declaration order.
    Record(Option<Symbol>, Vec<(Symbol, Value)>),
    /// A member of an enumeration: the enumeration's name, the member name
    /// and the member's value.
    Member(Option<Symbol>, Symbol, Box<Value>),
}

impl Value {
    /// The primitive kind of a scalar value, or `None` for the absent value
    /// and composite values.
    pub fn prim_kind(&self) -> Option<PrimKind> {
        match self {
            Value::Bool(_) => Some(PrimKind::Bool),
            Value::Int(_) => Some(PrimKind::Int),
            Value::Float(_) => Some(PrimKind::Float),
            Value::Str(_) => Some(PrimKind::Str),
            Value::Bytes(_) => Some(PrimKind::Bytes),
            Value::None
            | Value::Seq(_)
            | Value::Set(_)
            | Value::Map(_)
            | Value::Tuple(_)
            | Value::Record(_, _)
            | Value::Member(_, _, _) => None,
        }
    }

    /// Returns true for values that can appear in literal sets and enums.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::None) || self.prim_kind().is_some()
    }

    /// The canonical token of a scalar value. Parsing this token with the
    /// primitive parser of the same kind gives back an equal value.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use infer_parser::value::Value;
    ///
    /// assert_eq!(Value::Float(3.0).to_token().as_deref(), Some("3.0"));
    /// assert_eq!(Value::Bytes(vec![0, 255]).to_token().as_deref(), Some("00ff"));
    /// assert_eq!(Value::Seq(vec![]).to_token(), None);
    /// ```
    pub fn to_token(&self) -> Option<String> {
        match self {
            Value::Bool(true) => Some("true".to_owned()),
            Value::Bool(false) => Some("false".to_owned()),
            Value::Int(int) => Some(int.to_string()),
            Value::Float(float) => Some(format!("{float:?}")),
            Value::Str(string) => Some(string.clone()),
            Value::Bytes(bytes) => Some(bytes.iter().map(|byte| format!("{byte:02x}")).collect()),
            Value::None
            | Value::Seq(_)
            | Value::Set(_)
            | Value::Map(_)
            | Value::Tuple(_)
            | Value::Record(_, _)
            | Value::Member(_, _, _) => None,
        }
    }

    /// Lookup a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(_, fields) => fields
                .iter()
                .find(|(label, _)| label.resolve() == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

/// Floats are compared by numeric value, except that `NaN` is equal to
/// itself. This keeps equality reflexive so that values can be used as
/// cache keys and checked for duplicates.
fn float_eq(x: f64, y: f64) -> bool {
    x == y || (x.is_nan() && y.is_nan())
}

fn float_hash<H: Hasher>(x: f64, state: &mut H) {
    let bits = if x.is_nan() {
        f64::NAN.to_bits()
    } else if x == 0.0 {
        0
    } else {
        x.to_bits()
    };
    bits.hash(state)
}

/// Sets and mappings are equal when they hold the same elements or entries,
/// in any order.
fn unordered_eq<T: PartialEq>(xs: &[T], ys: &[T]) -> bool {
    let count = |items: &[T], item: &T| items.iter().filter(|other| *other == item).count();
    xs.len() == ys.len() && xs.iter().all(|x| count(xs, x) == count(ys, x))
}

/// Combine the hashes of the items with a commutative sum, so that the
/// result does not depend on their order.
fn unordered_hash<T: Hash, H: Hasher>(items: &[T], state: &mut H) {
    let sum = (items.iter()).fold(0u64, |sum, item| sum.wrapping_add(fxhash::hash64(item)));
    items.len().hash(state);
    sum.hash(state);
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => float_eq(*x, *y),
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Bytes(x), Value::Bytes(y)) => x == y,
            (Value::Seq(xs), Value::Seq(ys)) | (Value::Tuple(xs), Value::Tuple(ys)) => xs == ys,
            (Value::Set(xs), Value::Set(ys)) => unordered_eq(xs, ys),
            (Value::Map(xs), Value::Map(ys)) => unordered_eq(xs, ys),
            (Value::Record(x_name, xs), Value::Record(y_name, ys)) => x_name == y_name && xs == ys,
            (Value::Member(x_enum, x_name, x), Value::Member(y_enum, y_name, y)) => {
                x_enum == y_enum && x_name == y_name && x == y
            }
            (_, _) => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::None => {}
            Value::Bool(x) => x.hash(state),
            Value::Int(x) => x.hash(state),
            Value::Float(x) => float_hash(*x, state),
            Value::Str(x) => x.hash(state),
            Value::Bytes(x) => x.hash(state),
            Value::Seq(xs) | Value::Tuple(xs) => xs.hash(state),
            Value::Set(xs) => unordered_hash(xs, state),
            Value::Map(entries) => unordered_hash(entries, state),
            Value::Record(name, fields) => {
                name.hash(state);
                fields.hash(state);
            }
            Value::Member(enum_name, name, value) => {
                enum_name.hash(state);
                name.hash(state);
                value.hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::Str(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = crate::core::pretty::Context::new().value(self);
        write!(f, "{}", doc.pretty(usize::MAX))
    }
}

/// Raw input, already split into tokens by the caller.
///
/// Scalars arrive either as untyped [tokens][Input::Token] (typically from a
/// command line) or as loosely typed [booleans][Input::Bool],
/// [integers][Input::Int] and [floats][Input::Float] (typically from a JSON
/// or TOML document). Containers, tuples and records expect a
/// [sequence][Input::Seq] or a [named mapping][Input::Map].
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// The designated "nothing was supplied" sentinel.
    Absent,
    Token(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Seq(Vec<Input>),
    Map(Vec<(String, Input)>),
}

impl Input {
    pub fn token(token: impl Into<String>) -> Input {
        Input::Token(token.into())
    }

    /// A sequence of tokens.
    pub fn tokens<T: Into<String>>(tokens: impl IntoIterator<Item = T>) -> Input {
        Input::Seq(tokens.into_iter().map(Input::token).collect())
    }

    /// A named mapping of tokens.
    pub fn named<K: Into<String>, T: Into<String>>(
        entries: impl IntoIterator<Item = (K, T)>,
    ) -> Input {
        Input::Map(
            (entries.into_iter())
                .map(|(key, token)| (key.into(), Input::token(token)))
                .collect(),
        )
    }

    /// Describes what kind of input this is, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Input::Absent => "no value",
            Input::Token(_) => "a token",
            Input::Bool(_) => "a boolean",
            Input::Int(_) => "an integer",
            Input::Float(_) => "a float",
            Input::Seq(_) => "a sequence",
            Input::Map(_) => "named values",
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Absent => write!(f, "<absent>"),
            Input::Token(token) => write!(f, "{token:?}"),
            Input::Bool(value) => write!(f, "{value}"),
            Input::Int(value) => write!(f, "{value}"),
            Input::Float(value) => write!(f, "{value:?}"),
            Input::Seq(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Input::Map(entries) => {
                write!(f, "{{")?;
                for (index, (key, item)) in entries.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}={item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
