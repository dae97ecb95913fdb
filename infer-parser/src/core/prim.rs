//! Primitive parsers.
//!
//! Each primitive has an exact, total conversion rule. Tokens are never
//! trimmed: surrounding whitespace is an error, as is the empty token for
//! every primitive except strings and byte sequences.

use std::fmt;
use std::num::IntErrorKind;

use crate::core::PrimKind;
use crate::value::{Input, Value};

/// Tokens accepted as `true` by the boolean parser, compared
/// case-insensitively.
pub const TRUTHY_TOKENS: &[&str] = &["1", "t", "true", "y", "yes"];

/// Tokens accepted as `false` by the boolean parser, compared
/// case-insensitively.
pub const FALSY_TOKENS: &[&str] = &["0", "f", "false", "n", "no"];

/// Why a primitive could not be parsed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimError {
    /// The token was empty.
    Empty,
    /// The token does not follow the syntax of the primitive.
    Malformed,
    /// The integer does not fit in 64 bits.
    OutOfRange,
    /// The loosely typed input could only be converted with a loss of
    /// precision.
    Inexact,
    /// The input was not a token, or a scalar of the right type.
    UnexpectedInput(&'static str),
}

impl fmt::Display for PrimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimError::Empty => write!(f, "the token is empty"),
            PrimError::Malformed => write!(f, "the token is malformed"),
            PrimError::OutOfRange => write!(f, "the number does not fit in 64 bits"),
            PrimError::Inexact => write!(f, "the number cannot be converted exactly"),
            PrimError::UnexpectedInput(found) => write!(f, "found {found}"),
        }
    }
}

/// Parse a raw input as a primitive.
pub fn parse(kind: PrimKind, input: &Input) -> Result<Value, PrimError> {
    match (kind, input) {
        (_, Input::Token(token)) => parse_token(kind, token),
        (PrimKind::Bool, Input::Bool(value)) => Ok(Value::Bool(*value)),
        (PrimKind::Int, Input::Int(value)) => Ok(Value::Int(*value)),
        (PrimKind::Float, Input::Float(value)) => Ok(Value::Float(*value)),
        (PrimKind::Float, Input::Int(value)) => int_to_float(*value),
        (_, input) => Err(PrimError::UnexpectedInput(input.describe())),
    }
}

/// Parse a token as a primitive.
pub fn parse_token(kind: PrimKind, token: &str) -> Result<Value, PrimError> {
    match kind {
        PrimKind::Bool => parse_bool(token).map(Value::Bool),
        PrimKind::Int => parse_int(token).map(Value::Int),
        PrimKind::Float => parse_float(token).map(Value::Float),
        PrimKind::Str => Ok(Value::Str(token.to_owned())),
        PrimKind::Bytes => parse_bytes(token).map(Value::Bytes),
    }
}

pub fn parse_bool(token: &str) -> Result<bool, PrimError> {
    if token.is_empty() {
        return Err(PrimError::Empty);
    }

    let matches = |tokens: &[&str]| tokens.iter().any(|t| t.eq_ignore_ascii_case(token));
    if matches(TRUTHY_TOKENS) {
        Ok(true)
    } else if matches(FALSY_TOKENS) {
        Ok(false)
    } else {
        Err(PrimError::Malformed)
    }
}

/// An optional sign followed by one or more decimal digits.
pub fn parse_int(token: &str) -> Result<i64, PrimError> {
    if token.is_empty() {
        return Err(PrimError::Empty);
    }

    token.parse().map_err(|error: std::num::ParseIntError| match error.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => PrimError::OutOfRange,
        IntErrorKind::Empty => PrimError::Empty,
        _ => PrimError::Malformed,
    })
}

/// Decimal or exponent notation, or one of `inf`, `infinity` and `nan`,
/// with an optional sign.
pub fn parse_float(token: &str) -> Result<f64, PrimError> {
    if token.is_empty() {
        return Err(PrimError::Empty);
    }

    token.parse().map_err(|_| PrimError::Malformed)
}

/// Pairs of hexadecimal digits, in either case.
pub fn parse_bytes(token: &str) -> Result<Vec<u8>, PrimError> {
    if token.len() % 2 != 0 || !token.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(PrimError::Malformed);
    }

    (0..token.len())
        .step_by(2)
        .map(|start| {
            u8::from_str_radix(&token[start..start + 2], 16).map_err(|_| PrimError::Malformed)
        })
        .collect()
}

fn int_to_float(value: i64) -> Result<Value, PrimError> {
    let float = value as f64;
    // `i64::MAX as f64` rounds up to 2^63, which is out of range for `i64`,
    // so check the range before converting back.
    if float >= -(2f64.powi(63)) && float < 2f64.powi(63) && float as i64 == value {
        Ok(Value::Float(float))
    } else {
        Err(PrimError::Inexact)
    }
}

/// Returns true if the input is the absent sentinel, or one of the
/// configured absent tokens.
pub fn is_absent(input: &Input, absent_tokens: &[String]) -> bool {
    match input {
        Input::Absent => true,
        Input::Token(token) => absent_tokens.iter().any(|absent| absent == token),
        _ => false,
    }
}
