//! Decoding of literals in the type syntax into values.

use logos::Logos;
use std::ops::Range;

use crate::core::prim;
use crate::reporting::SyntaxError;
use crate::value::Value;

/// The contents of a string literal, between the quotes. Escapes are the
/// ones that `{:?}` produces.
#[derive(Debug, Clone, PartialEq, Logos)]
enum StringPiece<'source> {
    #[regex(r"[^\\]+")]
    Text(&'source str),
    #[token(r"\\", |_| '\\')]
    #[token(r#"\""#, |_| '"')]
    #[token(r"\'", |_| '\'')]
    #[token(r"\n", |_| '\n')]
    #[token(r"\t", |_| '\t')]
    #[token(r"\r", |_| '\r')]
    #[token(r"\0", |_| '\0')]
    #[regex(r"\\u\{[0-9a-fA-F]+\}", unicode_escape)]
    Escape(char),

    #[error]
    Error,
}

/// Decode the hex digits of `\u{...}`, which must name a scalar value.
fn unicode_escape<'source>(
    lexer: &mut logos::Lexer<'source, StringPiece<'source>>,
) -> Option<char> {
    let slice = lexer.slice();
    let digits = &slice[3..(slice.len() - 1)];
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}

fn invalid(range: Range<usize>, message: impl Into<String>) -> SyntaxError {
    SyntaxError::InvalidLiteral {
        range,
        message: message.into(),
    }
}

/// An integer, or a float if it has a fraction, an exponent, or is `inf`
/// or `NaN` with a sign.
pub fn number(range: Range<usize>, number: &str) -> Result<Value, SyntaxError> {
    let parsed = match number.contains(|c| matches!(c, '.' | 'e' | 'E' | 'n' | 'N')) {
        true => prim::parse_float(number).map(Value::Float),
        false => prim::parse_int(number).map(Value::Int),
    };
    parsed.map_err(|error| invalid(range, error.to_string()))
}

/// A string literal, without its quotes. `range` covers the quotes.
pub fn string(range: Range<usize>, contents: &str) -> Result<Value, SyntaxError> {
    let mut lexer = StringPiece::lexer(contents);
    let mut out = String::with_capacity(contents.len());

    while let Some(piece) = lexer.next() {
        match piece {
            StringPiece::Text(text) => out.push_str(text),
            StringPiece::Escape(c) => out.push(c),
            StringPiece::Error => {
                let span = lexer.span();
                let start = range.start + 1;
                return Err(invalid(
                    (start + span.start)..(start + span.end),
                    format!("unknown escape `{}`", lexer.slice()),
                ));
            }
        }
    }

    Ok(Value::Str(out))
}

/// The hex digits of a bytes literal.
pub fn bytes(range: Range<usize>, hex: &str) -> Result<Value, SyntaxError> {
    prim::parse_bytes(hex)
        .map(Value::Bytes)
        .map_err(|_| invalid(range, "expected pairs of hex digits"))
}

/// The literals that are written as names.
pub fn named(range: Range<usize>, name: &str) -> Result<Value, SyntaxError> {
    match name {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        "None" => Ok(Value::None),
        "inf" => Ok(Value::Float(f64::INFINITY)),
        "NaN" => Ok(Value::Float(f64::NAN)),
        _ => Err(invalid(range, format!("`{name}` is not a literal"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(number(0..2, "42"), Ok(Value::Int(42)));
        assert_eq!(number(0..3, "-42"), Ok(Value::Int(-42)));
        assert_eq!(number(0..4, "2.50"), Ok(Value::Float(2.5)));
        assert_eq!(number(0..3, "1e3"), Ok(Value::Float(1000.0)));
        assert_eq!(number(0..4, "-inf"), Ok(Value::Float(f64::NEG_INFINITY)));
        assert_eq!(number(0..4, "+inf"), Ok(Value::Float(f64::INFINITY)));
        assert_eq!(number(0..4, "-NaN"), Ok(Value::Float(f64::NAN)));
        assert!(matches!(
            number(0..20, "99999999999999999999"),
            Err(SyntaxError::InvalidLiteral { range, .. }) if range == (0..20),
        ));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            string(0..20, r#"a\"b\\c\n\t\r\0\'"#),
            Ok(Value::from("a\"b\\c\n\t\r\0'")),
        );
        assert_eq!(string(0..10, r"\u{e9}\u{1F600}"), Ok(Value::from("é😀")));
        assert_eq!(string(0..2, ""), Ok(Value::from("")));
    }

    #[test]
    fn invalid_escapes() {
        // The range of the error is within the quotes: `"ab\q"` at 10..16.
        assert!(matches!(
            string(10..16, r"ab\q"),
            Err(SyntaxError::InvalidLiteral { range, .. }) if range.start == 13,
        ));
        assert!(string(0..12, r"\u{110000}").is_err());
        assert!(string(0..5, r"\u{}").is_err());
    }

    #[test]
    fn named_literals() {
        assert_eq!(named(0..4, "true"), Ok(Value::Bool(true)));
        assert_eq!(named(0..4, "None"), Ok(Value::None));
        assert_eq!(named(0..3, "NaN"), Ok(Value::Float(f64::NAN)));
        assert!(matches!(
            named(0..3, "yes"),
            Err(SyntaxError::InvalidLiteral { .. }),
        ));
    }
}
