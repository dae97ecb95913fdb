//! The textual syntax of types.
//!
//! ```text
//! int | None
//! dict[str, list[float]]
//! tuple[int, str]
//! tuple[int, ...]
//! literal["debug", "info", 3]
//! enum Color[red, green = 2]
//! annotated[int, port]
//! Server {host: str, port: int = 8080}
//! ```
//!
//! Printing a type with [`Display`][std::fmt::Display] gives back text in
//! this syntax.

use lalrpop_util::lalrpop_mod;

use crate::core::TypeSpec;

lalrpop_mod!(grammar, "/surface/grammar.rs");

mod builtins;
mod lexer;

pub use crate::reporting::SyntaxError;

/// Parse a type from its textual syntax.
///
/// `enum` and `literal` are keywords. Other names are builtins (`int`,
/// `list`, `dict`, `None`, ...) or, when none of those, markers for
/// registered parsers.
///
/// ## Example
///
/// ```rust
/// use infer_parser::core::TypeSpec;
/// use infer_parser::surface::parse_type;
///
/// assert_eq!(
///     parse_type("optional[list[int]]"),
///     Ok(TypeSpec::optional(TypeSpec::sequence(TypeSpec::INT))),
/// );
/// ```
pub fn parse_type(source: &str) -> Result<TypeSpec, SyntaxError> {
    grammar::TypeParser::new()
        .parse(source, lexer::tokens(source))
        .map_err(|error| SyntaxError::from_lalrpop(source, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Field;

    #[track_caller]
    fn round_trip(source: &str) {
        let ty = parse_type(source).unwrap();
        assert_eq!(ty.to_string(), source);
        assert_eq!(parse_type(&ty.to_string()), Ok(ty));
    }

    #[test]
    fn canonical_types_round_trip() {
        round_trip("int");
        round_trip("None");
        round_trip("int | float | None");
        round_trip("(int | str) | None");
        round_trip("list[set[bytes]]");
        round_trip("dict[str, tuple[int, float]]");
        round_trip(r#"literal[1, -2.5, "a\"b", b"00ff", true, None]"#);
        round_trip("literal[-inf, inf, NaN]");
        round_trip("{timeout: float = -inf}");
        round_trip("enum Color[red, green = 2]");
        round_trip("enum[a, b]");
        round_trip("{x: int, y: int = 0}");
        round_trip(r#"Server {host: str, port: int | None = None, tag: str = "x"}"#);
        round_trip("annotated[int, port]");
        round_trip("union[int]");
        round_trip("list[port]");
    }

    #[test]
    fn sugar() {
        assert_eq!(
            parse_type("optional[int]"),
            Ok(TypeSpec::optional(TypeSpec::INT)),
        );
        assert_eq!(
            parse_type("tuple[str, ...]"),
            Ok(TypeSpec::sequence(TypeSpec::STR)),
        );
        assert_eq!(
            parse_type("list[int,]"),
            Ok(TypeSpec::sequence(TypeSpec::INT)),
        );
        assert_eq!(
            parse_type("union[int, float]"),
            Ok(TypeSpec::union([TypeSpec::INT, TypeSpec::FLOAT])),
        );
        assert_eq!(parse_type("tuple[]"), Ok(TypeSpec::Tuple(vec![])));
        assert_eq!(
            parse_type(r#"literal["\u{e9}\n"]"#),
            Ok(TypeSpec::literal(["é\n"])),
        );
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(
            parse_type("list[int"),
            Err(SyntaxError::UnexpectedEof { range, expected })
                if range == (8..8) && expected.contains(&"`]`".to_owned()),
        ));
        assert!(matches!(
            parse_type("int str"),
            Err(SyntaxError::UnexpectedToken { range, token, .. })
                if range == (4..7) && token == "`str`",
        ));
        assert_eq!(
            parse_type("dict[str]"),
            Err(SyntaxError::BuiltinArity {
                range: 0..4,
                name: "dict".to_owned(),
                expected: "two types",
                found: 1,
            }),
        );
        assert_eq!(
            parse_type("list"),
            Err(SyntaxError::BuiltinArity {
                range: 0..4,
                name: "list".to_owned(),
                expected: "one type",
                found: 0,
            }),
        );
        assert_eq!(
            parse_type("int[str]"),
            Err(SyntaxError::BuiltinArity {
                range: 0..3,
                name: "int".to_owned(),
                expected: "no arguments",
                found: 1,
            }),
        );
        assert!(matches!(
            parse_type("tuple[..., int]"),
            Err(SyntaxError::UnexpectedToken { range, .. }) if range == (6..9),
        ));
        assert!(matches!(
            parse_type("list[...]"),
            Err(SyntaxError::UnexpectedToken { range, .. }) if range == (5..8),
        ));
        assert!(matches!(
            parse_type("annotated[int, list[str]]"),
            Err(SyntaxError::UnexpectedToken { range, .. }) if range == (15..24),
        ));
        assert!(matches!(
            parse_type("literal[99999999999999999999]"),
            Err(SyntaxError::InvalidLiteral { .. }),
        ));
        assert!(matches!(
            parse_type(r#"literal["\q"]"#),
            Err(SyntaxError::InvalidLiteral { .. }),
        ));
        assert!(matches!(
            parse_type("literal[yes]"),
            Err(SyntaxError::InvalidLiteral { range, .. }) if range == (8..11),
        ));
        assert!(matches!(
            parse_type("{x int}"),
            Err(SyntaxError::UnexpectedToken { .. }),
        ));
        assert!(matches!(
            parse_type("int ~"),
            Err(SyntaxError::InvalidToken { range }) if range == (4..5),
        ));
    }

    #[test]
    fn keywords_and_builtins_are_not_markers() {
        assert!(matches!(
            parse_type("enum"),
            Err(SyntaxError::UnexpectedEof { .. }),
        ));
        assert!(parse_type("list[literal]").is_err());

        // Markers are printed as they are, so these do not read back.
        for marker in ["my-type", "list", "enum"] {
            let ty = TypeSpec::custom(marker);
            assert!(parse_type(&ty.to_string()).is_err(), "{ty}");
        }
        let record = TypeSpec::record(None, [Field::new("my-field", TypeSpec::INT)]);
        assert!(parse_type(&record.to_string()).is_err());
        assert_eq!(
            parse_type(&TypeSpec::custom("port").to_string()),
            Ok(TypeSpec::custom("port")),
        );
    }
}
