//! Errors reported while resolving types and parsing input.
//!
//! These can be converted to [`Diagnostic`]s in order to present them to the
//! user.
//!
//! [`Diagnostic`]: codespan_reporting::diagnostic::Diagnostic

use codespan_reporting::diagnostic::{Diagnostic, Label};
use itertools::Itertools;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::core::prim::PrimError;
use crate::core::{Marker, PrimKind, Shape, TypeSpec};
use crate::symbol::Symbol;
use crate::value::{Input, Value};

/// A failure to parse some input as a type.
///
/// Errors form a tree: composite parsers wrap the error of the element,
/// field or candidate that failed, so the whole path to the offending token
/// is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    input: Input,
    expected: Arc<TypeSpec>,
    kind: ErrorKind,
    children: Vec<ParseError>,
}

/// Why an input could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// A malformed token for an atomic type.
    PrimitiveParseFailure { kind: PrimKind, error: PrimError },
    /// Something other than the absent sentinel was given to `None`.
    NotAbsent,
    /// The input is not exactly one of a closed set of values.
    InvalidLiteral {
        allowed: Vec<String>,
        suggestion: Option<String>,
    },
    /// The input was a token where a sequence was expected, or similar.
    UnexpectedShape { expected: Shape },
    /// A tuple was given the wrong number of items.
    ArityMismatch { expected: usize, found: usize },
    /// A record was given a field it does not declare.
    UnknownField {
        field: String,
        suggestion: Option<Symbol>,
    },
    /// A record field without a default was not given.
    MissingField { field: Symbol },
    /// A mapping entry was not a key-value pair.
    MalformedEntry,
    /// The same element appeared twice in a set.
    DuplicateElement { value: Value },
    /// The same key appeared twice in a mapping or record.
    DuplicateKey { key: Value },
    /// Every candidate of a union failed. One child per candidate.
    NoMatchingUnionCandidate,
    /// A sequence element failed to parse. One child.
    InElement { index: usize },
    /// A mapping key failed to parse. One child.
    InKey { index: usize },
    /// A mapping value failed to parse. One child.
    InValue { index: usize },
    /// A record field failed to parse. One child.
    InField { field: Symbol },
    /// A custom parser rejected the input.
    Custom { reason: String },
}

impl ParseError {
    pub fn new(input: &Input, expected: &Arc<TypeSpec>, kind: ErrorKind) -> ParseError {
        ParseError {
            input: input.clone(),
            expected: expected.clone(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ParseError>) -> ParseError {
        self.children = children;
        self
    }

    /// Wrap an error with the context it occurred in.
    pub fn wrap(self, input: &Input, expected: &Arc<TypeSpec>, kind: ErrorKind) -> ParseError {
        ParseError::new(input, expected, kind).with_children(vec![self])
    }

    /// The offending input.
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// The type the input was checked against.
    pub fn expected(&self) -> &TypeSpec {
        &self.expected
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Errors of the elements, fields or candidates that caused this error.
    pub fn children(&self) -> &[ParseError] {
        &self.children
    }

    /// The deepest error along the chain of single-child context wrappers.
    pub fn root_cause(&self) -> &ParseError {
        match (&self.kind, self.children.as_slice()) {
            (
                ErrorKind::InElement { .. }
                | ErrorKind::InKey { .. }
                | ErrorKind::InValue { .. }
                | ErrorKind::InField { .. },
                [child],
            ) => child.root_cause(),
            (_, _) => self,
        }
    }

    /// Extra information that does not fit on the headline.
    fn notes(&self) -> Vec<String> {
        match &self.kind {
            ErrorKind::InvalidLiteral {
                allowed,
                suggestion,
            } => std::iter::empty()
                .chain(format_expected(allowed))
                .chain(suggestion.iter().map(|s| format!("help: did you mean {s}?")))
                .collect(),
            ErrorKind::UnknownField {
                suggestion: Some(field),
                ..
            } => vec![format!("help: did you mean `{field}`?")],
            _ => Vec::new(),
        }
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&format!("{indent}{self}"));
        for note in self.notes() {
            out.push_str(&format!("\n{indent}  {note}"));
        }
        for child in &self.children {
            out.push('\n');
            child.write_tree(out, depth + 1);
        }
    }

    /// Render the error and all of its causes as an indented tree.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    pub fn to_diagnostic<FileId>(&self) -> Diagnostic<FileId> {
        let notes = self.notes().into_iter().chain(self.children.iter().map(|child| {
            let mut out = String::new();
            child.write_tree(&mut out, 0);
            out
        }));

        Diagnostic::error()
            .with_message(self.to_string())
            .with_notes(notes.collect())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = &self.input;
        match &self.kind {
            ErrorKind::PrimitiveParseFailure { kind, error } => {
                write!(f, "cannot parse {input} as {kind}: {error}")
            }
            ErrorKind::NotAbsent => write!(f, "expected no value, found {input}"),
            ErrorKind::InvalidLiteral { .. } => {
                write!(f, "{input} is not a permitted value of `{}`", self.expected)
            }
            ErrorKind::UnexpectedShape { expected } => {
                write!(f, "expected {expected}, found {}", input.describe())
            }
            ErrorKind::ArityMismatch { expected, found } => write!(
                f,
                "expected {expected} {}, found {found}",
                if *expected == 1 { "value" } else { "values" },
            ),
            ErrorKind::UnknownField { field, .. } => write!(f, "unknown field `{field}`"),
            ErrorKind::MissingField { field } => write!(f, "missing field `{field}`"),
            ErrorKind::MalformedEntry => {
                write!(f, "expected a key-value pair, found {input}")
            }
            ErrorKind::DuplicateElement { value } => write!(f, "duplicate element {value}"),
            ErrorKind::DuplicateKey { key } => write!(f, "duplicate key {key}"),
            ErrorKind::NoMatchingUnionCandidate => write!(
                f,
                "{input} does not match any alternative of `{}`",
                self.expected,
            ),
            ErrorKind::InElement { index } => write!(f, "invalid element at index {index}"),
            ErrorKind::InKey { index } => write!(f, "invalid key at index {index}"),
            ErrorKind::InValue { index } => write!(f, "invalid value at index {index}"),
            ErrorKind::InField { field } => write!(f, "invalid value for field `{field}`"),
            ErrorKind::Custom { reason } => {
                write!(f, "cannot parse {input} as `{}`: {reason}", self.expected)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.children
            .first()
            .map(|child| child as &(dyn std::error::Error + 'static))
    }
}

/// A type that the registry does not know how to parse.
///
/// This indicates a mistake in the program that built the type, rather than
/// bad input, so it is reported when the parser is derived and never while
/// parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveError {
    ty: TypeSpec,
    reason: Unsupported,
}

/// Why a type is not supported.
#[derive(Debug, Clone, PartialEq)]
pub enum Unsupported {
    /// A custom type without a registered factory.
    UnregisteredMarker(Marker),
    EmptyTuple,
    EmptyUnion,
    EmptyLiteral,
    EmptyEnum,
    /// Literal and enum values must be scalars.
    NonScalarValue(Value),
    DuplicateLiteral(Value),
    DuplicateMember(Symbol),
    DuplicateField(Symbol),
    /// The default of a field is not a value of the field's type.
    InvalidDefault(Symbol, Value),
    /// A custom factory refused to build a parser.
    Factory(Marker, String),
}

impl ResolveError {
    pub fn new(ty: &TypeSpec, reason: Unsupported) -> ResolveError {
        ResolveError {
            ty: ty.clone(),
            reason,
        }
    }

    /// The type that could not be resolved.
    pub fn ty(&self) -> &TypeSpec {
        &self.ty
    }

    pub fn reason(&self) -> &Unsupported {
        &self.reason
    }

    pub fn to_diagnostic<FileId>(&self) -> Diagnostic<FileId> {
        let notes = match &self.reason {
            Unsupported::UnregisteredMarker(marker) => vec![format!(
                "register a parser factory for `{marker}` before resolving this type"
            )],
            Unsupported::NonScalarValue(_) => {
                vec!["only `None`, booleans, numbers, strings and bytes are allowed".to_owned()]
            }
            _ => Vec::new(),
        };

        Diagnostic::error()
            .with_message(format!("unsupported type: {}", self.reason))
            .with_notes(
                std::iter::once(format!("in type `{}`", self.ty))
                    .chain(notes)
                    .collect(),
            )
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::UnregisteredMarker(marker) => {
                write!(f, "no parser is registered for `{marker}`")
            }
            Unsupported::EmptyTuple => write!(f, "tuples must have at least one element"),
            Unsupported::EmptyUnion => write!(f, "unions must have at least one candidate"),
            Unsupported::EmptyLiteral => write!(f, "literals must have at least one value"),
            Unsupported::EmptyEnum => write!(f, "enumerations must have at least one member"),
            Unsupported::NonScalarValue(value) => {
                write!(f, "{value} cannot be used as a literal value")
            }
            Unsupported::DuplicateLiteral(value) => write!(f, "literal value {value} is repeated"),
            Unsupported::DuplicateMember(name) => write!(f, "enum member `{name}` is repeated"),
            Unsupported::DuplicateField(name) => write!(f, "record field `{name}` is repeated"),
            Unsupported::InvalidDefault(name, value) => {
                write!(f, "the default {value} of field `{name}` does not have the field's type")
            }
            Unsupported::Factory(marker, reason) => {
                write!(f, "the parser factory for `{marker}` failed: {reason}")
            }
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported type `{}`: {}", self.ty, self.reason)
    }
}

impl std::error::Error for ResolveError {}

/// Either kind of failure from resolving and then running a parser in one
/// step.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Resolve(ResolveError),
    Parse(ParseError),
}

impl Error {
    pub fn to_diagnostic<FileId>(&self) -> Diagnostic<FileId> {
        match self {
            Error::Resolve(error) => error.to_diagnostic(),
            Error::Parse(error) => error.to_diagnostic(),
        }
    }
}

impl From<ResolveError> for Error {
    fn from(error: ResolveError) -> Error {
        Error::Resolve(error)
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Error {
        Error::Parse(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Resolve(error) => error.fmt(f),
            Error::Parse(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Resolve(error) => Some(error),
            Error::Parse(error) => Some(error),
        }
    }
}

/// Messages produced while reading the type syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    InvalidToken {
        range: Range<usize>,
    },
    UnexpectedToken {
        range: Range<usize>,
        token: String,
        expected: Vec<String>,
    },
    UnexpectedEof {
        range: Range<usize>,
        expected: Vec<String>,
    },
    /// A builtin that takes arguments was used without them, or with the
    /// wrong number of them. Also used for names that take no arguments.
    BuiltinArity {
        range: Range<usize>,
        name: String,
        expected: &'static str,
        found: usize,
    },
    InvalidLiteral {
        range: Range<usize>,
        message: String,
    },
}

impl SyntaxError {
    /// Convert an error from the generated type parser. Tokens are quoted
    /// from the source, and the expected terminals are described the way
    /// they appear in the syntax.
    pub fn from_lalrpop<T>(
        source: &str,
        error: lalrpop_util::ParseError<usize, T, SyntaxError>,
    ) -> SyntaxError {
        use lalrpop_util::ParseError::*;

        let quote = |range: Range<usize>| format!("`{}`", &source[range]);

        match error {
            InvalidToken { location } => SyntaxError::InvalidToken {
                range: location..location,
            },
            UnrecognizedEOF { location, expected } => SyntaxError::UnexpectedEof {
                range: location..location,
                expected: describe_terminals(expected),
            },
            UnrecognizedToken {
                token: (start, _, end),
                expected,
            } => SyntaxError::UnexpectedToken {
                range: start..end,
                token: quote(start..end),
                expected: describe_terminals(expected),
            },
            ExtraToken {
                token: (start, _, end),
            } => SyntaxError::UnexpectedToken {
                range: start..end,
                token: quote(start..end),
                expected: vec!["end of type".to_owned()],
            },
            User { error } => error,
        }
    }

    pub fn range(&self) -> Range<usize> {
        match self {
            SyntaxError::InvalidToken { range }
            | SyntaxError::UnexpectedToken { range, .. }
            | SyntaxError::UnexpectedEof { range, .. }
            | SyntaxError::BuiltinArity { range, .. }
            | SyntaxError::InvalidLiteral { range, .. } => range.clone(),
        }
    }

    pub fn to_diagnostic<FileId>(&self, file_id: FileId) -> Diagnostic<FileId> {
        let label = Label::primary(file_id, self.range());

        match self {
            SyntaxError::InvalidToken { .. } => Diagnostic::error()
                .with_message("invalid token")
                .with_labels(vec![label]),
            SyntaxError::UnexpectedToken {
                token, expected, ..
            } => Diagnostic::error()
                .with_message(format!("unexpected token {token}"))
                .with_labels(vec![label.with_message("unexpected token")])
                .with_notes(format_expected(expected).into_iter().collect()),
            SyntaxError::UnexpectedEof { expected, .. } => Diagnostic::error()
                .with_message("unexpected end of type")
                .with_labels(vec![label.with_message("unexpected end of type")])
                .with_notes(format_expected(expected).into_iter().collect()),
            SyntaxError::BuiltinArity {
                name,
                expected,
                found,
                ..
            } => Diagnostic::error()
                .with_message(format!(
                    "`{name}` expects {expected}, but {found} {} given",
                    if *found == 1 { "was" } else { "were" },
                ))
                .with_labels(vec![label]),
            SyntaxError::InvalidLiteral { message, .. } => Diagnostic::error()
                .with_message("invalid literal")
                .with_labels(vec![label.with_message(message.clone())]),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diagnostic = self.to_diagnostic(());
        write!(f, "{}", diagnostic.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Terminals come quoted from the grammar, as in `"\"]\""`. Punctuation and
/// keywords are shown in backticks, token classes like `name` as they are.
fn describe_terminals(expected: Vec<String>) -> Vec<String> {
    const CLASSES: [&str; 4] = ["name", "string literal", "bytes literal", "number literal"];

    (expected.into_iter())
        .map(|terminal| {
            let terminal = terminal.trim_matches('"');
            match CLASSES.contains(&terminal) {
                true => terminal.to_owned(),
                false => format!("`{terminal}`"),
            }
        })
        .collect()
}

fn format_expected(expected: &[impl fmt::Display]) -> Option<String> {
    expected.split_last().map(|items| match items {
        (last, []) => format!("expected {last}"),
        (last, expected) => format!("expected one of {} or {last}", expected.iter().format(", ")),
    })
}
