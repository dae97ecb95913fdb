//! Parsers derived from type specifications.
//!
//! A [`Parser`] is a tree of nodes mirroring the [`TypeSpec`] it was built
//! from. Parsers are built by the [registry][crate::registry::Registry], which
//! checks the type first, so the nodes here can assume a well formed type:
//! tuples and unions are never empty, literal values are scalars, and so on.

use fxhash::FxHashSet;
use std::fmt;
use std::sync::Arc;

use crate::core::prim;
use crate::core::{EnumSpec, PrimKind, Shape, TypeSpec};
use crate::reporting::{ErrorKind, ParseError};
use crate::symbol::{self, Symbol};
use crate::value::{Input, Value};

/// The result of running a parser.
pub type ParseResult = Result<Value, ParseError>;

type CustomFn = dyn Fn(&Input) -> Result<Value, String> + Send + Sync;
type RefineFn = dyn Fn(Value) -> Result<Value, String> + Send + Sync;

/// A parser for one type.
///
/// Parsers are pure and cheap to clone, and can be shared between threads.
#[derive(Clone)]
pub struct Parser(Arc<ParserData>);

struct ParserData {
    spec: Arc<TypeSpec>,
    node: Node,
}

pub(crate) enum Node {
    Prim(PrimKind),
    None(Arc<[String]>),
    Literal(Vec<Value>, Arc<[String]>),
    Enum(EnumSpec, Arc<[String]>),
    Sequence(Parser),
    Set(Parser),
    Mapping(Parser, Parser),
    Tuple(Vec<Parser>),
    Record(Option<Symbol>, Vec<FieldParser>),
    Union(Vec<Parser>),
    Custom(Box<CustomFn>),
    Refine(Parser, Box<RefineFn>),
}

pub(crate) struct FieldParser {
    pub name: Symbol,
    pub default: Option<Value>,
    pub parser: Parser,
}

impl Parser {
    pub(crate) fn new(spec: &TypeSpec, node: Node) -> Parser {
        Parser(Arc::new(ParserData {
            spec: Arc::new(spec.clone()),
            node,
        }))
    }

    /// A parser implemented by a function, for use in parser factories.
    ///
    /// The function returns the reason the input was rejected on failure,
    /// which is reported as [`ErrorKind::Custom`].
    ///
    /// ## Example
    ///
    /// ```rust
    /// use infer_parser::core::TypeSpec;
    /// use infer_parser::parse::Parser;
    /// use infer_parser::value::{Input, Value};
    ///
    /// let parser = Parser::custom(TypeSpec::custom("upper"), |input| match input {
    ///     Input::Token(token) => Ok(Value::from(token.to_uppercase())),
    ///     _ => Err("expected a token".to_owned()),
    /// });
    ///
    /// assert_eq!(parser.parse(&Input::token("abc")), Ok(Value::from("ABC")));
    /// assert!(parser.parse(&Input::Absent).is_err());
    /// ```
    pub fn custom(
        spec: TypeSpec,
        parse: impl Fn(&Input) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Parser {
        Parser::new(&spec, Node::Custom(Box::new(parse)))
    }

    /// Run this parser, then check or transform its value.
    ///
    /// Errors from this parser are passed through unchanged. A rejected value
    /// is reported as [`ErrorKind::Custom`] against `spec`.
    pub fn refine(
        self,
        spec: TypeSpec,
        check: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Parser {
        Parser::new(&spec, Node::Refine(self, Box::new(check)))
    }

    /// Returns true if both handles point to the same parser.
    pub fn ptr_eq(&self, other: &Parser) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The type this parser was built for.
    pub fn spec(&self) -> &TypeSpec {
        &self.0.spec
    }

    /// Parse an input as this parser's type.
    ///
    /// Parsing never panics and has no side effects: the same input always
    /// gives the same value or error.
    pub fn parse(&self, input: &Input) -> ParseResult {
        let spec = &self.0.spec;
        let error = |kind| ParseError::new(input, spec, kind);

        match &self.0.node {
            Node::Prim(kind) => prim::parse(*kind, input).map_err(|e| {
                error(ErrorKind::PrimitiveParseFailure {
                    kind: *kind,
                    error: e,
                })
            }),
            Node::None(absent_tokens) => match prim::is_absent(input, absent_tokens) {
                true => Ok(Value::None),
                false => Err(error(ErrorKind::NotAbsent)),
            },
            Node::Literal(values, absent_tokens) => {
                if let Some(value) = (values.iter()).find(|v| matches_scalar(v, input, absent_tokens))
                {
                    return Ok(value.clone());
                }

                let suggestion = match input {
                    Input::Token(token) => symbol::closest_by(
                        token,
                        values.iter().filter_map(|value| match value {
                            Value::Str(string) => Some((string.as_str(), value)),
                            _ => None,
                        }),
                        |(string, _)| *string,
                    )
                    .map(|(_, value)| value.to_string()),
                    _ => None,
                };

                Err(error(ErrorKind::InvalidLiteral {
                    allowed: values.iter().map(Value::to_string).collect(),
                    suggestion,
                }))
            }
            Node::Enum(enum_spec, absent_tokens) => {
                let members = &enum_spec.members;
                let member = |(name, value): &(Symbol, Value)| {
                    Value::Member(enum_spec.name, *name, Box::new(value.clone()))
                };

                if let Input::Token(token) = input {
                    if let Some(found) = members.iter().find(|(n, _)| n.resolve() == token.as_str()) {
                        return Ok(member(found));
                    }
                }
                if let Some(found) = (members.iter())
                    .find(|(_, value)| matches_scalar(value, input, absent_tokens))
                {
                    return Ok(member(found));
                }

                let suggestion = match input {
                    Input::Token(token) => {
                        Symbol::closest(token, members.iter().map(|(name, _)| *name))
                    }
                    _ => None,
                };

                Err(error(ErrorKind::InvalidLiteral {
                    allowed: (members.iter())
                        .map(|(name, _)| format!("`{name}`"))
                        .collect(),
                    suggestion: suggestion.map(|name| format!("`{name}`")),
                }))
            }
            Node::Sequence(elem) => {
                let items = expect_seq(input).ok_or_else(|| unexpected_shape(input, spec))?;
                parse_elems(input, spec, elem, items).map(Value::Seq)
            }
            Node::Set(elem) => {
                let items = expect_seq(input).ok_or_else(|| unexpected_shape(input, spec))?;
                let elems = parse_elems(input, spec, elem, items)?;

                let mut seen = FxHashSet::default();
                for value in &elems {
                    if !seen.insert(value) {
                        return Err(error(ErrorKind::DuplicateElement {
                            value: value.clone(),
                        }));
                    }
                }
                Ok(Value::Set(elems))
            }
            Node::Mapping(key_parser, value_parser) => {
                let entries: Vec<(Input, Input)> = match input {
                    Input::Map(entries) => (entries.iter())
                        .map(|(key, value)| (Input::token(key.as_str()), value.clone()))
                        .collect(),
                    Input::Seq(items) => (items.iter())
                        .map(|item| match item {
                            Input::Seq(pair) if pair.len() == 2 => {
                                Ok((pair[0].clone(), pair[1].clone()))
                            }
                            _ => Err(ParseError::new(item, spec, ErrorKind::MalformedEntry)),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    _ => return Err(unexpected_shape(input, spec)),
                };

                let mut seen = FxHashSet::default();
                let mut map = Vec::with_capacity(entries.len());
                for (index, (key, value)) in entries.iter().enumerate() {
                    let key = (key_parser.parse(key))
                        .map_err(|e| e.wrap(input, spec, ErrorKind::InKey { index }))?;
                    let value = (value_parser.parse(value))
                        .map_err(|e| e.wrap(input, spec, ErrorKind::InValue { index }))?;

                    if !seen.insert(key.clone()) {
                        return Err(error(ErrorKind::DuplicateKey { key }));
                    }
                    map.push((key, value));
                }
                Ok(Value::Map(map))
            }
            Node::Tuple(elems) => {
                let items = expect_seq(input).ok_or_else(|| unexpected_shape(input, spec))?;
                if items.len() != elems.len() {
                    return Err(error(ErrorKind::ArityMismatch {
                        expected: elems.len(),
                        found: items.len(),
                    }));
                }

                let values = (elems.iter().zip(items).enumerate())
                    .map(|(index, (elem, item))| {
                        (elem.parse(item))
                            .map_err(|e| e.wrap(input, spec, ErrorKind::InElement { index }))
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Value::Tuple(values))
            }
            Node::Record(name, fields) => {
                let entries = match input {
                    Input::Map(entries) => entries,
                    _ => return Err(unexpected_shape(input, spec)),
                };

                let mut given = vec![None; fields.len()];
                for (label, item) in entries {
                    let index = match fields.iter().position(|f| f.name.resolve() == label.as_str()) {
                        Some(index) => index,
                        None => {
                            let suggestion =
                                Symbol::closest(label, fields.iter().map(|field| field.name));
                            return Err(error(ErrorKind::UnknownField {
                                field: label.clone(),
                                suggestion,
                            }));
                        }
                    };
                    if given[index].replace(item).is_some() {
                        return Err(error(ErrorKind::DuplicateKey {
                            key: Value::from(label.as_str()),
                        }));
                    }
                }

                let mut values = Vec::with_capacity(fields.len());
                for (field, item) in fields.iter().zip(given) {
                    let value = match (item, &field.default) {
                        (Some(item), _) => field.parser.parse(item).map_err(|e| {
                            e.wrap(input, spec, ErrorKind::InField { field: field.name })
                        })?,
                        (None, Some(default)) => default.clone(),
                        (None, None) => field.parser.parse(&Input::Absent).map_err(|_| {
                            error(ErrorKind::MissingField { field: field.name })
                        })?,
                    };
                    values.push((field.name, value));
                }
                Ok(Value::Record(*name, values))
            }
            Node::Union(candidates) => {
                let mut errors = Vec::with_capacity(candidates.len());
                for candidate in candidates {
                    match candidate.parse(input) {
                        Ok(value) => return Ok(value),
                        Err(e) => errors.push(e),
                    }
                }
                Err(error(ErrorKind::NoMatchingUnionCandidate).with_children(errors))
            }
            Node::Custom(parse) => {
                parse(input).map_err(|reason| error(ErrorKind::Custom { reason }))
            }
            Node::Refine(parser, check) => {
                let value = parser.parse(input)?;
                check(value).map_err(|reason| error(ErrorKind::Custom { reason }))
            }
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parser").field(&self.0.spec.to_string()).finish()
    }
}

/// Returns true if the input parses to exactly this scalar value.
fn matches_scalar(value: &Value, input: &Input, absent_tokens: &[String]) -> bool {
    match value.prim_kind() {
        Some(kind) => prim::parse(kind, input).map_or(false, |parsed| parsed == *value),
        None => matches!(value, Value::None) && prim::is_absent(input, absent_tokens),
    }
}

fn expect_seq(input: &Input) -> Option<&[Input]> {
    match input {
        Input::Seq(items) => Some(items),
        _ => None,
    }
}

fn unexpected_shape(input: &Input, spec: &Arc<TypeSpec>) -> ParseError {
    let expected = match spec.shape() {
        Shape::Scalar => Shape::Seq,
        shape => shape,
    };
    ParseError::new(input, spec, ErrorKind::UnexpectedShape { expected })
}

fn parse_elems(
    input: &Input,
    spec: &Arc<TypeSpec>,
    elem: &Parser,
    items: &[Input],
) -> Result<Vec<Value>, ParseError> {
    (items.iter().enumerate())
        .map(|(index, item)| {
            (elem.parse(item)).map_err(|e| e.wrap(input, spec, ErrorKind::InElement { index }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absent() -> Arc<[String]> {
        Arc::from(vec!["None".to_owned()])
    }

    fn prim(kind: PrimKind) -> Parser {
        Parser::new(&TypeSpec::Prim(kind), Node::Prim(kind))
    }

    #[test]
    fn custom_errors_carry_the_reason() {
        let parser = Parser::custom(TypeSpec::custom("even"), |input| match input {
            Input::Token(token) if token.len() % 2 == 0 => Ok(Value::from(token.as_str())),
            _ => Err("odd length".to_owned()),
        });

        let error = parser.parse(&Input::token("abc")).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::Custom {
                reason: "odd length".to_owned()
            },
        );
        assert_eq!(error.expected(), &TypeSpec::custom("even"));
    }

    #[test]
    fn refine_passes_inner_errors_through() {
        let parser = prim(PrimKind::Int).refine(TypeSpec::annotated("port", TypeSpec::INT), |v| {
            match v {
                Value::Int(port) if (0..=65535).contains(&port) => Ok(v),
                _ => Err("not a port number".to_owned()),
            }
        });

        assert_eq!(parser.parse(&Input::token("80")), Ok(Value::Int(80)));
        assert!(matches!(
            parser.parse(&Input::token("http")).unwrap_err().kind(),
            ErrorKind::PrimitiveParseFailure { .. },
        ));
        assert!(matches!(
            parser.parse(&Input::token("99999")).unwrap_err().kind(),
            ErrorKind::Custom { .. },
        ));
    }

    #[test]
    fn literal_none_matches_absent_tokens() {
        let spec = TypeSpec::Literal(vec![Value::Int(1), Value::None]);
        let parser = Parser::new(&spec, Node::Literal(vec![Value::Int(1), Value::None], absent()));

        assert_eq!(parser.parse(&Input::token("None")), Ok(Value::None));
        assert_eq!(parser.parse(&Input::Absent), Ok(Value::None));
        assert_eq!(parser.parse(&Input::Int(1)), Ok(Value::Int(1)));
        assert!(parser.parse(&Input::token("2")).is_err());
    }

    #[test]
    fn tuple_arity_is_checked_first() {
        let spec = TypeSpec::tuple([TypeSpec::INT, TypeSpec::INT]);
        let parser = Parser::new(
            &spec,
            Node::Tuple(vec![prim(PrimKind::Int), prim(PrimKind::Int)]),
        );

        let error = parser.parse(&Input::tokens(["x", "y", "z"])).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::ArityMismatch {
                expected: 2,
                found: 3
            },
        );
        assert!(error.children().is_empty());
    }

    #[test]
    fn parsers_are_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<Parser>();
    }
}
