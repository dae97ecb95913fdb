//! Names with a meaning of their own in the type syntax.

use std::ops::Range;

use crate::core::{PrimKind, TypeSpec};
use crate::reporting::SyntaxError;

/// An argument between the brackets of `name[...]`.
pub enum Arg {
    Type(Range<usize>, TypeSpec),
    Ellipsis(Range<usize>),
}

/// Interpret a name, applied to `args` if it was followed by brackets.
///
/// Names that are not builtins are markers for registered parsers.
pub fn named(
    name: &str,
    range: Range<usize>,
    args: Option<Vec<Arg>>,
) -> Result<TypeSpec, SyntaxError> {
    let arity = |expected: &'static str, found: usize| SyntaxError::BuiltinArity {
        range: range.clone(),
        name: name.to_owned(),
        expected,
        found,
    };

    let args = match (args, expects(name)) {
        (None, None) => return Ok(nullary(name)),
        (Some(args), None) => return Err(arity("no arguments", args.len())),
        (None, Some(expected)) => return Err(arity(expected, 0)),
        (Some(args), Some(_)) => args,
    };

    match name {
        "tuple" => return tuple(args),
        "annotated" => return annotated(args, arity),
        _ => {}
    }

    let mut types = types(args)?;
    match (name, types.len()) {
        ("list", 1) => Ok(TypeSpec::sequence(types.remove(0))),
        ("set", 1) => Ok(TypeSpec::set(types.remove(0))),
        ("optional", 1) => Ok(TypeSpec::optional(types.remove(0))),
        ("dict", 2) => {
            let value = types.remove(1);
            Ok(TypeSpec::mapping(types.remove(0), value))
        }
        ("union", _) => Ok(TypeSpec::Union(types)),
        (name, found) => Err(arity(expects(name).unwrap_or("no arguments"), found)),
    }
}

/// What a builtin expects between its brackets, or `None` for names that
/// take no arguments.
fn expects(name: &str) -> Option<&'static str> {
    match name {
        "list" | "set" | "optional" => Some("one type"),
        "dict" => Some("two types"),
        "union" | "tuple" => Some("types"),
        "annotated" => Some("a type and a marker"),
        _ => None,
    }
}

fn nullary(name: &str) -> TypeSpec {
    match (name, PrimKind::from_name(name)) {
        (_, Some(kind)) => TypeSpec::Prim(kind),
        ("None", None) => TypeSpec::None,
        (marker, None) => TypeSpec::custom(marker),
    }
}

fn types(args: Vec<Arg>) -> Result<Vec<TypeSpec>, SyntaxError> {
    (args.into_iter())
        .map(|arg| match arg {
            Arg::Type(_, ty) => Ok(ty),
            Arg::Ellipsis(range) => Err(misplaced_ellipsis(range)),
        })
        .collect()
}

/// `tuple[a, b]`, or `tuple[a, ...]` for a sequence of any length.
fn tuple(mut args: Vec<Arg>) -> Result<TypeSpec, SyntaxError> {
    match matches!(args.as_slice(), [Arg::Type(..), Arg::Ellipsis(_)]) {
        true => {
            args.pop();
            let mut elems = types(args)?;
            Ok(TypeSpec::sequence(elems.remove(0)))
        }
        false => Ok(TypeSpec::Tuple(types(args)?)),
    }
}

/// `annotated[type, marker]`
fn annotated(
    args: Vec<Arg>,
    arity: impl Fn(&'static str, usize) -> SyntaxError,
) -> Result<TypeSpec, SyntaxError> {
    let found = args.len();
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(Arg::Type(_, inner)), Some(Arg::Type(_, TypeSpec::Custom(marker))), None) => {
            Ok(TypeSpec::Annotated(marker, Box::new(inner)))
        }
        (Some(Arg::Type(..)), Some(Arg::Type(range, ty)), None) => {
            Err(SyntaxError::UnexpectedToken {
                range,
                token: format!("`{ty}`"),
                expected: vec!["marker".to_owned()],
            })
        }
        (Some(Arg::Ellipsis(range)), ..) | (_, Some(Arg::Ellipsis(range)), _) => {
            Err(misplaced_ellipsis(range))
        }
        _ => Err(arity("a type and a marker", found)),
    }
}

fn misplaced_ellipsis(range: Range<usize>) -> SyntaxError {
    SyntaxError::UnexpectedToken {
        range,
        token: "`...`".to_owned(),
        expected: vec!["`...` only as the second of two elements of a tuple".to_owned()],
    }
}
