//! A pretty printer for type specifications and values.
//!
//! Types are printed in the [type syntax][crate::surface], so that printing
//! a type and parsing it back gives the same type.
//!
//! Example:
//!
//! ```
//! use infer_parser::core::pretty::Context;
//! use infer_parser::core::TypeSpec;
//!
//! let ty = TypeSpec::optional(TypeSpec::sequence(TypeSpec::INT));
//!
//! let pp = Context::new();
//! let doc = pp.ty(&ty);
//! assert_eq!(doc.pretty(80).to_string(), "list[int] | None");
//! ```

use pretty::RcDoc;

use crate::core::{EnumSpec, Field, RecordSpec, TypeSpec};
use crate::symbol::Symbol;
use crate::value::Value;

/// Type precedences
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Union = 0,
    Atomic,
}

const INDENT: isize = 4;

pub struct Context {}

impl Context {
    pub fn new() -> Context {
        Context {}
    }

    fn name(&self, name: Symbol) -> RcDoc<'static> {
        RcDoc::text(name.resolve())
    }

    fn paren(&self, wrap: bool, doc: RcDoc<'static>) -> RcDoc<'static> {
        if wrap {
            RcDoc::concat([RcDoc::text("("), doc, RcDoc::text(")")])
        } else {
            doc
        }
    }

    /// A comma separated list of documents between delimiters, broken over
    /// multiple lines when it does not fit.
    fn sequence(
        &self,
        open: &'static str,
        docs: impl IntoIterator<Item = RcDoc<'static>>,
        close: &'static str,
    ) -> RcDoc<'static> {
        let separator = RcDoc::text(",").append(RcDoc::line());
        RcDoc::concat([
            RcDoc::text(open),
            RcDoc::line_()
                .append(RcDoc::intersperse(docs, separator))
                .nest(INDENT),
            RcDoc::line_(),
            RcDoc::text(close),
        ])
        .group()
    }

    /// `head[arg, ...]`
    fn apply(
        &self,
        head: &'static str,
        args: impl IntoIterator<Item = RcDoc<'static>>,
    ) -> RcDoc<'static> {
        RcDoc::text(head).append(self.sequence("[", args, "]"))
    }

    pub fn ty(&self, ty: &TypeSpec) -> RcDoc<'static> {
        self.ty_prec(Prec::Union, ty)
    }

    fn ty_prec(&self, prec: Prec, ty: &TypeSpec) -> RcDoc<'static> {
        match ty {
            TypeSpec::Prim(kind) => RcDoc::text(kind.name()),
            TypeSpec::None => RcDoc::text("None"),
            TypeSpec::Literal(values) => {
                self.apply("literal", values.iter().map(|value| self.value(value)))
            }
            TypeSpec::Enum(spec) => self.enum_spec(spec),
            TypeSpec::Sequence(elem) => self.apply("list", [self.ty(elem)]),
            TypeSpec::Set(elem) => self.apply("set", [self.ty(elem)]),
            TypeSpec::Mapping(key, value) => self.apply("dict", [self.ty(key), self.ty(value)]),
            TypeSpec::Tuple(elems) => self.apply("tuple", elems.iter().map(|elem| self.ty(elem))),
            TypeSpec::Record(spec) => self.record_spec(spec),
            TypeSpec::Union(candidates) if candidates.len() < 2 => {
                self.apply("union", candidates.iter().map(|ty| self.ty(ty)))
            }
            TypeSpec::Union(candidates) => self.paren(
                prec > Prec::Union,
                RcDoc::intersperse(
                    candidates.iter().map(|ty| self.ty_prec(Prec::Atomic, ty)),
                    RcDoc::line().append(RcDoc::text("| ")),
                )
                .group(),
            ),
            TypeSpec::Custom(marker) => self.name(*marker),
            TypeSpec::Annotated(marker, inner) => {
                self.apply("annotated", [self.ty(inner), self.name(*marker)])
            }
        }
    }

    fn enum_spec(&self, spec: &EnumSpec) -> RcDoc<'static> {
        let members = spec.members.iter().map(|(name, value)| match value {
            Value::Str(string) if string == name.resolve() => self.name(*name),
            _ => RcDoc::concat([
                self.name(*name),
                RcDoc::text(" = "),
                self.value(value),
            ]),
        });

        let head = match spec.name {
            Some(name) => RcDoc::text("enum ").append(self.name(name)),
            None => RcDoc::text("enum"),
        };
        head.append(self.sequence("[", members, "]"))
    }

    fn record_spec(&self, spec: &RecordSpec) -> RcDoc<'static> {
        let fields = self.sequence("{", spec.fields.iter().map(|field| self.field(field)), "}");
        match spec.name {
            Some(name) => RcDoc::concat([self.name(name), RcDoc::space(), fields]),
            None => fields,
        }
    }

    fn field(&self, field: &Field) -> RcDoc<'static> {
        let doc = RcDoc::concat([self.name(field.name), RcDoc::text(": "), self.ty(&field.ty)]);
        match &field.default {
            Some(default) => RcDoc::concat([doc, RcDoc::text(" = "), self.value(default)]),
            None => doc,
        }
    }

    pub fn value(&self, value: &Value) -> RcDoc<'static> {
        match value {
            Value::None => RcDoc::text("None"),
            Value::Bool(true) => RcDoc::text("true"),
            Value::Bool(false) => RcDoc::text("false"),
            Value::Int(int) => RcDoc::text(int.to_string()),
            Value::Float(float) => RcDoc::text(format!("{float:?}")),
            Value::Str(string) => RcDoc::text(format!("{string:?}")),
            Value::Bytes(_) => {
                let hex = value.to_token().unwrap_or_default();
                RcDoc::text(format!("b\"{hex}\""))
            }
            Value::Seq(elems) => self.sequence("[", elems.iter().map(|elem| self.value(elem)), "]"),
            Value::Set(elems) => self.sequence("{", elems.iter().map(|elem| self.value(elem)), "}"),
            Value::Map(entries) => self.sequence(
                "{",
                entries.iter().map(|(key, value)| {
                    RcDoc::concat([self.value(key), RcDoc::text(": "), self.value(value)])
                }),
                "}",
            ),
            Value::Tuple(elems) if elems.len() == 1 => {
                RcDoc::concat([RcDoc::text("("), self.value(&elems[0]), RcDoc::text(",)")])
            }
            Value::Tuple(elems) => self.sequence("(", elems.iter().map(|elem| self.value(elem)), ")"),
            Value::Record(name, fields) => {
                let fields = self.sequence(
                    "{",
                    fields.iter().map(|(label, value)| {
                        RcDoc::concat([self.name(*label), RcDoc::text(" = "), self.value(value)])
                    }),
                    "}",
                );
                match name {
                    Some(name) => RcDoc::concat([self.name(*name), RcDoc::space(), fields]),
                    None => fields,
                }
            }
            Value::Member(Some(enum_name), name, _) => {
                RcDoc::concat([self.name(*enum_name), RcDoc::text("."), self.name(*name)])
            }
            Value::Member(None, name, _) => self.name(*name),
        }
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Field;

    fn render(ty: &TypeSpec) -> String {
        Context::new().ty(ty).pretty(usize::MAX).to_string()
    }

    #[test]
    fn types() {
        assert_eq!(render(&TypeSpec::INT), "int");
        assert_eq!(
            render(&TypeSpec::mapping(
                TypeSpec::STR,
                TypeSpec::tuple([TypeSpec::INT, TypeSpec::FLOAT]),
            )),
            "dict[str, tuple[int, float]]",
        );
        assert_eq!(
            render(&TypeSpec::union([
                TypeSpec::union([TypeSpec::INT, TypeSpec::FLOAT]),
                TypeSpec::None,
            ])),
            "(int | float) | None",
        );
        assert_eq!(render(&TypeSpec::union([TypeSpec::INT])), "union[int]");
        assert_eq!(
            render(&TypeSpec::literal([Value::Int(1), Value::from("a")])),
            r#"literal[1, "a"]"#,
        );
        assert_eq!(
            render(&TypeSpec::enumeration(
                Some("Color"),
                [("red", Value::from("red")), ("green", Value::Int(2))],
            )),
            "enum Color[red, green = 2]",
        );
        assert_eq!(
            render(&TypeSpec::record(
                Some("Point"),
                [
                    Field::new("x", TypeSpec::INT),
                    Field::new("y", TypeSpec::INT).with_default(0i64),
                ],
            )),
            "Point {x: int, y: int = 0}",
        );
        assert_eq!(
            render(&TypeSpec::annotated("port", TypeSpec::INT)),
            "annotated[int, port]",
        );
    }

    #[test]
    fn values() {
        let render = |value: &Value| value.to_string();

        assert_eq!(render(&Value::Float(3.0)), "3.0");
        assert_eq!(render(&Value::from("a\"b")), r#""a\"b""#);
        assert_eq!(render(&Value::Bytes(vec![1, 171])), r#"b"01ab""#);
        assert_eq!(
            render(&Value::Tuple(vec![Value::Int(1), Value::Float(2.0)])),
            "(1, 2.0)",
        );
        assert_eq!(render(&Value::Tuple(vec![Value::Int(1)])), "(1,)");
        assert_eq!(
            render(&Value::Map(vec![(Value::from("a"), Value::Int(1))])),
            r#"{"a": 1}"#,
        );
        assert_eq!(
            render(&Value::Record(
                None,
                vec![(Symbol::intern("x"), Value::Int(1))],
            )),
            "{x = 1}",
        );
        assert_eq!(render(&Value::Seq(vec![])), "[]");
    }

    #[test]
    fn long_types_break_over_lines() {
        let ty = TypeSpec::tuple(std::iter::repeat(TypeSpec::STR).take(4));
        let doc = Context::new().ty(&ty);
        assert_eq!(
            doc.pretty(12).to_string(),
            "tuple[\n    str,\n    str,\n    str,\n    str\n]",
        );
    }
}
