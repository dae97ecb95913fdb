//! Type specifications.
//!
//! A [`TypeSpec`] describes the shape of the value a caller wants out of some
//! raw [input][crate::value::Input]. Type specifications are plain trees:
//! they are built once, ahead of parsing, and handed to the
//! [registry][crate::registry::Registry] to derive a parser.

use std::fmt;

use crate::symbol::Symbol;
use crate::value::Value;

pub mod pretty;
pub mod prim;

/// Markers identify user-defined types, and the factories that know how to
/// parse them.
pub type Marker = Symbol;

/// Atomic types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
}

impl PrimKind {
    pub const ALL: [PrimKind; 5] = [
        PrimKind::Bool,
        PrimKind::Int,
        PrimKind::Float,
        PrimKind::Str,
        PrimKind::Bytes,
    ];

    /// The name of the primitive in the type syntax.
    pub fn name(self) -> &'static str {
        match self {
            PrimKind::Bool => "bool",
            PrimKind::Int => "int",
            PrimKind::Float => "float",
            PrimKind::Str => "str",
            PrimKind::Bytes => "bytes",
        }
    }

    pub fn from_name(name: &str) -> Option<PrimKind> {
        PrimKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PrimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type specifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    /// Atomic types.
    Prim(PrimKind),
    /// The absent marker. Only matches the absent sentinel.
    None,
    /// A closed set of scalar values.
    Literal(Vec<Value>),
    /// Named enumeration members, each associated with a scalar value.
    Enum(EnumSpec),
    /// Ordered lists of elements.
    Sequence(Box<TypeSpec>),
    /// Unordered collections of unique elements.
    Set(Box<TypeSpec>),
    /// Key-value mappings with unique keys.
    Mapping(Box<TypeSpec>, Box<TypeSpec>),
    /// Fixed-arity heterogeneous tuples.
    Tuple(Vec<TypeSpec>),
    /// Structured records with named fields.
    Record(RecordSpec),
    /// Alternatives, tried in order.
    Union(Vec<TypeSpec>),
    /// A type that can only be parsed by a registered factory.
    Custom(Marker),
    /// A structural type tagged with a marker. Parsed like the inner type
    /// unless a factory is registered for the marker.
    Annotated(Marker, Box<TypeSpec>),
}

/// Enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumSpec {
    pub name: Option<Symbol>,
    pub members: Vec<(Symbol, Value)>,
}

/// Records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSpec {
    pub name: Option<Symbol>,
    pub fields: Vec<Field>,
}

/// Record fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeSpec,
    /// The value used when the field is missing from the input.
    pub default: Option<Value>,
}

impl Field {
    /// A field with no default.
    ///
    /// Names are printed as they are, so a name that is not an identifier
    /// (`[a-zA-Z_][a-zA-Z0-9_]*`) gives text that [`parse_type`] rejects.
    ///
    /// [`parse_type`]: crate::surface::parse_type
    pub fn new(name: impl AsRef<str>, ty: TypeSpec) -> Field {
        Field {
            name: Symbol::intern(name),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Field {
        self.default = Some(default.into());
        self
    }
}

/// The kind of raw input a type expects at the top level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A single token or loosely typed scalar.
    Scalar,
    /// An ordered sequence of items.
    Seq,
    /// Named values.
    Map,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "a single value"),
            Shape::Seq => write!(f, "a sequence"),
            Shape::Map => write!(f, "named values"),
        }
    }
}

impl TypeSpec {
    pub const BOOL: TypeSpec = TypeSpec::Prim(PrimKind::Bool);
    pub const INT: TypeSpec = TypeSpec::Prim(PrimKind::Int);
    pub const FLOAT: TypeSpec = TypeSpec::Prim(PrimKind::Float);
    pub const STR: TypeSpec = TypeSpec::Prim(PrimKind::Str);
    pub const BYTES: TypeSpec = TypeSpec::Prim(PrimKind::Bytes);

    pub fn sequence(elem: TypeSpec) -> TypeSpec {
        TypeSpec::Sequence(Box::new(elem))
    }

    pub fn set(elem: TypeSpec) -> TypeSpec {
        TypeSpec::Set(Box::new(elem))
    }

    pub fn mapping(key: TypeSpec, value: TypeSpec) -> TypeSpec {
        TypeSpec::Mapping(Box::new(key), Box::new(value))
    }

    pub fn tuple(elems: impl IntoIterator<Item = TypeSpec>) -> TypeSpec {
        TypeSpec::Tuple(elems.into_iter().collect())
    }

    pub fn union(candidates: impl IntoIterator<Item = TypeSpec>) -> TypeSpec {
        TypeSpec::Union(candidates.into_iter().collect())
    }

    /// `Optional(inner)`, which is sugar for `Union(inner, None)`.
    pub fn optional(inner: TypeSpec) -> TypeSpec {
        TypeSpec::Union(vec![inner, TypeSpec::None])
    }

    pub fn literal(values: impl IntoIterator<Item = impl Into<Value>>) -> TypeSpec {
        TypeSpec::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn record(name: Option<&str>, fields: impl IntoIterator<Item = Field>) -> TypeSpec {
        TypeSpec::Record(RecordSpec {
            name: name.map(Symbol::intern),
            fields: fields.into_iter().collect(),
        })
    }

    /// Member names, like field names, only read back when they are
    /// identifiers.
    pub fn enumeration<N: AsRef<str>>(
        name: Option<&str>,
        members: impl IntoIterator<Item = (N, Value)>,
    ) -> TypeSpec {
        TypeSpec::Enum(EnumSpec {
            name: name.map(Symbol::intern),
            members: (members.into_iter())
                .map(|(member, value)| (Symbol::intern(member), value))
                .collect(),
        })
    }

    /// A type parsed by the factory registered for `marker`.
    ///
    /// The marker is printed as it is. Markers that are not identifiers, or
    /// that are builtin names (`int`, `list`, ...) or keywords (`enum`,
    /// `literal`), do not read back with [`parse_type`].
    ///
    /// [`parse_type`]: crate::surface::parse_type
    pub fn custom(marker: impl AsRef<str>) -> TypeSpec {
        TypeSpec::Custom(Symbol::intern(marker))
    }

    pub fn annotated(marker: impl AsRef<str>, inner: TypeSpec) -> TypeSpec {
        TypeSpec::Annotated(Symbol::intern(marker), Box::new(inner))
    }

    /// The marker a custom factory could be registered under.
    pub fn marker(&self) -> Option<Marker> {
        match self {
            TypeSpec::Custom(marker) | TypeSpec::Annotated(marker, _) => Some(*marker),
            _ => None,
        }
    }

    /// The kind of raw input this type expects at the top level.
    ///
    /// Unions take the shape of their first candidate that expects a
    /// sequence or named values, so that `optional[list[int]]` is fed a
    /// sequence.
    pub fn shape(&self) -> Shape {
        match self {
            TypeSpec::Prim(_)
            | TypeSpec::None
            | TypeSpec::Literal(_)
            | TypeSpec::Enum(_)
            | TypeSpec::Custom(_) => Shape::Scalar,
            TypeSpec::Sequence(_) | TypeSpec::Set(_) | TypeSpec::Tuple(_) => Shape::Seq,
            TypeSpec::Mapping(_, _) | TypeSpec::Record(_) => Shape::Map,
            TypeSpec::Union(candidates) => (candidates.iter())
                .map(TypeSpec::shape)
                .find(|shape| *shape != Shape::Scalar)
                .unwrap_or(Shape::Scalar),
            TypeSpec::Annotated(_, inner) => inner.shape(),
        }
    }

    /// Returns true if the value could have been produced by parsing
    /// something as this type.
    ///
    /// Custom types are opaque, so they admit any value.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeSpec::Prim(kind), value) => value.prim_kind() == Some(*kind),
            (TypeSpec::None, Value::None) => true,
            (TypeSpec::Literal(values), value) => values.contains(value),
            (TypeSpec::Enum(spec), Value::Member(enum_name, name, member_value)) => {
                *enum_name == spec.name
                    && (spec.members.iter()).any(|(n, v)| n == name && v == &**member_value)
            }
            (TypeSpec::Sequence(elem), Value::Seq(elems))
            | (TypeSpec::Set(elem), Value::Set(elems)) => elems.iter().all(|e| elem.admits(e)),
            (TypeSpec::Mapping(key_ty, value_ty), Value::Map(entries)) => (entries.iter())
                .all(|(key, value)| key_ty.admits(key) && value_ty.admits(value)),
            (TypeSpec::Tuple(tys), Value::Tuple(elems)) => {
                tys.len() == elems.len() && tys.iter().zip(elems).all(|(ty, e)| ty.admits(e))
            }
            (TypeSpec::Record(spec), Value::Record(name, fields)) => {
                *name == spec.name
                    && spec.fields.len() == fields.len()
                    && (spec.fields.iter().zip(fields))
                        .all(|(field, (label, value))| field.name == *label && field.ty.admits(value))
            }
            (TypeSpec::Union(candidates), value) => candidates.iter().any(|ty| ty.admits(value)),
            (TypeSpec::Custom(_), _) => true,
            (TypeSpec::Annotated(_, inner), value) => inner.admits(value),
            (_, _) => false,
        }
    }
}

impl From<PrimKind> for TypeSpec {
    fn from(kind: PrimKind) -> TypeSpec {
        TypeSpec::Prim(kind)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = pretty::Context::new().ty(self);
        write!(f, "{}", doc.pretty(usize::MAX))
    }
}
