//! Type-directed parsing of untyped input.
//!
//! Describe the value you want with a [`TypeSpec`], derive a parser for it
//! from a [`Registry`], and run the parser over tokens or loosely typed
//! scalars. Failures are reported as trees of [`ParseError`]s that can be
//! rendered as diagnostics.
//!
//! ```rust
//! use infer_parser::{Input, Registry, TypeSpec, Value};
//!
//! let registry = Registry::new();
//! let ty = TypeSpec::optional(TypeSpec::sequence(TypeSpec::INT));
//!
//! let value = registry.parse(&Input::tokens(["1", "2"]), &ty).unwrap();
//! assert_eq!(value, Value::Seq(vec![Value::Int(1), Value::Int(2)]));
//! ```

pub mod core;
pub mod parse;
pub mod registry;
pub mod reporting;
pub mod surface;
pub mod symbol;
pub mod value;

mod driver;
mod literal;

pub use crate::core::TypeSpec;
pub use crate::driver::{shape_tokens, Driver, FileId, Status};
pub use crate::parse::Parser;
pub use crate::registry::Registry;
pub use crate::reporting::{Error, ParseError, ResolveError};
pub use crate::value::{Input, Value};
