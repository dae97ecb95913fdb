//! Deriving parsers from type specifications.
//!
//! The [`Registry`] is the entry point of the library: it checks a type,
//! builds the parser for it out of the parsers of its parts, and caches the
//! result so that later resolutions of an equal type are a single lookup.

use fxhash::{FxHashMap, FxHashSet};
use once_cell::sync::OnceCell;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

use crate::core::{Marker, TypeSpec};
use crate::parse::{FieldParser, Node, Parser};
use crate::reporting::{Error, ResolveError, Unsupported};
use crate::symbol::Symbol;
use crate::value::{Input, Value};

/// Registry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tokens that are treated as the absent sentinel, in addition to
    /// [`Input::Absent`].
    pub absent_tokens: Vec<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            absent_tokens: vec!["None".to_owned()],
        }
    }
}

/// Builds parsers for types tagged with a marker.
///
/// Closures of the form `Fn(&Registry, &TypeSpec) -> Result<Parser,
/// ResolveError>` are factories. The registry is passed in so that factories
/// can resolve the parts of the type they wrap.
///
/// A factory registered for a marker is given the [`TypeSpec::Custom`] or
/// [`TypeSpec::Annotated`] type carrying it. It must not resolve that same
/// type again, only its parts.
pub trait ParserFactory: Send + Sync {
    fn build(&self, registry: &Registry, spec: &TypeSpec) -> Result<Parser, ResolveError>;
}

impl<F> ParserFactory for F
where
    F: Fn(&Registry, &TypeSpec) -> Result<Parser, ResolveError> + Send + Sync,
{
    fn build(&self, registry: &Registry, spec: &TypeSpec) -> Result<Parser, ResolveError> {
        self(registry, spec)
    }
}

type Slot = Arc<OnceCell<Parser>>;

/// A cache of derived parsers, and the table of custom parser factories.
///
/// Registries are `Send + Sync`: once the factories are registered a
/// registry can be shared between threads, and concurrent resolutions of the
/// same type all receive the same parser.
pub struct Registry {
    absent_tokens: Arc<[String]>,
    factories: FxHashMap<Marker, Arc<dyn ParserFactory>>,
    cache: RwLock<FxHashMap<TypeSpec, Slot>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Registry {
        Registry {
            absent_tokens: Arc::from(config.absent_tokens),
            factories: FxHashMap::default(),
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Register a factory for types tagged with `marker`.
    ///
    /// The factory takes precedence over structural inference for
    /// [`TypeSpec::Annotated`] types carrying the marker, and is the only way
    /// to parse [`TypeSpec::Custom`] types carrying it. Registering clears
    /// the parsers cached so far, as any of them might contain the marker.
    pub fn register(&mut self, marker: impl AsRef<str>, factory: impl ParserFactory + 'static) {
        let marker = Symbol::intern(marker);
        debug!(%marker, "registering parser factory");

        self.factories.insert(marker, Arc::new(factory));
        self.cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Derive the parser for a type, or return the one derived earlier.
    pub fn resolve(&self, spec: &TypeSpec) -> Result<Parser, ResolveError> {
        let slot = self.slot(spec);
        if let Some(parser) = slot.get() {
            trace!(%spec, "parser cache hit");
            return Ok(parser.clone());
        }

        // The cache lock is released at this point, so building can resolve
        // nested types. Only this slot is locked while the parser is built.
        slot.get_or_try_init(|| self.build(spec)).cloned()
    }

    /// Resolve a type and parse an input with it.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use infer_parser::core::TypeSpec;
    /// use infer_parser::registry::Registry;
    /// use infer_parser::value::{Input, Value};
    ///
    /// let registry = Registry::new();
    /// let ty = TypeSpec::union([TypeSpec::INT, TypeSpec::FLOAT]);
    ///
    /// assert_eq!(registry.parse(&Input::token("3"), &ty), Ok(Value::Int(3)));
    /// assert_eq!(registry.parse(&Input::token("3.5"), &ty), Ok(Value::Float(3.5)));
    /// ```
    pub fn parse(&self, input: &Input, spec: &TypeSpec) -> Result<Value, Error> {
        let parser = self.resolve(spec)?;
        Ok(parser.parse(input)?)
    }

    fn slot(&self, spec: &TypeSpec) -> Slot {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = cache.get(spec) {
            return slot.clone();
        }
        drop(cache);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(spec.clone()).or_default().clone()
    }

    fn build(&self, spec: &TypeSpec) -> Result<Parser, ResolveError> {
        if let Some(marker) = spec.marker() {
            if let Some(factory) = self.factories.get(&marker) {
                debug!(%marker, %spec, "building parser with registered factory");
                return factory.build(self, spec);
            }
        }

        debug!(%spec, "building parser");
        let unsupported = |reason| ResolveError::new(spec, reason);

        let node = match spec {
            TypeSpec::Prim(kind) => Node::Prim(*kind),
            TypeSpec::None => Node::None(self.absent_tokens.clone()),
            TypeSpec::Literal(values) => {
                if values.is_empty() {
                    return Err(unsupported(Unsupported::EmptyLiteral));
                }
                let mut seen = FxHashSet::default();
                for value in values {
                    if !value.is_scalar() {
                        return Err(unsupported(Unsupported::NonScalarValue(value.clone())));
                    }
                    if !seen.insert(value) {
                        return Err(unsupported(Unsupported::DuplicateLiteral(value.clone())));
                    }
                }
                Node::Literal(values.clone(), self.absent_tokens.clone())
            }
            TypeSpec::Enum(enum_spec) => {
                if enum_spec.members.is_empty() {
                    return Err(unsupported(Unsupported::EmptyEnum));
                }
                let mut seen = FxHashSet::default();
                for (name, value) in &enum_spec.members {
                    if !value.is_scalar() {
                        return Err(unsupported(Unsupported::NonScalarValue(value.clone())));
                    }
                    if !seen.insert(*name) {
                        return Err(unsupported(Unsupported::DuplicateMember(*name)));
                    }
                }
                Node::Enum(enum_spec.clone(), self.absent_tokens.clone())
            }
            TypeSpec::Sequence(elem) => Node::Sequence(self.resolve(elem)?),
            TypeSpec::Set(elem) => Node::Set(self.resolve(elem)?),
            TypeSpec::Mapping(key, value) => Node::Mapping(self.resolve(key)?, self.resolve(value)?),
            TypeSpec::Tuple(elems) => {
                if elems.is_empty() {
                    return Err(unsupported(Unsupported::EmptyTuple));
                }
                Node::Tuple(self.resolve_all(elems)?)
            }
            TypeSpec::Record(record_spec) => {
                let mut seen = FxHashSet::default();
                let mut fields = Vec::with_capacity(record_spec.fields.len());
                for field in &record_spec.fields {
                    if !seen.insert(field.name) {
                        return Err(unsupported(Unsupported::DuplicateField(field.name)));
                    }
                    if let Some(default) = &field.default {
                        if !field.ty.admits(default) {
                            let reason = Unsupported::InvalidDefault(field.name, default.clone());
                            return Err(unsupported(reason));
                        }
                    }
                    fields.push(FieldParser {
                        name: field.name,
                        default: field.default.clone(),
                        parser: self.resolve(&field.ty)?,
                    });
                }
                Node::Record(record_spec.name, fields)
            }
            TypeSpec::Union(candidates) => {
                if candidates.is_empty() {
                    return Err(unsupported(Unsupported::EmptyUnion));
                }
                Node::Union(self.resolve_all(candidates)?)
            }
            TypeSpec::Custom(marker) => {
                return Err(unsupported(Unsupported::UnregisteredMarker(*marker)));
            }
            // Annotations without a factory are transparent
            TypeSpec::Annotated(_, inner) => return self.resolve(inner),
        };

        Ok(Parser::new(spec, node))
    }

    fn resolve_all(&self, specs: &[TypeSpec]) -> Result<Vec<Parser>, ResolveError> {
        specs.iter().map(|spec| self.resolve(spec)).collect()
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}
