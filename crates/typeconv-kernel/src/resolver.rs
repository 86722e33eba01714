//! Structural mapping from type descriptors to validator trees.
//!
//! Resolution never instantiates a type. It checks that every named type
//! exists in the project, classifies the descriptor's shape and recurses
//! into its arguments:
//!
//! | Shape                             | Arity | Validator                     |
//! |-----------------------------------|-------|-------------------------------|
//! | `List<T>`, `Set<T>`, `T[]`        | 1     | `Collection(resolve(T))`      |
//! | `Map<K, V>`                       | 2     | `resolve(K)`; `V` is dropped  |
//! | `Optional<T>`                     | 1     | `PassThrough(resolve(T))`     |
//! | `Supplier<T>`, `Provider<T>`      | 1     | `resolve(T)`                  |
//! | anything else                     | any   | `Scalar(raw name)`            |

use std::sync::Arc;

use tracing::trace;
use typeconv_types::TypeDescriptor;

use crate::capability::ConversionContext;
use crate::error::ResolveError;
use crate::project::ProjectContext;
use crate::validator::Validator;

pub const LIST: &str = "java.util.List";
pub const SET: &str = "java.util.Set";
pub const MAP: &str = "java.util.Map";
pub const OPTIONAL: &str = "java.util.Optional";
pub const SUPPLIER: &str = "java.util.function.Supplier";

/// Injection providers that unwrap like `Supplier<T>`.
pub const PROVIDERS: &[&str] = &["jakarta.inject.Provider", "javax.inject.Provider"];

/// Primitive names, resolvable in every project.
pub const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "float", "double", "char",
];

/// Structural classification of one descriptor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Collection,
    Map,
    Optional,
    Supplier,
    Scalar,
}

impl Shape {
    pub fn classify(descriptor: &TypeDescriptor) -> Self {
        if descriptor.is_array() {
            return Shape::Array;
        }

        let raw = descriptor.raw_name.as_str();
        match descriptor.arity() {
            1 if raw == LIST || raw == SET => Shape::Collection,
            1 if raw == OPTIONAL => Shape::Optional,
            1 if raw == SUPPLIER || PROVIDERS.contains(&raw) => Shape::Supplier,
            2 if raw == MAP => Shape::Map,
            _ => Shape::Scalar,
        }
    }
}

/// Builds validators for one project and capability handle.
pub struct ConverterResolver<'a> {
    project: &'a dyn ProjectContext,
    conversion: Option<Arc<dyn ConversionContext>>,
}

impl<'a> ConverterResolver<'a> {
    /// `conversion` is `None` when the capability is unavailable; scalar
    /// leaves are then built unchecked.
    pub fn new(
        project: &'a dyn ProjectContext,
        conversion: Option<Arc<dyn ConversionContext>>,
    ) -> Self {
        Self {
            project,
            conversion,
        }
    }

    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Result<Validator, ResolveError> {
        let shape = Shape::classify(descriptor);
        trace!(descriptor = %descriptor, ?shape, "resolving");

        match shape {
            Shape::Array => {
                // is_array guarantees a component
                let component = descriptor
                    .component()
                    .unwrap_or_else(|| TypeDescriptor::simple(descriptor.raw_name.clone()));
                Ok(Validator::collection(self.resolve(&component)?))
            }
            Shape::Collection => {
                self.require_type(&descriptor.raw_name)?;
                Ok(Validator::collection(self.resolve_argument(descriptor, 0)?))
            }
            Shape::Map => {
                self.require_type(&descriptor.raw_name)?;
                let key = self.resolve_argument(descriptor, 0)?;
                let _value = self.resolve_argument(descriptor, 1)?;
                Ok(key)
            }
            Shape::Optional => {
                self.require_type(&descriptor.raw_name)?;
                Ok(Validator::pass_through(self.resolve_argument(descriptor, 0)?))
            }
            Shape::Supplier => {
                self.require_type(&descriptor.raw_name)?;
                self.resolve_argument(descriptor, 0)
            }
            Shape::Scalar => self.scalar(descriptor),
        }
    }

    fn resolve_argument(
        &self,
        descriptor: &TypeDescriptor,
        index: usize,
    ) -> Result<Validator, ResolveError> {
        match descriptor.type_arguments.get(index) {
            Some(argument) => self.resolve(argument),
            None => self.scalar(descriptor),
        }
    }

    /// A leaf on the raw name. Arguments of an unrecognised generic are
    /// still checked for existence, then ignored.
    fn scalar(&self, descriptor: &TypeDescriptor) -> Result<Validator, ResolveError> {
        let name = descriptor.raw_name.as_str();
        self.require_type(name)?;
        for argument in &descriptor.type_arguments {
            self.resolve(argument)?;
        }

        let conversion = self
            .conversion
            .as_ref()
            .filter(|conversion| conversion.can_convert(name))
            .cloned();
        Ok(Validator::scalar(name, conversion))
    }

    fn require_type(&self, name: &str) -> Result<(), ResolveError> {
        if PRIMITIVES.contains(&name) || self.project.contains_type(name) {
            Ok(())
        } else {
            Err(ResolveError::UnresolvableType {
                name: name.to_string(),
            })
        }
    }
}
