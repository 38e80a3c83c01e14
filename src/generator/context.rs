use std::sync::Arc;

use super::Generator;
use crate::converter::{Converter, TypeInfo};
use crate::describe::Describe;
use crate::error::{Result, TagwireError};
use crate::object::{NamedObjectBuilder, TupleObjectBuilder};

/// State of one top-level resolution.
///
/// Holds the set of types currently being built. The set is private to the call that
/// created the context, so concurrent resolutions on other threads never see each
/// other's in-flight types.
#[derive(Debug)]
pub struct Context<'g> {
    generator: &'g Generator,
    in_flight: Vec<TypeInfo>,
}

impl<'g> Context<'g> {
    pub(crate) fn new(generator: &'g Generator) -> Self {
        Self {
            generator,
            in_flight: Vec::new(),
        }
    }

    /// The generator this resolution publishes into.
    pub fn generator(&self) -> &'g Generator {
        self.generator
    }

    /// Types currently being resolved, outermost first.
    pub fn in_flight(&self) -> &[TypeInfo] {
        &self.in_flight
    }

    /// Resolves the converter for a member type.
    ///
    /// # Errors
    /// [`TagwireError::CircularTypeReference`] if `T` is already being resolved further
    /// up the stack, or any error raised while building `T`.
    pub fn resolve<T: Describe>(&mut self) -> Result<Arc<dyn Converter<T>>> {
        if let Some(converter) = self.generator.cached::<T>()? {
            return Ok(converter);
        }

        let info = TypeInfo::of::<T>();
        if self.in_flight.iter().any(|t| t.id == info.id) {
            let mut path: Vec<&'static str> = self.in_flight.iter().map(|t| t.name).collect();
            path.push(info.name);
            tracing::debug!(type_name = info.name, depth = self.in_flight.len(), "circular type reference");
            return Err(TagwireError::CircularTypeReference {
                type_name: info.name,
                path,
            });
        }

        self.in_flight.push(info);
        let built = self.build::<T>(info);
        self.in_flight.pop();

        self.generator.publish(info, built?)
    }

    fn build<T: Describe>(&mut self, info: TypeInfo) -> Result<Arc<dyn Converter<T>>> {
        let generator = self.generator;
        if let Some(explicit) = generator.explicit(info) {
            return explicit.downcast::<T>();
        }
        for creator in generator.creators() {
            if let Some(created) = creator.create(self, info)? {
                tracing::debug!(type_name = info.name, "converter supplied by creator");
                return created.downcast::<T>();
            }
        }
        T::describe(self)
    }

    /// Starts describing `T` as a named object (a sequence of key/value pairs).
    pub fn named_object<T: Send + 'static>(&mut self) -> NamedObjectBuilder<'_, 'g, T> {
        NamedObjectBuilder::new(self)
    }

    /// Starts describing `T` as a tuple object (a positional concatenation).
    pub fn tuple_object<T: Send + 'static>(&mut self) -> TupleObjectBuilder<'_, 'g, T> {
        TupleObjectBuilder::new(self)
    }
}
