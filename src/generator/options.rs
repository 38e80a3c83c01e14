use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::{ConverterCreator, Generator};
use crate::converter::{Converter, ErasedConverter};

/// Settings applied to every encode a [`Generator`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Hard ceiling for the output of a single top-level encode.
    pub max_capacity: usize,
    /// Reuse a per-thread scratch buffer for top-level encodes.
    pub use_scratch_pool: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            max_capacity: usize::MAX,
            use_scratch_pool: true,
        }
    }
}

/// Builder for [`Generator`].
#[derive(Debug, Default)]
pub struct GeneratorBuilder {
    options: GeneratorOptions,
    explicit: HashMap<TypeId, ErasedConverter>,
    creators: Vec<Arc<dyn ConverterCreator>>,
}

impl GeneratorBuilder {
    /// Registers an explicit converter for `T`. Explicit converters take precedence over
    /// creators and over `T`'s own description; registering twice keeps the last one.
    pub fn with_converter<T, C>(mut self, converter: C) -> Self
    where
        T: 'static,
        C: Converter<T> + 'static,
    {
        let erased = ErasedConverter::from_converter::<T, C>(converter);
        self.explicit.insert(erased.type_info().id, erased);
        self
    }

    /// Registers an already type-erased converter.
    pub fn with_erased_converter(mut self, converter: ErasedConverter) -> Self {
        self.explicit.insert(converter.type_info().id, converter);
        self
    }

    /// Appends a creator. Creators are consulted in registration order.
    pub fn with_creator(mut self, creator: impl ConverterCreator + 'static) -> Self {
        self.creators.push(Arc::new(creator));
        self
    }

    /// Caps the size of any single top-level encode.
    pub fn max_capacity(mut self, max_capacity: usize) -> Self {
        self.options.max_capacity = max_capacity;
        self
    }

    /// Enables or disables the per-thread scratch buffer.
    pub fn use_scratch_pool(mut self, enabled: bool) -> Self {
        self.options.use_scratch_pool = enabled;
        self
    }

    /// Finishes configuration.
    pub fn build(self) -> Generator {
        Generator::from_parts(self.options, self.explicit, self.creators)
    }
}
