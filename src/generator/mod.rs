//! Type-to-converter resolution.
//!
//! The [`Generator`] turns a type into a [`Converter`] and memoizes the result for its
//! whole lifetime. Resolution of a type that is not cached yet runs inside a
//! [`Context`], which tracks the types currently being built so that self-referential
//! types are rejected instead of recursing forever.

/// Defines [`Context`], one top-level resolution.
pub mod context;
/// Defines the [`ConverterCreator`] extension point.
pub mod creator;
/// Defines [`GeneratorOptions`] and [`GeneratorBuilder`].
pub mod options;

pub use context::Context;
pub use creator::ConverterCreator;
pub use options::{GeneratorBuilder, GeneratorOptions};

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::any::TypeId;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::allocator::Allocator;
use crate::converter::{Converter, ErasedConverter, TypeInfo};
use crate::describe::Describe;
use crate::error::Result;
use crate::pool;
use crate::token::Token;

/// Resolves and caches converters, and runs top-level encodes and decodes.
///
/// A generator is `Send + Sync`; share one per process (see [`crate::Tagwire`]) or one
/// per configuration.
pub struct Generator {
    options: GeneratorOptions,
    explicit: HashMap<TypeId, ErasedConverter>,
    creators: Vec<Arc<dyn ConverterCreator>>,
    cache: RwLock<HashMap<TypeId, ErasedConverter>>,
}

impl Generator {
    /// Creates a generator with default options and no registered converters.
    pub fn new() -> Self {
        GeneratorBuilder::default().build()
    }

    /// Starts configuring a generator.
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::default()
    }

    pub(crate) fn from_parts(
        options: GeneratorOptions,
        explicit: HashMap<TypeId, ErasedConverter>,
        creators: Vec<Arc<dyn ConverterCreator>>,
    ) -> Self {
        Self {
            options,
            explicit,
            creators,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The options this generator was built with.
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Returns the converter for `T`, building and caching it on first use.
    ///
    /// # Errors
    /// Any resolution error: [`crate::TagwireError::CircularTypeReference`],
    /// [`crate::TagwireError::NoAvailableMember`], [`crate::TagwireError::DuplicateKey`],
    /// [`crate::TagwireError::NonSequentialIndex`], [`crate::TagwireError::UnsupportedType`].
    pub fn get_converter<T: Describe>(&self) -> Result<Arc<dyn Converter<T>>> {
        if let Some(converter) = self.cached::<T>()? {
            return Ok(converter);
        }
        Context::new(self).resolve::<T>()
    }

    /// Number of converters published so far.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    pub(crate) fn cached<T: 'static>(&self) -> Result<Option<Arc<dyn Converter<T>>>> {
        self.cache
            .read()
            .get(&TypeId::of::<T>())
            .map(ErasedConverter::downcast::<T>)
            .transpose()
    }

    pub(crate) fn explicit(&self, info: TypeInfo) -> Option<&ErasedConverter> {
        self.explicit.get(&info.id)
    }

    pub(crate) fn creators(&self) -> &[Arc<dyn ConverterCreator>] {
        &self.creators
    }

    /// Inserts `converter` unless another resolution got there first; either way the
    /// cached converter is returned.
    pub(crate) fn publish<T: 'static>(
        &self,
        info: TypeInfo,
        converter: Arc<dyn Converter<T>>,
    ) -> Result<Arc<dyn Converter<T>>> {
        let mut cache = self.cache.write();
        match cache.entry(info.id) {
            Entry::Occupied(entry) => entry.get().downcast::<T>(),
            Entry::Vacant(entry) => {
                tracing::debug!(type_name = info.name, "converter published");
                entry.insert(ErasedConverter::new(converter.clone()));
                Ok(converter)
            }
        }
    }

    fn run_encode<T: Describe>(
        &self,
        item: &T,
        write: fn(&dyn Converter<T>, &mut Allocator, &T) -> Result<()>,
    ) -> Result<Vec<u8>> {
        let converter = self.get_converter::<T>()?;
        if self.options.use_scratch_pool {
            pool::with_allocator(self.options.max_capacity, |allocator| {
                write(converter.as_ref(), allocator, item)?;
                Ok(allocator.extract())
            })
        } else {
            let mut allocator = Allocator::with_max_capacity(self.options.max_capacity);
            write(converter.as_ref(), &mut allocator, item)?;
            Ok(allocator.into_vec())
        }
    }

    /// Encodes `item` without a frame.
    pub fn encode<T: Describe>(&self, item: &T) -> Result<Vec<u8>> {
        self.run_encode(item, |c, a, i| c.encode(a, i))
    }

    /// Encodes `item` so that the result frames itself when `T` is variable length,
    /// ready to be embedded into another stream.
    pub fn encode_auto<T: Describe>(&self, item: &T) -> Result<Vec<u8>> {
        self.run_encode(item, |c, a, i| c.encode_auto(a, i))
    }

    /// Decodes a value written by [`Generator::encode`].
    pub fn decode<T: Describe>(&self, bytes: &[u8]) -> Result<T> {
        self.get_converter::<T>()?.decode(bytes)
    }

    /// Decodes a value written by [`Generator::encode_auto`].
    pub fn decode_auto<T: Describe>(&self, bytes: &[u8]) -> Result<T> {
        let mut span = bytes;
        self.get_converter::<T>()?.decode_auto(&mut span)
    }

    /// Creates a lazy view over an encoded named object.
    pub fn token(&self, bytes: impl Into<Arc<[u8]>>) -> Token<'_> {
        Token::new(self, bytes)
    }

    /// Memory-maps `path` and creates a lazy view over its contents.
    pub fn open_token<P: AsRef<Path>>(&self, path: P) -> Result<Token<'_>> {
        Token::open(self, path)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .field("explicit", &self.explicit.len())
            .field("creators", &self.creators.len())
            .field("cached", &self.cached_len())
            .finish()
    }
}
