//! Adapter for types that already implement `serde`.
//!
//! [`BincodeConverter`] stores a value as its `bincode` (standard configuration)
//! encoding. It is never picked automatically; register it for a type with
//! [`GeneratorBuilder::with_converter`](crate::GeneratorBuilder::with_converter), or
//! implement [`Describe`](crate::Describe) with it:
//!
//! ```
//! use std::sync::Arc;
//! use serde::{Deserialize, Serialize};
//! use tagwire::converters::BincodeConverter;
//! use tagwire::{Context, Converter, Describe, Tagwire};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Legacy {
//!     id: u32,
//!     tags: Vec<String>,
//! }
//!
//! impl Describe for Legacy {
//!     fn describe(_: &mut Context<'_>) -> tagwire::Result<Arc<dyn Converter<Self>>> {
//!         Ok(Arc::new(BincodeConverter::new()))
//!     }
//! }
//!
//! let value = Legacy { id: 9, tags: vec!["a".into()] };
//! let bytes = Tagwire::encode(&value)?;
//! assert_eq!(Tagwire::decode::<Legacy>(&bytes)?, value);
//! # Ok::<(), tagwire::TagwireError>(())
//! ```

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::allocator::Allocator;
use crate::converter::Converter;
use crate::error::{Result, TagwireError};

/// Converter that delegates to `bincode`'s serde integration.
#[derive(Debug)]
pub struct BincodeConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeConverter<T> {
    /// Creates the converter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Converter<T> for BincodeConverter<T> {
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &T) -> Result<()> {
        bincode::serde::encode_into_std_write(item, allocator, bincode::config::standard())
            .map(|_| ())
            .map_err(|e| TagwireError::Serialization(e.to_string()))
    }

    fn decode(&self, span: &[u8]) -> Result<T> {
        let (value, read) = bincode::serde::decode_from_slice(span, bincode::config::standard())
            .map_err(|e| TagwireError::Serialization(e.to_string()))?;
        if read != span.len() {
            return Err(TagwireError::InvalidData(format!(
                "{} trailing bytes after bincode payload",
                span.len() - read
            )));
        }
        Ok(value)
    }
}
