//! `Option<T>`: a presence byte followed by the bare value.
//!
//! ```text
//! None     -> [0x00]
//! Some(v)  -> [0x01][bare v]
//! ```

use std::sync::Arc;

use crate::allocator::Allocator;
use crate::converter::Converter;
use crate::describe::Describe;
use crate::error::{Result, TagwireError};
use crate::generator::Context;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

/// Converter for `Option<T>` wrapping the converter for `T`.
pub struct NullableConverter<T> {
    inner: Arc<dyn Converter<T>>,
}

impl<T> NullableConverter<T> {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn Converter<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Converter<Option<T>> for NullableConverter<T> {
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &Option<T>) -> Result<()> {
        match item {
            None => allocator.push(ABSENT),
            Some(value) => {
                allocator.push(PRESENT)?;
                self.inner.encode(allocator, value)
            }
        }
    }

    /// An empty span decodes to `None`, so a missing frame reads as an absent value.
    fn decode(&self, span: &[u8]) -> Result<Option<T>> {
        let Some((&tag, rest)) = span.split_first() else {
            return Ok(None);
        };
        match tag {
            ABSENT if rest.is_empty() => Ok(None),
            ABSENT => Err(TagwireError::InvalidData(format!(
                "{} trailing bytes after an absent value",
                rest.len()
            ))),
            PRESENT => self.inner.decode(rest).map(Some),
            other => Err(TagwireError::InvalidNullableTag(other)),
        }
    }
}

impl<T> std::fmt::Debug for NullableConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NullableConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        let inner = context.resolve::<T>()?;
        Ok(Arc::new(NullableConverter::new(inner)))
    }
}
