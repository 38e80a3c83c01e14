//! The converter contract shared by every codec.
//!
//! A [`Converter<T>`] encodes and decodes exactly one type. It exposes three encode
//! and three decode variants which differ only in how the value is framed:
//!
//! | variant | encode | decode |
//! |---|---|---|
//! | bare | no frame, the boundary is known to the caller | consumes the whole span |
//! | auto | length prefix only if [`Converter::fixed_length`] is 0 | symmetric |
//! | with length prefix | always a length prefix | symmetric |
//!
//! Composite codecs pick the variant per member: tuple objects use *auto* for every
//! member except the last, which is *bare*; named objects always use the prefixed form.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::allocator::Allocator;
use crate::error::{Result, TagwireError};
use crate::varint;

/// Checks that a bare span of a fixed-length encoding holds exactly `width` bytes.
pub(crate) fn exact_span(span: &[u8], width: usize) -> Result<&[u8]> {
    match span.len() {
        n if n < width => Err(TagwireError::not_enough(width, n)),
        n if n > width => Err(TagwireError::InvalidData(format!(
            "{} trailing bytes after a {width}-byte value",
            n - width
        ))),
        _ => Ok(span),
    }
}

/// Encoder/decoder for values of type `T`.
///
/// Only [`fixed_length`](Converter::fixed_length), [`encode`](Converter::encode) and
/// [`decode`](Converter::decode) are required; the framed variants are derived from
/// them and may be overridden when a type can do better (for example, a string knows
/// its encoded length up front and can skip the anchor patch).
pub trait Converter<T>: Send + Sync {
    /// Exact encoded size in bytes, or 0 if the encoding is variable length.
    fn fixed_length(&self) -> usize;

    /// Writes `item` without any framing.
    fn encode(&self, allocator: &mut Allocator, item: &T) -> Result<()>;

    /// Reads a value from `span`, which holds exactly one bare encoding.
    ///
    /// Fixed-length converters require the span to be exactly `fixed_length()` bytes:
    /// a shorter span fails with [`TagwireError::NotEnoughBytes`], a longer one with
    /// [`TagwireError::InvalidData`].
    fn decode(&self, span: &[u8]) -> Result<T>;

    /// Writes `item`, self-framing only when the encoding is variable length.
    fn encode_auto(&self, allocator: &mut Allocator, item: &T) -> Result<()> {
        if self.fixed_length() > 0 {
            self.encode(allocator, item)
        } else {
            self.encode_with_length_prefix(allocator, item)
        }
    }

    /// Writes `item` preceded by its encoded length.
    fn encode_with_length_prefix(&self, allocator: &mut Allocator, item: &T) -> Result<()> {
        let fixed = self.fixed_length();
        if fixed > 0 {
            allocator.append_length_prefix(fixed)?;
            return self.encode(allocator, item);
        }
        let anchor = allocator.anchor_length_prefix()?;
        self.encode(allocator, item)?;
        allocator.close_length_prefix(anchor, true)
    }

    /// Reads a value written by [`encode_auto`](Converter::encode_auto) and advances `span`.
    fn decode_auto(&self, span: &mut &[u8]) -> Result<T> {
        let fixed = self.fixed_length();
        if fixed > 0 {
            let body = varint::split_exact(span, fixed)?;
            self.decode(body)
        } else {
            self.decode_with_length_prefix(span)
        }
    }

    /// Reads a value written by
    /// [`encode_with_length_prefix`](Converter::encode_with_length_prefix) and advances `span`.
    fn decode_with_length_prefix(&self, span: &mut &[u8]) -> Result<T> {
        let body = varint::split_length_prefixed(span)?;
        self.decode(body)
    }
}

/// Identity of a type as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// Runtime identity used for caching and cycle detection.
    pub id: TypeId,
    /// Human readable name used in errors and logs.
    pub name: &'static str,
}

impl TypeInfo {
    /// Describes `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A converter with its value type erased, as stored in the resolver cache.
pub struct ErasedConverter {
    info: TypeInfo,
    inner: Box<dyn Any + Send + Sync>,
}

impl ErasedConverter {
    /// Erases a converter for `T`.
    pub fn new<T: 'static>(converter: Arc<dyn Converter<T>>) -> Self {
        Self {
            info: TypeInfo::of::<T>(),
            inner: Box::new(converter),
        }
    }

    /// Erases a concrete converter value for `T`.
    pub fn from_converter<T: 'static, C: Converter<T> + 'static>(converter: C) -> Self {
        Self::new::<T>(Arc::new(converter))
    }

    /// The value type this converter handles.
    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    /// Recovers the typed converter.
    ///
    /// # Errors
    /// [`TagwireError::InvalidArgument`] if the converter was built for another type.
    pub fn downcast<T: 'static>(&self) -> Result<Arc<dyn Converter<T>>> {
        self.inner
            .downcast_ref::<Arc<dyn Converter<T>>>()
            .cloned()
            .ok_or_else(|| {
                TagwireError::InvalidArgument(format!(
                    "converter for '{}' requested as '{}'",
                    self.info.name,
                    std::any::type_name::<T>()
                ))
            })
    }
}

impl fmt::Debug for ErasedConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErasedConverter({})", self.info.name)
    }
}
