//! Converters for scalars and strings.
//!
//! Numbers are stored little-endian at their natural width. `bool` takes one byte and
//! `char` four. Strings are raw UTF-8; their bare form carries no length, so inside a
//! composite they are framed by the enclosing codec.

use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;

use crate::allocator::Allocator;
use crate::converter::{Converter, exact_span};
use crate::describe::Describe;
use crate::error::{Result, TagwireError};
use crate::generator::Context;

/// A value stored as its little-endian bytes.
pub trait LittleEndian: Copy + Send + Sync + 'static {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Writes the value into `out`, which is exactly `SIZE` bytes long.
    fn write_le(self, out: &mut [u8]);

    /// Reads the value from `bytes`, which is at least `SIZE` bytes long.
    fn read_le(bytes: &[u8]) -> Self;
}

/// Converter for any [`LittleEndian`] value.
#[derive(Debug)]
pub struct LittleEndianConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> LittleEndianConverter<T> {
    /// Creates the converter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for LittleEndianConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LittleEndian> Converter<T> for LittleEndianConverter<T> {
    fn fixed_length(&self) -> usize {
        T::SIZE
    }

    fn encode(&self, allocator: &mut Allocator, item: &T) -> Result<()> {
        item.write_le(allocator.reserve(T::SIZE)?);
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<T> {
        Ok(T::read_le(exact_span(span, T::SIZE)?))
    }
}

macro_rules! impl_little_endian {
    ($($t:ty),*) => {
        $(
            impl LittleEndian for $t {
                const SIZE: usize = size_of::<$t>();

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..size_of::<$t>()]);
                    <$t>::from_le_bytes(buf)
                }
            }

            impl Describe for $t {
                fn describe(_: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
                    Ok(Arc::new(LittleEndianConverter::<$t>::new()))
                }
            }
        )*
    }
}

impl_little_endian!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

/// `bool` as a single `0` or `1` byte.
#[derive(Debug, Default)]
pub struct BoolConverter;

impl Converter<bool> for BoolConverter {
    fn fixed_length(&self) -> usize {
        1
    }

    fn encode(&self, allocator: &mut Allocator, item: &bool) -> Result<()> {
        allocator.push(u8::from(*item))
    }

    fn decode(&self, span: &[u8]) -> Result<bool> {
        match exact_span(span, 1)? {
            [0] => Ok(false),
            [1] => Ok(true),
            [b, ..] => Err(TagwireError::InvalidData(format!("invalid bool byte {b}"))),
            [] => Err(TagwireError::not_enough(1, 0)),
        }
    }
}

impl Describe for bool {
    fn describe(_: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        Ok(Arc::new(BoolConverter))
    }
}

/// `char` as its 4-byte little-endian scalar value.
#[derive(Debug, Default)]
pub struct CharConverter;

impl Converter<char> for CharConverter {
    fn fixed_length(&self) -> usize {
        4
    }

    fn encode(&self, allocator: &mut Allocator, item: &char) -> Result<()> {
        u32::from(*item).write_le(allocator.reserve(4)?);
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<char> {
        let scalar = u32::read_le(exact_span(span, 4)?);
        char::from_u32(scalar)
            .ok_or_else(|| TagwireError::InvalidData(format!("invalid char scalar {scalar:#x}")))
    }
}

impl Describe for char {
    fn describe(_: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        Ok(Arc::new(CharConverter))
    }
}

/// `String` as raw UTF-8.
#[derive(Debug, Default)]
pub struct StringConverter;

impl Converter<String> for StringConverter {
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &String) -> Result<()> {
        allocator.append(item.as_bytes())
    }

    fn encode_with_length_prefix(&self, allocator: &mut Allocator, item: &String) -> Result<()> {
        allocator.append_with_length_prefix(item.as_bytes())
    }

    fn decode(&self, span: &[u8]) -> Result<String> {
        std::str::from_utf8(span)
            .map(str::to_owned)
            .map_err(|e| TagwireError::InvalidData(e.to_string()))
    }
}

impl Describe for String {
    fn describe(_: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        Ok(Arc::new(StringConverter))
    }
}
