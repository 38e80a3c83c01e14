//! Variable-width length prefixes.
//!
//! Every frame in the wire format is introduced by the same tagged unsigned integer.
//! The two high bits of the first byte select the width:
//!
//! ```text
//! 0b00xxxxxx                             values < 0x40          (1 byte)
//! 0b01xxxxxx xxxxxxxx                    values < 0x4000        (2 bytes, big endian)
//! 0b1xxxxxxx xxxxxxxx xxxxxxxx xxxxxxxx  values <= 0x7FFF_FFFF  (4 bytes, big endian)
//! ```
//!
//! Decoders accept any width for any value, so the 4-byte form written by the
//! allocator's anchor patch (see [`encode_fixed`]) and the 1-byte compacted form are
//! both read back by [`decode_length`].

use crate::constants::MAX_LENGTH;
use crate::error::{Result, TagwireError};

const TAG_MASK: u8 = 0b1100_0000;
const TAG_TWO_BYTES: u8 = 0b0100_0000;
const TAG_FOUR_BYTES: u8 = 0b1000_0000;

/// Returns the number of bytes [`encode_length`] uses for `n`.
#[inline]
pub fn encoded_width(n: usize) -> usize {
    if n < 0x40 {
        1
    } else if n < 0x4000 {
        2
    } else {
        4
    }
}

/// Encodes `n` with the minimal width.
///
/// Returns the scratch array and the number of leading bytes that are valid.
///
/// # Errors
/// [`TagwireError::InvalidArgument`] if `n` exceeds `0x7FFF_FFFF`.
pub fn encode_length(n: usize) -> Result<([u8; 4], usize)> {
    let mut buf = [0u8; 4];
    match encoded_width(n) {
        1 => {
            buf[0] = n as u8;
            Ok((buf, 1))
        }
        2 => {
            buf[0] = TAG_TWO_BYTES | (n >> 8) as u8;
            buf[1] = n as u8;
            Ok((buf, 2))
        }
        _ => Ok((encode_fixed(n)?, 4)),
    }
}

/// Encodes `n` in the 4-byte form regardless of its magnitude.
///
/// Used by [`crate::Allocator::close_length_prefix`], which has to reserve the
/// worst-case slot before the length is known.
///
/// # Errors
/// [`TagwireError::InvalidArgument`] if `n` exceeds `0x7FFF_FFFF`.
pub fn encode_fixed(n: usize) -> Result<[u8; 4]> {
    if n > MAX_LENGTH {
        return Err(TagwireError::InvalidArgument(format!(
            "length {n} exceeds the maximum encodable length {MAX_LENGTH}"
        )));
    }
    let mut buf = (n as u32).to_be_bytes();
    buf[0] |= TAG_FOUR_BYTES;
    Ok(buf)
}

/// Decodes a 4-byte fixed slot written by [`encode_fixed`].
///
/// # Errors
/// [`TagwireError::NotEnoughBytes`] for spans shorter than 4 bytes,
/// [`TagwireError::InvalidLengthPrefixTag`] if the 4-byte tag bit is clear.
pub fn decode_fixed(bytes: &[u8]) -> Result<usize> {
    let head: [u8; 4] = bytes
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| TagwireError::not_enough(4, bytes.len()))?;
    if head[0] & TAG_FOUR_BYTES == 0 {
        return Err(TagwireError::InvalidLengthPrefixTag(head[0]));
    }
    Ok((u32::from_be_bytes(head) & 0x7FFF_FFFF) as usize)
}

/// Decodes a length prefix from the start of `bytes`.
///
/// Returns `(value, bytes_consumed)`.
///
/// # Errors
/// [`TagwireError::NotEnoughBytes`] if the span is empty or shorter than the tag says.
pub fn decode_length(bytes: &[u8]) -> Result<(usize, usize)> {
    let first = *bytes.first().ok_or_else(|| TagwireError::not_enough(1, 0))?;
    if first & TAG_FOUR_BYTES != 0 {
        return Ok((decode_fixed(bytes)?, 4));
    }
    if first & TAG_MASK == TAG_TWO_BYTES {
        let second = *bytes
            .get(1)
            .ok_or_else(|| TagwireError::not_enough(2, bytes.len()))?;
        let value = (usize::from(first & !TAG_MASK) << 8) | usize::from(second);
        return Ok((value, 2));
    }
    Ok((usize::from(first), 1))
}

/// Reads a length prefix and returns the body it frames, advancing `span` past both.
///
/// # Errors
/// [`TagwireError::NotEnoughBytes`] if the prefix or the body is truncated.
pub fn split_length_prefixed<'a>(span: &mut &'a [u8]) -> Result<&'a [u8]> {
    let (length, consumed) = decode_length(span)?;
    let rest = &span[consumed..];
    if rest.len() < length {
        return Err(TagwireError::not_enough(length, rest.len()));
    }
    let (body, tail) = rest.split_at(length);
    *span = tail;
    Ok(body)
}

/// Splits exactly `n` bytes off the front of `span`.
pub(crate) fn split_exact<'a>(span: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if span.len() < n {
        return Err(TagwireError::not_enough(n, span.len()));
    }
    let (head, tail) = span.split_at(n);
    *span = tail;
    Ok(head)
}
