//! The append-only write buffer used by every encode.
//!
//! An [`Allocator`] owns a growable byte buffer, a write cursor and a hard ceiling
//! (`max_capacity`). Converters append into it; nothing is ever written behind the
//! cursor except by the length-prefix patch described below.
//!
//! ## Anchor and patch
//!
//! Variable-length values nested inside a frame need a length prefix whose value is
//! only known after the value has been written. [`Allocator::anchor_length_prefix`]
//! reserves a 4-byte slot and hands out an [`Anchor`]; once the value has been
//! appended, [`Allocator::close_length_prefix`] measures it and patches the slot.
//!
//! ```text
//! before close:  [.. | s s s s | p p p p p ..]
//!                             ^ anchor offset, payload length L
//! non-compact:   [.. | 1LLLLLLL LLLLLLLL LLLLLLLL LLLLLLLL | p p p p p ..]
//! compact L<32:  [.. | 000LLLLL | p p p p p ..]   (payload moved back 3 bytes)
//! ```
//!
//! An anchor is consumed when closed, so closing it twice does not compile. Anchors are
//! stamped with the identity of the allocator that produced them; closing one against
//! another allocator fails with [`TagwireError::InvalidAnchor`].
//!
//! A compact close moves bytes, so every anchor still open inside the moved payload
//! is retired at that point. Closing a retired anchor also fails with
//! [`TagwireError::InvalidAnchor`] instead of patching bytes that now belong to
//! something else.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::{COMPACT_PREFIX_LIMIT, GROWTH_FACTOR, INITIAL_CAPACITY};
use crate::error::{Result, TagwireError};
use crate::varint;

static NEXT_ALLOCATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Width of the slot reserved by [`Allocator::anchor_length_prefix`].
const ANCHOR_SLOT: usize = 4;

/// A growable, bounded output buffer.
///
/// Single-threaded by construction: converters receive it as `&mut Allocator` for the
/// duration of one encode call.
#[derive(Debug)]
pub struct Allocator {
    /// Storage; `buffer.len()` is the current capacity.
    buffer: Vec<u8>,
    /// Write cursor.
    offset: usize,
    max_capacity: usize,
    id: u64,
    /// Anchors handed out and not yet closed or retired, as `(serial, offset)`.
    open_anchors: Vec<(u64, usize)>,
    next_serial: u64,
}

/// A reserved length-prefix slot awaiting [`Allocator::close_length_prefix`].
///
/// The offset points just past the 4 reserved bytes.
#[derive(Debug)]
#[must_use = "an anchor must be closed or the reserved prefix stays zeroed"]
pub struct Anchor {
    offset: usize,
    owner: u64,
    serial: u64,
}

impl Anchor {
    /// Offset of the first payload byte covered by this anchor.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Allocator {
    /// Creates an unbounded allocator. No memory is allocated until the first write.
    pub fn new() -> Self {
        Self::with_max_capacity(usize::MAX)
    }

    /// Creates an allocator that refuses to grow beyond `max_capacity` bytes.
    pub fn with_max_capacity(max_capacity: usize) -> Self {
        Self::from_vec(Vec::new(), max_capacity)
    }

    /// Creates an allocator on top of caller-supplied storage.
    ///
    /// The existing length of `buffer` becomes the initial capacity (clamped to
    /// `max_capacity`); its contents are treated as scratch space and overwritten.
    pub fn from_vec(mut buffer: Vec<u8>, max_capacity: usize) -> Self {
        buffer.truncate(max_capacity);
        Self {
            buffer,
            offset: 0,
            max_capacity,
            id: NEXT_ALLOCATOR_ID.fetch_add(1, Ordering::Relaxed),
            open_anchors: Vec::new(),
            next_serial: 0,
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.offset
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Current capacity of the underlying storage.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The ceiling fixed at construction.
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn ensure(&mut self, additional: usize) -> Result<()> {
        let required = self
            .offset
            .checked_add(additional)
            .filter(|&r| r <= self.max_capacity)
            .ok_or(TagwireError::AllocatorOverflow {
                requested: self.offset.saturating_add(additional),
                max_capacity: self.max_capacity,
            })?;
        if required <= self.buffer.len() {
            return Ok(());
        }

        let mut capacity = self.buffer.len().max(INITIAL_CAPACITY);
        while capacity < required {
            capacity = capacity.saturating_mul(GROWTH_FACTOR);
        }
        let capacity = capacity.min(self.max_capacity);
        tracing::trace!(from = self.buffer.len(), to = capacity, "allocator grow");
        self.buffer.resize(capacity, 0);
        Ok(())
    }

    /// Advances the cursor by `n` bytes and returns the region that was skipped over.
    ///
    /// # Errors
    /// [`TagwireError::AllocatorOverflow`] if `len() + n` exceeds `max_capacity`.
    pub fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        self.ensure(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(&mut self.buffer[start..start + n])
    }

    /// Copies `bytes` to the end of the buffer.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Appends a single byte.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.reserve(1)?[0] = byte;
        Ok(())
    }

    /// Appends `n` as a minimal-width length prefix.
    pub fn append_length_prefix(&mut self, n: usize) -> Result<()> {
        let (buf, width) = varint::encode_length(n)?;
        self.append(&buf[..width])
    }

    /// Appends `bytes` framed by their length.
    pub fn append_with_length_prefix(&mut self, bytes: &[u8]) -> Result<()> {
        self.append_length_prefix(bytes.len())?;
        self.append(bytes)
    }

    /// Reserves a 4-byte placeholder for a length that is not known yet.
    pub fn anchor_length_prefix(&mut self) -> Result<Anchor> {
        self.reserve(ANCHOR_SLOT)?;
        let serial = self.next_serial;
        self.next_serial += 1;
        self.open_anchors.push((serial, self.offset));
        Ok(Anchor {
            offset: self.offset,
            owner: self.id,
            serial,
        })
    }

    /// Patches the placeholder reserved by `anchor` with the number of bytes written
    /// since.
    ///
    /// With `compact` set and a payload shorter than 32 bytes, the placeholder shrinks
    /// to a single byte and the payload is moved back to follow it.
    ///
    /// # Errors
    /// [`TagwireError::InvalidAnchor`] if the anchor came from another allocator, was
    /// retired by an earlier compact close, or no longer lies within the written region.
    pub fn close_length_prefix(&mut self, anchor: Anchor, compact: bool) -> Result<()> {
        if anchor.owner != self.id {
            return Err(TagwireError::InvalidAnchor(format!(
                "anchor belongs to allocator #{}, closed against #{}",
                anchor.owner, self.id
            )));
        }
        let position = self
            .open_anchors
            .iter()
            .rposition(|&(serial, _)| serial == anchor.serial)
            .ok_or_else(|| {
                TagwireError::InvalidAnchor(format!(
                    "anchor at offset {} was retired when an enclosing prefix was compacted",
                    anchor.offset
                ))
            })?;
        if anchor.offset < ANCHOR_SLOT || anchor.offset > self.offset {
            return Err(TagwireError::InvalidAnchor(format!(
                "anchor offset {} outside written region [{}, {}]",
                anchor.offset, ANCHOR_SLOT, self.offset
            )));
        }
        self.open_anchors.remove(position);

        let length = self.offset - anchor.offset;
        let slot = anchor.offset - ANCHOR_SLOT;
        if compact && length < COMPACT_PREFIX_LIMIT {
            self.buffer[slot] = length as u8;
            self.buffer
                .copy_within(anchor.offset..self.offset, slot + 1);
            self.offset -= ANCHOR_SLOT - 1;
            self.open_anchors.retain(|&(_, offset)| offset <= slot);
        } else {
            let prefix = varint::encode_fixed(length)?;
            self.buffer[slot..anchor.offset].copy_from_slice(&prefix);
        }
        Ok(())
    }

    /// Zero-copy view of the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.offset]
    }

    /// Copies the written bytes into a new vector.
    ///
    /// Returns an empty vector without allocating when nothing was written.
    pub fn extract(&self) -> Vec<u8> {
        if self.offset == 0 {
            return Vec::new();
        }
        self.as_slice().to_vec()
    }

    /// Consumes the allocator and returns its storage truncated to the written bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buffer.truncate(self.offset);
        self.buffer
    }

    /// Returns the storage to its owner with all contents discarded.
    pub(crate) fn into_storage(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets byte-oriented encoders (such as `bincode`) write straight into the buffer.
/// Overflowing `max_capacity` surfaces as [`io::ErrorKind::OutOfMemory`].
impl io::Write for Allocator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)
            .map(|()| buf.len())
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
