//! Centralized error handling for tagwire.
//!
//! Every failure in the crate is reported through [`TagwireError`]; library code never
//! panics on malformed input or misuse. Encoding is an in-memory transform, so nothing
//! here is retried: an error propagates to the caller immediately and any partially
//! written buffer is dropped with the allocator that held it.
//!
//! ## Error Categories
//!
//! - **Wire format** ([`TagwireError::NotEnoughBytes`], [`TagwireError::InvalidLengthPrefixTag`],
//!   [`TagwireError::InvalidNullableTag`], [`TagwireError::InvalidData`]): the input bytes
//!   do not describe a value of the requested type.
//! - **Buffer** ([`TagwireError::AllocatorOverflow`], [`TagwireError::InvalidAnchor`]):
//!   the write buffer hit its ceiling or a length-prefix anchor was misused.
//! - **Resolution** ([`TagwireError::CircularTypeReference`], [`TagwireError::NoAvailableMember`],
//!   [`TagwireError::DuplicateKey`], [`TagwireError::NonSequentialIndex`],
//!   [`TagwireError::UnsupportedType`]): a converter could not be built for a type.
//! - **Object decode** ([`TagwireError::MissingRequiredMember`], [`TagwireError::KeyNotFound`]).
//! - **Foreign** ([`TagwireError::Io`], [`TagwireError::Serialization`]): memory-mapped
//!   sources and the bincode bridge.
//!
//! ## Usage
//!
//! ```rust
//! use tagwire::{Tagwire, TagwireError};
//!
//! match Tagwire::decode::<u32>(&[0x01, 0x02]) {
//!     Err(TagwireError::NotEnoughBytes { needed, available }) => {
//!         assert_eq!((needed, available), (4, 2));
//!     }
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

/// A specialized `Result` type for tagwire operations.
pub type Result<T> = std::result::Result<T, TagwireError>;

/// The master error enum covering all failure domains in tagwire.
///
/// The type is `Clone` so that memoized failures (for example a [`crate::Token`] whose
/// bytes are not a named object) can be handed out again on every access. I/O errors are
/// wrapped in `Arc` to make that cheap.
#[derive(Debug, Clone)]
pub enum TagwireError {
    /// A decode tried to read past the end of the available span.
    NotEnoughBytes {
        /// Bytes the decoder needed.
        needed: usize,
        /// Bytes that were left in the span.
        available: usize,
    },

    /// An encode would grow the allocator beyond its `max_capacity`.
    AllocatorOverflow {
        /// Total bytes the write would have required.
        requested: usize,
        /// The ceiling fixed at construction.
        max_capacity: usize,
    },

    /// A length-prefix anchor was closed against the wrong allocator, or points outside
    /// the written region.
    InvalidAnchor(String),

    /// A fixed-width length slot did not carry the 4-byte tag.
    InvalidLengthPrefixTag(u8),

    /// A nullable frame started with a tag other than `0` or `1`.
    InvalidNullableTag(u8),

    /// Resolution of a type re-entered itself.
    ///
    /// `path` lists the in-flight types from the outermost request to the repeated one.
    CircularTypeReference {
        /// The type that was requested while already being resolved.
        type_name: &'static str,
        /// The resolution stack at the time the cycle was detected.
        path: Vec<&'static str>,
    },

    /// A composite type described zero members.
    NoAvailableMember(&'static str),

    /// Two members share a key or positional index, or an encoded named object repeats a key.
    DuplicateKey {
        /// The type being built or decoded.
        type_name: &'static str,
        /// The repeated key (positional indices are rendered as decimal strings).
        key: String,
    },

    /// Positional indices of a tuple object do not start at 0 or contain a gap.
    NonSequentialIndex {
        /// The type being built.
        type_name: &'static str,
        /// The first index that broke the sequence.
        index: usize,
    },

    /// A named-object decode finished without seeing a required key.
    MissingRequiredMember {
        /// The type being decoded.
        type_name: &'static str,
        /// The missing key.
        key: String,
    },

    /// The type has no encoding strategy and no explicit converter was registered for it.
    UnsupportedType(&'static str),

    /// A caller-supplied value violates an API precondition.
    InvalidArgument(String),

    /// [`crate::Token::navigate`] was asked for a key the encoded object does not contain.
    KeyNotFound(String),

    /// The bytes were framed correctly but the payload is not a valid value
    /// (bad UTF-8, a boolean other than 0/1, an invalid `char`, ...).
    InvalidData(String),

    /// Failure inside the `bincode` bridge for serde types.
    Serialization(String),

    /// Low-level I/O failure while opening or mapping a source file.
    Io(Arc<io::Error>),
}

impl fmt::Display for TagwireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughBytes { needed, available } => {
                write!(f, "Not enough bytes: needed {needed}, available {available}")
            }
            Self::AllocatorOverflow {
                requested,
                max_capacity,
            } => write!(
                f,
                "Allocator overflow: {requested} bytes requested, maximum capacity is {max_capacity}"
            ),
            Self::InvalidAnchor(s) => write!(f, "Invalid anchor: {s}"),
            Self::InvalidLengthPrefixTag(b) => write!(f, "Invalid length prefix tag: {b:#04x}"),
            Self::InvalidNullableTag(b) => write!(f, "Invalid nullable tag: {b}"),
            Self::CircularTypeReference { type_name, path } => write!(
                f,
                "Circular type reference detected for '{type_name}' (resolution path: {})",
                path.join(" -> ")
            ),
            Self::NoAvailableMember(t) => write!(f, "No available member found for type '{t}'"),
            Self::DuplicateKey { type_name, key } => {
                write!(f, "Duplicate key '{key}' for type '{type_name}'")
            }
            Self::NonSequentialIndex { type_name, index } => write!(
                f,
                "Tuple index {index} of type '{type_name}' is not sequential"
            ),
            Self::MissingRequiredMember { type_name, key } => write!(
                f,
                "Missing required member '{key}' while decoding type '{type_name}'"
            ),
            Self::UnsupportedType(t) => write!(f, "Unsupported type: '{t}'"),
            Self::InvalidArgument(s) => write!(f, "Invalid argument: {s}"),
            Self::KeyNotFound(k) => write!(f, "Key '{k}' not found"),
            Self::InvalidData(s) => write!(f, "Invalid data: {s}"),
            Self::Serialization(s) => write!(f, "Serialization Error: {s}"),
            Self::Io(e) => write!(f, "I/O Error: {e}"),
        }
    }
}

impl std::error::Error for TagwireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TagwireError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl TagwireError {
    pub(crate) fn not_enough(needed: usize, available: usize) -> Self {
        Self::NotEnoughBytes { needed, available }
    }
}
