//! # Tagwire
//!
//! A compact, self-describing binary codec with a forward-compatible object format and
//! lazy, type-free navigation of encoded data.
//!
//! ## Overview
//!
//! Tagwire turns a Rust type into a [`Converter`] once, caches it, and reuses it for
//! every encode and decode of that type. Converters are assembled from the type's
//! structure: primitives map to fixed little-endian cells, `Option<T>` gets a one-byte
//! presence tag, collections become packed item runs and user types become either
//! *named objects* (key/value pairs) or *tuple objects* (positional concatenation).
//!
//! ### Key Features
//!
//! *   **Forward Compatibility:** Named objects carry their keys. Decoders skip keys
//!     they do not know and fill optional members that are missing with defaults.
//! *   **Minimal Framing:** Lengths are written with a 1, 2 or 4 byte prefix, and only
//!     where a value's extent is not known from its type.
//! *   **Lazy Navigation:** A [`Token`] splits a named object into children on first
//!     access and decodes leaves on demand, from memory or a memory-mapped file.
//! *   **Cycle Detection:** Resolving a type that contains itself fails with
//!     [`TagwireError::CircularTypeReference`] instead of recursing.
//! *   **Thread Safety:** A [`Generator`] is `Send + Sync`; converters are resolved once
//!     and shared across threads.
//!
//! ## Architecture
//!
//! ### Wire Format
//!
//! Length prefixes use the top bits of the first byte as a tag:
//! ```text
//! 00xxxxxx                                   -> 0 ..= 0x3F
//! 01xxxxxx xxxxxxxx                          -> 0 ..= 0x3FFF        (big-endian)
//! 1xxxxxxx xxxxxxxx xxxxxxxx xxxxxxxx        -> 0 ..= 0x7FFF_FFFF   (big-endian)
//! ```
//!
//! Composite frames:
//! ```text
//! named:    [keyLen][key][valueLen][value] [keyLen][key][valueLen][value] ...
//! tuple:    [auto m0][auto m1] ... [bare mN]
//! nullable: [0x00] | [0x01][bare value]
//! ```
//!
//! Every converter has three variants: *bare* (no frame), *length-prefixed* and *auto*
//! (bare when the converter has a fixed length, length-prefixed otherwise).
//!
//! ## Core Concepts
//!
//! ### Generator
//!
//! The [`Generator`] resolves converters. It consults, in order, converters registered
//! through [`GeneratorBuilder`], registered [`ConverterCreator`]s, and finally the
//! type's [`Describe`] implementation.
//!
//! ### Allocator
//!
//! The [`Allocator`] is the bounded output buffer. Nested variable-length values reserve
//! a length slot with an [`Anchor`] and patch it once their size is known.
//!
//! ## Usage Patterns
//!
//! ### Basic Encoding
//!
//! ```rust
//! use tagwire::Tagwire;
//!
//! let bytes = Tagwire::encode(&(7u32, String::from("seven")))?;
//! let (n, s): (u32, String) = Tagwire::decode(&bytes)?;
//! assert_eq!((n, s.as_str()), (7, "seven"));
//! # Ok::<(), tagwire::TagwireError>(())
//! ```
//!
//! ### User Types
//!
//! See [`Describe`] for a named object and [`token`] for lazy navigation.
//!
//! ### Safety and Error Handling
//!
//! * **Encapsulated Unsafe:** the only `unsafe` block maps files in [`source`].
//! * **No Panics:** No `unwrap()` or `panic!()` calls in the library (enforced by clippy lints).
//! * **Comprehensive Errors:** All failures correspond to a [`TagwireError`] variant.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod allocator;
pub mod api;
pub mod converter;
pub mod converters;
pub mod describe;
pub mod error;
pub mod generator;
pub mod inspector;
pub mod object;
pub mod source;
pub mod token;
pub mod trie;
pub mod varint;

// Private modules
mod pool;

// --- RE-EXPORTS ---

pub use allocator::{Allocator, Anchor};
pub use api::Tagwire;
pub use converter::{Converter, ErasedConverter, TypeInfo};
pub use describe::Describe;
pub use error::{Result, TagwireError};
pub use generator::{Context, ConverterCreator, Generator, GeneratorBuilder, GeneratorOptions};
pub use inspector::{TokenInspector, TokenReport};
pub use object::MemberValues;
pub use token::Token;
pub use trie::KeyTrie;

/// Constants used throughout the library.
pub mod constants {
    /// Capacity of an allocator's first allocation.
    pub const INITIAL_CAPACITY: usize = 64;
    /// Factor by which an allocator grows when it runs out of room.
    pub const GROWTH_FACTOR: usize = 4;
    /// Payloads shorter than this get a 1-byte prefix when an anchor is closed compactly.
    pub const COMPACT_PREFIX_LIMIT: usize = 32;
    /// Largest key count served by the bucketed key lookup before switching to hashing.
    pub const KEY_TRIE_BUCKET_LIMIT: usize = 16;
    /// Scratch buffers larger than this are dropped instead of returned to the pool.
    pub const SCRATCH_RETAIN_LIMIT: usize = 64 * 1024;
    /// Largest length a prefix can express.
    pub const MAX_LENGTH: usize = 0x7FFF_FFFF;
}
