//! High-level entry point over a process-wide default generator.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::describe::Describe;
use crate::error::Result;
use crate::generator::Generator;
use crate::token::Token;

static DEFAULT_GENERATOR: OnceLock<Generator> = OnceLock::new();

/// The main entry point: encode and decode with a shared default [`Generator`].
///
/// The default generator has no registered converters and no capacity limit. Build
/// your own with [`Generator::builder`] when you need either.
#[derive(Debug)]
pub struct Tagwire;

impl Tagwire {
    /// The process-wide generator used by the other functions. Created on first use.
    pub fn generator() -> &'static Generator {
        DEFAULT_GENERATOR.get_or_init(Generator::new)
    }

    /// Encodes `item` without a frame.
    pub fn encode<T: Describe>(item: &T) -> Result<Vec<u8>> {
        Self::generator().encode(item)
    }

    /// Encodes `item` with a length prefix when `T` is variable length.
    pub fn encode_auto<T: Describe>(item: &T) -> Result<Vec<u8>> {
        Self::generator().encode_auto(item)
    }

    /// Decodes bytes produced by [`Tagwire::encode`].
    pub fn decode<T: Describe>(bytes: &[u8]) -> Result<T> {
        Self::generator().decode(bytes)
    }

    /// Decodes bytes produced by [`Tagwire::encode_auto`].
    pub fn decode_auto<T: Describe>(bytes: &[u8]) -> Result<T> {
        Self::generator().decode_auto(bytes)
    }

    /// Creates a lazy view over an encoded named object.
    pub fn token(bytes: impl Into<Arc<[u8]>>) -> Token<'static> {
        Self::generator().token(bytes)
    }

    /// Memory-maps `path` and creates a lazy view over its contents.
    pub fn open_token<P: AsRef<Path>>(path: P) -> Result<Token<'static>> {
        Self::generator().open_token(path)
    }
}
