//! Lazy, type-free navigation of encoded named objects.
//!
//! A [`Token`] is a view over a span of encoded bytes. It does not know the type the
//! bytes were written from; it only relies on the named-object frame, in which every
//! key and every value carries a length prefix. Splitting a token into its children
//! happens on first access and is cached for the token's lifetime, so sibling lookups
//! cost one scan in total.
//!
//! ```
//! use std::sync::Arc;
//! use tagwire::{Context, Converter, Describe, Tagwire};
//!
//! struct Server {
//!     name: String,
//!     port: u16,
//! }
//!
//! impl Describe for Server {
//!     fn describe(context: &mut Context<'_>) -> tagwire::Result<Arc<dyn Converter<Self>>> {
//!         context
//!             .named_object::<Self>()
//!             .field("name", |s| &s.name)
//!             .field("port", |s| &s.port)
//!             .construct(|m| Ok(Server { name: m.take()?, port: m.take()? }))
//!     }
//! }
//!
//! let bytes = Tagwire::encode(&Server { name: "edge".into(), port: 8080 })?;
//! let token = Tagwire::token(bytes);
//! assert_eq!(token.navigate("port")?.decode_as::<u16>()?, 8080);
//! # Ok::<(), tagwire::TagwireError>(())
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Range;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::describe::Describe;
use crate::error::{Result, TagwireError};
use crate::generator::Generator;
use crate::source::ByteSource;
use crate::varint;

/// A lazily split view over an encoded value.
///
/// `Token` is `Send + Sync`; concurrent first accesses to [`children`](Self::children)
/// compute the child map exactly once.
pub struct Token<'g> {
    generator: &'g Generator,
    source: ByteSource,
    range: Range<usize>,
    children: OnceLock<Result<HashMap<String, Token<'g>>>>,
}

impl<'g> Token<'g> {
    /// Creates a token over `bytes`, decoding leaves with `generator`.
    pub fn new(generator: &'g Generator, bytes: impl Into<Arc<[u8]>>) -> Self {
        let source = ByteSource::from(bytes.into());
        let range = 0..source.len();
        Self::with_source(generator, source, range)
    }

    /// Memory-maps the file at `path` and creates a token over its whole contents.
    pub fn open<P: AsRef<Path>>(generator: &'g Generator, path: P) -> Result<Self> {
        let source = ByteSource::map(path)?;
        let range = 0..source.len();
        Ok(Self::with_source(generator, source, range))
    }

    fn with_source(generator: &'g Generator, source: ByteSource, range: Range<usize>) -> Self {
        Self {
            generator,
            source,
            range,
            children: OnceLock::new(),
        }
    }

    /// The bytes this token covers.
    pub fn as_bytes(&self) -> &[u8] {
        &self.source[self.range.clone()]
    }

    /// Number of bytes this token covers.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns true if the token covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The child tokens of this span, read as a named object.
    ///
    /// The map is built on first call. If the span is not a well-formed named object the
    /// error is remembered and returned again on every later call.
    ///
    /// # Errors
    /// [`TagwireError::NotEnoughBytes`] for a truncated frame,
    /// [`TagwireError::DuplicateKey`] for a repeated key and
    /// [`TagwireError::InvalidData`] for a key that is not UTF-8.
    pub fn children(&self) -> Result<&HashMap<String, Token<'g>>> {
        self.children
            .get_or_init(|| self.split())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The child token stored under `key`.
    ///
    /// # Errors
    /// [`TagwireError::KeyNotFound`] if the object has no such key, or any error from
    /// [`children`](Self::children).
    pub fn navigate(&self, key: &str) -> Result<&Token<'g>> {
        self.children()?
            .get(key)
            .ok_or_else(|| TagwireError::KeyNotFound(key.to_owned()))
    }

    /// Like [`navigate`](Self::navigate), but `None` on any failure.
    pub fn get(&self, key: &str) -> Option<&Token<'g>> {
        self.children().ok()?.get(key)
    }

    /// Decodes the whole span as a bare `T`.
    pub fn decode_as<T: Describe>(&self) -> Result<T> {
        self.generator.decode::<T>(self.as_bytes())
    }

    fn split(&self) -> Result<HashMap<String, Token<'g>>> {
        let bytes = self.as_bytes();
        let mut children = HashMap::new();
        let mut rest = bytes;
        while !rest.is_empty() {
            let key = varint::split_length_prefixed(&mut rest)?;
            let value = varint::split_length_prefixed(&mut rest)?;
            let end = bytes.len() - rest.len();
            let start = end - value.len();

            let key = std::str::from_utf8(key)
                .map_err(|e| TagwireError::InvalidData(format!("token key is not UTF-8: {e}")))?;
            match children.entry(key.to_owned()) {
                Entry::Occupied(entry) => {
                    return Err(TagwireError::DuplicateKey {
                        type_name: "Token",
                        key: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    let range = self.range.start + start..self.range.start + end;
                    entry.insert(Self::with_source(self.generator, self.source.clone(), range));
                }
            }
        }
        tracing::trace!(len = bytes.len(), children = children.len(), "token split");
        Ok(children)
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("range", &self.range)
            .field("split", &self.children.get().is_some())
            .finish()
    }
}
