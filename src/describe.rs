//! How a type tells the resolver what it is made of.
//!
//! [`Describe`] is the only bound the [`crate::Generator`] places on the types it
//! encodes. The crate implements it for primitives and well-known types, `Option<T>`,
//! `Box<T>`, the standard collections and tuples. User types implement it by listing
//! their members:
//!
//! ```rust
//! use std::sync::Arc;
//! use tagwire::{Context, Converter, Describe, Generator, Result};
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     nickname: Option<String>,
//! }
//!
//! impl Describe for User {
//!     fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
//!         context
//!             .named_object::<User>()
//!             .field("id", |u| &u.id)
//!             .field("name", |u| &u.name)
//!             .optional("nickname", |u| &u.nickname)
//!             .construct(|m| {
//!                 Ok(User {
//!                     id: m.take()?,
//!                     name: m.take()?,
//!                     nickname: m.take()?,
//!                 })
//!             })
//!     }
//! }
//!
//! let generator = Generator::new();
//! let user = User { id: 7, name: "ada".into(), nickname: None };
//! let bytes = generator.encode(&user)?;
//! assert_eq!(generator.decode::<User>(&bytes)?, user);
//! # Ok::<(), tagwire::TagwireError>(())
//! ```
//!
//! A type with an empty implementation is *opaque*: it resolves only if a converter for
//! it was registered with [`crate::GeneratorBuilder::with_converter`] or produced by a
//! [`crate::ConverterCreator`], and fails with [`TagwireError::UnsupportedType`]
//! otherwise.

use std::sync::Arc;

use crate::converter::Converter;
use crate::error::{Result, TagwireError};
use crate::generator::Context;

/// A type the resolver can build a converter for.
///
/// Raw pointers, borrowed and unsized types cannot implement this trait, which is how
/// the resolver rejects them before any strategy runs.
pub trait Describe: Sized + Send + 'static {
    /// Builds the converter for `Self`, resolving member converters through `context`.
    ///
    /// The default implementation marks the type as opaque.
    fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        let _ = context;
        Err(TagwireError::UnsupportedType(std::any::type_name::<Self>()))
    }
}
