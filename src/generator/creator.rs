use super::Context;
use crate::converter::{ErasedConverter, TypeInfo};
use crate::error::Result;

/// A factory consulted before a type's own [`crate::Describe`] implementation.
///
/// Creators let callers take over whole families of types at runtime. A creator
/// returns `Ok(None)` for types it does not handle; the first creator that returns a
/// converter wins. The returned converter must be built for exactly `type_info`.
///
/// ```rust
/// use std::sync::Arc;
/// use tagwire::{Context, ConverterCreator, ErasedConverter, Generator, Result, TypeInfo};
/// use tagwire::converters::LittleEndianConverter;
///
/// /// Supplies the converter for `u64` and defers on everything else.
/// #[derive(Debug)]
/// struct OnlyU64;
///
/// impl ConverterCreator for OnlyU64 {
///     fn create(&self, _: &mut Context<'_>, info: TypeInfo) -> Result<Option<ErasedConverter>> {
///         if info == TypeInfo::of::<u64>() {
///             return Ok(Some(ErasedConverter::from_converter::<u64, _>(
///                 LittleEndianConverter::<u64>::new(),
///             )));
///         }
///         Ok(None)
///     }
/// }
///
/// let generator = Generator::builder().with_creator(OnlyU64).build();
/// assert_eq!(generator.encode(&7u64)?, vec![7, 0, 0, 0, 0, 0, 0, 0]);
/// # Ok::<(), tagwire::TagwireError>(())
/// ```
pub trait ConverterCreator: Send + Sync + std::fmt::Debug {
    /// Builds a converter for `type_info`, or returns `None` to defer to the next strategy.
    fn create(
        &self,
        context: &mut Context<'_>,
        type_info: TypeInfo,
    ) -> Result<Option<ErasedConverter>>;
}
