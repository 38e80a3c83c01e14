//! `Box<T>`.

use std::sync::Arc;

use crate::allocator::Allocator;
use crate::converter::Converter;
use crate::describe::Describe;
use crate::error::Result;
use crate::generator::Context;

/// `Box<T>` encodes exactly like `T`.
pub struct BoxConverter<T> {
    inner: Arc<dyn Converter<T>>,
}

impl<T> Converter<Box<T>> for BoxConverter<T> {
    fn fixed_length(&self) -> usize {
        self.inner.fixed_length()
    }

    fn encode(&self, allocator: &mut Allocator, item: &Box<T>) -> Result<()> {
        self.inner.encode(allocator, item)
    }

    fn decode(&self, span: &[u8]) -> Result<Box<T>> {
        self.inner.decode(span).map(Box::new)
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        let inner = context.resolve::<T>()?;
        Ok(Arc::new(BoxConverter { inner }))
    }
}
