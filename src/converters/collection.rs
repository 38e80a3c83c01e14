//! Sequences, sets and maps.
//!
//! A collection's bare encoding is its items back to back, each written with the auto
//! variant: fixed-length items are packed, variable-length items carry a prefix. There
//! is no element count; the decoder reads items until the span is exhausted. Maps
//! alternate keys and values in the same way.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::allocator::Allocator;
use crate::converter::Converter;
use crate::describe::Describe;
use crate::error::Result;
use crate::generator::Context;

/// Converter for a collection `C` of `T`.
pub struct SequenceConverter<C, T> {
    item: Arc<dyn Converter<T>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C, T> SequenceConverter<C, T> {
    /// Uses `item` for every element.
    pub fn new(item: Arc<dyn Converter<T>>) -> Self {
        Self {
            item,
            _marker: PhantomData,
        }
    }
}

impl<C, T> Converter<C> for SequenceConverter<C, T>
where
    C: FromIterator<T>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &C) -> Result<()> {
        for element in item {
            self.item.encode_auto(allocator, element)?;
        }
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<C> {
        let mut rest = span;
        std::iter::from_fn(|| (!rest.is_empty()).then(|| self.item.decode_auto(&mut rest)))
            .collect()
    }
}

/// Converter for a map `M` from `K` to `V`.
pub struct MapConverter<M, K, V> {
    key: Arc<dyn Converter<K>>,
    value: Arc<dyn Converter<V>>,
    _marker: PhantomData<fn() -> M>,
}

impl<M, K, V> MapConverter<M, K, V> {
    /// Uses `key` and `value` for every entry.
    pub fn new(key: Arc<dyn Converter<K>>, value: Arc<dyn Converter<V>>) -> Self {
        Self {
            key,
            value,
            _marker: PhantomData,
        }
    }
}

impl<M, K, V> Converter<M> for MapConverter<M, K, V>
where
    M: FromIterator<(K, V)>,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
{
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &M) -> Result<()> {
        for (key, value) in item {
            self.key.encode_auto(allocator, key)?;
            self.value.encode_auto(allocator, value)?;
        }
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<M> {
        let mut rest = span;
        std::iter::from_fn(|| {
            (!rest.is_empty()).then(|| {
                let key = self.key.decode_auto(&mut rest)?;
                let value = self.value.decode_auto(&mut rest)?;
                Ok((key, value))
            })
        })
        .collect()
    }
}

macro_rules! impl_describe_sequence {
    ($($collection:ident<T $(: $bound:path)?>),*) => {
        $(
            impl<T: Describe $(+ $bound)?> Describe for $collection<T> {
                fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
                    let item = context.resolve::<T>()?;
                    Ok(Arc::new(SequenceConverter::<Self, T>::new(item)))
                }
            }
        )*
    }
}

impl_describe_sequence!(Vec<T>, VecDeque<T>, BTreeSet<T: Ord>);

impl<T: Describe + Eq + Hash> Describe for HashSet<T> {
    fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        let item = context.resolve::<T>()?;
        Ok(Arc::new(SequenceConverter::<Self, T>::new(item)))
    }
}

impl<K: Describe + Eq + Hash, V: Describe> Describe for HashMap<K, V> {
    fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        let key = context.resolve::<K>()?;
        let value = context.resolve::<V>()?;
        Ok(Arc::new(MapConverter::<Self, K, V>::new(key, value)))
    }
}

impl<K: Describe + Ord, V: Describe> Describe for BTreeMap<K, V> {
    fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
        let key = context.resolve::<K>()?;
        let value = context.resolve::<V>()?;
        Ok(Arc::new(MapConverter::<Self, K, V>::new(key, value)))
    }
}
