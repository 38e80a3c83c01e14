//! Named objects: a sequence of `[key][value]` pairs.
//!
//! ```text
//! [keyLen][key bytes][valueLen][value bytes] [keyLen][key bytes][valueLen][value bytes] ...
//! ```
//!
//! Keys are encoded once per type when the converter is built. Values always carry a
//! length prefix, which lets a decoder skip keys it does not know and lets
//! [`crate::Token`] split an object without knowing its type.

use std::marker::PhantomData;
use std::sync::Arc;

use super::member::{Construction, Field, Framing, Member, MemberValues, Slot, assign_strategy};
use crate::allocator::Allocator;
use crate::converter::Converter;
use crate::describe::Describe;
use crate::error::{Result, TagwireError};
use crate::generator::Context;
use crate::trie::KeyTrie;
use crate::varint;

/// Collects the members of a named object. Created by [`Context::named_object`].
///
/// Member converters are resolved as members are added; the first failure is kept and
/// reported by [`construct`](Self::construct) or [`assign`](Self::assign).
pub struct NamedObjectBuilder<'c, 'g, T> {
    context: &'c mut Context<'g>,
    keys: Vec<String>,
    members: Vec<Box<dyn Member<T>>>,
    error: Option<TagwireError>,
}

impl<'c, 'g, T: Send + 'static> NamedObjectBuilder<'c, 'g, T> {
    pub(crate) fn new(context: &'c mut Context<'g>) -> Self {
        Self {
            context,
            keys: Vec::new(),
            members: Vec::new(),
            error: None,
        }
    }

    fn push<V: Describe>(
        mut self,
        key: String,
        make: impl FnOnce(Arc<dyn Converter<V>>) -> Field<T, V>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.context.resolve::<V>() {
            Ok(converter) => {
                self.keys.push(key);
                self.members.push(Box::new(make(converter)));
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Adds a required member. It is always written and must be present when decoding.
    pub fn field<V: Describe>(
        self,
        key: impl Into<String>,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
    ) -> Self {
        self.push(key.into(), |c| Field::required(c, Box::new(get), None))
    }

    /// Adds an optional member. It is omitted from the output while it equals
    /// `V::default()` and decodes to `V::default()` when absent.
    pub fn optional<V: Describe + Default + PartialEq>(
        self,
        key: impl Into<String>,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
    ) -> Self {
        self.push(key.into(), |c| Field::optional(c, Box::new(get), None))
    }

    /// Adds a required member that can also be assigned, for use with [`assign`](Self::assign).
    pub fn field_mut<V: Describe>(
        self,
        key: impl Into<String>,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        self.push(key.into(), |c| {
            Field::required(c, Box::new(get), Some(Box::new(set)))
        })
    }

    /// Adds an optional member that can also be assigned.
    pub fn optional_mut<V: Describe + Default + PartialEq>(
        self,
        key: impl Into<String>,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        self.push(key.into(), |c| {
            Field::optional(c, Box::new(get), Some(Box::new(set)))
        })
    }

    /// Finishes the description; decoded objects are built by `ctor`.
    pub fn construct(
        self,
        ctor: impl Fn(&mut MemberValues) -> Result<T> + Send + Sync + 'static,
    ) -> Result<Arc<dyn Converter<T>>> {
        self.finish(|_| Ok(Construction::Constructor(Box::new(ctor))))
    }

    /// Finishes the description; decoded objects start from `T::default()` and every
    /// member is assigned through its setter.
    pub fn assign(self) -> Result<Arc<dyn Converter<T>>>
    where
        T: Default,
    {
        self.finish(|members| assign_strategy(std::any::type_name::<T>(), members))
    }

    fn finish(
        self,
        construction: impl FnOnce(&[Box<dyn Member<T>>]) -> Result<Construction<T>>,
    ) -> Result<Arc<dyn Converter<T>>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let converter = NamedObjectConverter::new(self.keys, self.members, construction)?;
        Ok(Arc::new(converter))
    }
}

/// Converter for a named object.
pub struct NamedObjectConverter<T> {
    type_name: &'static str,
    keys: Vec<String>,
    encoded_keys: Vec<Box<[u8]>>,
    members: Vec<Box<dyn Member<T>>>,
    trie: KeyTrie,
    construction: Construction<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> NamedObjectConverter<T> {
    fn new(
        keys: Vec<String>,
        members: Vec<Box<dyn Member<T>>>,
        construction: impl FnOnce(&[Box<dyn Member<T>>]) -> Result<Construction<T>>,
    ) -> Result<Self> {
        let type_name = std::any::type_name::<T>();
        if members.is_empty() {
            return Err(TagwireError::NoAvailableMember(type_name));
        }
        let trie = KeyTrie::build(type_name, &keys)?;
        let encoded_keys = keys
            .iter()
            .map(|key| {
                let (prefix, width) = varint::encode_length(key.len())?;
                let mut bytes = Vec::with_capacity(width + key.len());
                bytes.extend_from_slice(&prefix[..width]);
                bytes.extend_from_slice(key.as_bytes());
                Ok(bytes.into_boxed_slice())
            })
            .collect::<Result<Vec<_>>>()?;
        let construction = construction(&members)?;

        Ok(Self {
            type_name,
            keys,
            encoded_keys,
            members,
            trie,
            construction,
            _marker: PhantomData,
        })
    }

    /// Member keys in declaration order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl<T: 'static> Converter<T> for NamedObjectConverter<T> {
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &T) -> Result<()> {
        for (member, key) in self.members.iter().zip(&self.encoded_keys) {
            if member.is_optional() && member.is_default(item) {
                continue;
            }
            allocator.append(key)?;
            member.encode(allocator, item, Framing::LengthPrefixed)?;
        }
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<T> {
        let mut slots: Vec<Option<Slot>> = self.members.iter().map(|_| None).collect();
        let mut rest = span;
        while !rest.is_empty() {
            let key = varint::split_length_prefixed(&mut rest)?;
            let mut value = varint::split_length_prefixed(&mut rest)?;
            let Some(index) = self.trie.find(key) else {
                continue;
            };
            if slots[index].is_some() {
                return Err(TagwireError::DuplicateKey {
                    type_name: self.type_name,
                    key: self.keys[index].clone(),
                });
            }
            slots[index] = Some(self.members[index].decode(&mut value, Framing::Bare)?);
        }

        for (index, slot) in slots.iter_mut().enumerate() {
            if slot.is_some() {
                continue;
            }
            match self.members[index].default_slot() {
                Some(default) => *slot = Some(default),
                None => {
                    return Err(TagwireError::MissingRequiredMember {
                        type_name: self.type_name,
                        key: self.keys[index].clone(),
                    });
                }
            }
        }

        self.construction
            .construct(&self.members, MemberValues::new(self.type_name, slots))
    }
}

impl<T> std::fmt::Debug for NamedObjectConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedObjectConverter")
            .field("type_name", &self.type_name)
            .field("keys", &self.keys)
            .finish()
    }
}
