//! Tuple objects: members concatenated in positional order.
//!
//! Every member except the last uses the auto variant, so only variable-length members
//! carry a length prefix. The last member is bare and runs to the end of the enclosing
//! frame. When every member has a fixed length the whole object does too.

use std::sync::Arc;

use super::member::{Construction, Field, Framing, Member, MemberValues, assign_strategy};
use crate::allocator::Allocator;
use crate::converter::{Converter, exact_span};
use crate::describe::Describe;
use crate::error::{Result, TagwireError};
use crate::generator::Context;

/// Collects the members of a tuple object. Created by [`Context::tuple_object`].
///
/// [`field`](Self::field) assigns the next index (the number of members added so far);
/// [`at`](Self::at) takes an explicit one. Indices must end up forming `0..n`.
pub struct TupleObjectBuilder<'c, 'g, T> {
    context: &'c mut Context<'g>,
    members: Vec<(usize, Box<dyn Member<T>>)>,
    error: Option<TagwireError>,
}

impl<'c, 'g, T: Send + 'static> TupleObjectBuilder<'c, 'g, T> {
    pub(crate) fn new(context: &'c mut Context<'g>) -> Self {
        Self {
            context,
            members: Vec::new(),
            error: None,
        }
    }

    fn push<V: Describe>(
        mut self,
        index: usize,
        make: impl FnOnce(Arc<dyn Converter<V>>) -> Field<T, V>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.context.resolve::<V>() {
            Ok(converter) => self.members.push((index, Box::new(make(converter)))),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Adds the member at the next index.
    pub fn field<V: Describe>(self, get: impl Fn(&T) -> &V + Send + Sync + 'static) -> Self {
        let index = self.members.len();
        self.at(index, get)
    }

    /// Adds the member at the next index with a setter, for use with [`assign`](Self::assign).
    pub fn field_mut<V: Describe>(
        self,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        let index = self.members.len();
        self.push(index, |c| {
            Field::required(c, Box::new(get), Some(Box::new(set)))
        })
    }

    /// Adds the member at an explicit position.
    pub fn at<V: Describe>(
        self,
        index: usize,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
    ) -> Self {
        self.push(index, |c| Field::required(c, Box::new(get), None))
    }

    /// Finishes the description; decoded objects are built by `ctor`, which receives
    /// the members in index order.
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
        let type_name = std::any::type_name::<T>();
        if self.members.is_empty() {
            return Err(TagwireError::NoAvailableMember(type_name));
        }

        let mut indexed = self.members;
        indexed.sort_by_key(|(index, _)| *index);
        if let Some(pair) = indexed.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(TagwireError::DuplicateKey {
                type_name,
                key: pair[0].0.to_string(),
            });
        }
        for (expected, (index, _)) in indexed.iter().enumerate() {
            if *index != expected {
                return Err(TagwireError::NonSequentialIndex {
                    type_name,
                    index: *index,
                });
            }
        }

        let members: Vec<Box<dyn Member<T>>> = indexed.into_iter().map(|(_, m)| m).collect();
        let construction = construction(&members)?;
        Ok(Arc::new(TupleObjectConverter::new(type_name, members, construction)))
    }
}

/// Converter for a tuple object.
pub struct TupleObjectConverter<T> {
    type_name: &'static str,
    members: Vec<Box<dyn Member<T>>>,
    construction: Construction<T>,
    fixed_length: usize,
}

impl<T> TupleObjectConverter<T> {
    fn new(
        type_name: &'static str,
        members: Vec<Box<dyn Member<T>>>,
        construction: Construction<T>,
    ) -> Self {
        let fixed_length = if members.iter().all(|m| m.fixed_length() > 0) {
            members.iter().map(|m| m.fixed_length()).sum()
        } else {
            0
        };
        Self {
            type_name,
            members,
            construction,
            fixed_length,
        }
    }

    fn framing(&self, index: usize) -> Framing {
        if index + 1 == self.members.len() {
            Framing::Bare
        } else {
            Framing::Auto
        }
    }
}

impl<T> Converter<T> for TupleObjectConverter<T> {
    fn fixed_length(&self) -> usize {
        self.fixed_length
    }

    fn encode(&self, allocator: &mut Allocator, item: &T) -> Result<()> {
        for (index, member) in self.members.iter().enumerate() {
            member.encode(allocator, item, self.framing(index))?;
        }
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<T> {
        let mut rest = if self.fixed_length > 0 {
            exact_span(span, self.fixed_length)?
        } else {
            span
        };
        let mut slots = Vec::with_capacity(self.members.len());
        for (index, member) in self.members.iter().enumerate() {
            slots.push(Some(member.decode(&mut rest, self.framing(index))?));
        }
        self.construction
            .construct(&self.members, MemberValues::new(self.type_name, slots))
    }
}

impl<T> std::fmt::Debug for TupleObjectConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TupleObjectConverter")
            .field("type_name", &self.type_name)
            .field("members", &self.members.len())
            .field("fixed_length", &self.fixed_length)
            .finish()
    }
}
