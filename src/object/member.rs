//! Type-erased member access shared by the named and tuple object codecs.

use std::any::Any;
use std::sync::Arc;

use crate::allocator::Allocator;
use crate::converter::Converter;
use crate::error::{Result, TagwireError};

/// A decoded member value waiting to be moved into the object under construction.
pub(crate) type Slot = Box<dyn Any + Send>;

/// How a member is framed inside its composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    Bare,
    Auto,
    LengthPrefixed,
}

/// One member of a composite `T`, with its value type erased.
pub(crate) trait Member<T>: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn fixed_length(&self) -> usize;
    fn is_optional(&self) -> bool;
    /// True if the member is optional and currently holds its default value.
    fn is_default(&self, item: &T) -> bool;
    fn has_setter(&self) -> bool;
    fn encode(&self, allocator: &mut Allocator, item: &T, framing: Framing) -> Result<()>;
    /// `Framing::Bare` consumes the rest of `span`.
    fn decode(&self, span: &mut &[u8], framing: Framing) -> Result<Slot>;
    fn default_slot(&self) -> Option<Slot>;
    fn assign(&self, target: &mut T, slot: Slot) -> Result<()>;
}

pub(crate) type Getter<T, V> = Box<dyn Fn(&T) -> &V + Send + Sync>;
pub(crate) type Setter<T, V> = Box<dyn Fn(&mut T, V) + Send + Sync>;

struct Defaults<V> {
    make: fn() -> V,
    check: fn(&V) -> bool,
}

fn equals_default<V: Default + PartialEq>(value: &V) -> bool {
    *value == V::default()
}

pub(crate) struct Field<T, V> {
    converter: Arc<dyn Converter<V>>,
    getter: Getter<T, V>,
    setter: Option<Setter<T, V>>,
    defaults: Option<Defaults<V>>,
}

impl<T, V: Send + 'static> Field<T, V> {
    pub(crate) fn required(
        converter: Arc<dyn Converter<V>>,
        getter: Getter<T, V>,
        setter: Option<Setter<T, V>>,
    ) -> Self {
        Self {
            converter,
            getter,
            setter,
            defaults: None,
        }
    }

    pub(crate) fn optional(
        converter: Arc<dyn Converter<V>>,
        getter: Getter<T, V>,
        setter: Option<Setter<T, V>>,
    ) -> Self
    where
        V: Default + PartialEq,
    {
        Self {
            converter,
            getter,
            setter,
            defaults: Some(Defaults {
                make: V::default,
                check: equals_default::<V>,
            }),
        }
    }
}

impl<T, V: Send + 'static> Member<T> for Field<T, V> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<V>()
    }

    fn fixed_length(&self) -> usize {
        self.converter.fixed_length()
    }

    fn is_optional(&self) -> bool {
        self.defaults.is_some()
    }

    fn is_default(&self, item: &T) -> bool {
        self.defaults
            .as_ref()
            .is_some_and(|d| (d.check)((self.getter)(item)))
    }

    fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    fn encode(&self, allocator: &mut Allocator, item: &T, framing: Framing) -> Result<()> {
        let value = (self.getter)(item);
        match framing {
            Framing::Bare => self.converter.encode(allocator, value),
            Framing::Auto => self.converter.encode_auto(allocator, value),
            Framing::LengthPrefixed => self.converter.encode_with_length_prefix(allocator, value),
        }
    }

    fn decode(&self, span: &mut &[u8], framing: Framing) -> Result<Slot> {
        let value = match framing {
            Framing::Bare => self.converter.decode(std::mem::take(span))?,
            Framing::Auto => self.converter.decode_auto(span)?,
            Framing::LengthPrefixed => self.converter.decode_with_length_prefix(span)?,
        };
        Ok(Box::new(value))
    }

    fn default_slot(&self) -> Option<Slot> {
        self.defaults
            .as_ref()
            .map(|d| Box::new((d.make)()) as Slot)
    }

    fn assign(&self, target: &mut T, slot: Slot) -> Result<()> {
        let setter = self.setter.as_ref().ok_or_else(|| {
            TagwireError::InvalidArgument(format!(
                "member of type '{}' has no setter",
                self.type_name()
            ))
        })?;
        let value = slot.downcast::<V>().map_err(|_| {
            TagwireError::InvalidArgument(format!(
                "decoded slot is not a '{}'",
                self.type_name()
            ))
        })?;
        setter(target, *value);
        Ok(())
    }
}

/// Decoded member values, handed to an object constructor.
///
/// Values are stored in member order (declaration order for named objects, index order
/// for tuple objects). [`take`](MemberValues::take) walks them in that order;
/// [`take_at`](MemberValues::take_at) picks one directly.
#[derive(Debug)]
pub struct MemberValues {
    type_name: &'static str,
    slots: Vec<Option<Slot>>,
    next: usize,
}

impl MemberValues {
    pub(crate) fn new(type_name: &'static str, slots: Vec<Option<Slot>>) -> Self {
        Self {
            type_name,
            slots,
            next: 0,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the object has no members.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Takes the next member value.
    ///
    /// # Errors
    /// [`TagwireError::InvalidArgument`] if all members were taken or the next member is
    /// not a `V`.
    pub fn take<V: 'static>(&mut self) -> Result<V> {
        let index = self.next;
        self.next += 1;
        self.take_at(index)
    }

    /// Takes the member value at `index`.
    ///
    /// # Errors
    /// [`TagwireError::InvalidArgument`] if `index` is out of range, was already taken,
    /// or does not hold a `V`.
    pub fn take_at<V: 'static>(&mut self, index: usize) -> Result<V> {
        let slot = self
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| {
                TagwireError::InvalidArgument(format!(
                    "member {index} of '{}' is out of range or already taken",
                    self.type_name
                ))
            })?;
        slot.downcast::<V>().map(|v| *v).map_err(|_| {
            TagwireError::InvalidArgument(format!(
                "member {index} of '{}' is not a '{}'",
                self.type_name,
                std::any::type_name::<V>()
            ))
        })
    }

    pub(crate) fn into_slots(self) -> impl Iterator<Item = Option<Slot>> {
        self.slots.into_iter()
    }
}

/// How a composite is put back together after its members were decoded.
pub(crate) enum Construction<T> {
    Constructor(Box<dyn Fn(&mut MemberValues) -> Result<T> + Send + Sync>),
    Assign(fn() -> T),
}

impl<T> Construction<T> {
    pub(crate) fn construct(&self, members: &[Box<dyn Member<T>>], mut values: MemberValues) -> Result<T> {
        match self {
            Self::Constructor(ctor) => ctor(&mut values),
            Self::Assign(make) => {
                let mut item = make();
                for (member, slot) in members.iter().zip(values.into_slots()) {
                    if let Some(slot) = slot {
                        member.assign(&mut item, slot)?;
                    }
                }
                Ok(item)
            }
        }
    }
}

/// Default-and-assign construction; every member needs a setter.
pub(crate) fn assign_strategy<T: Default>(
    type_name: &'static str,
    members: &[Box<dyn Member<T>>],
) -> Result<Construction<T>> {
    if let Some(member) = members.iter().find(|m| !m.has_setter()) {
        return Err(TagwireError::InvalidArgument(format!(
            "'{type_name}' is built by assignment but a member of type '{}' has no setter",
            member.type_name()
        )));
    }
    Ok(Construction::Assign(T::default))
}
