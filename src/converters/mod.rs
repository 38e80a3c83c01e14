//! Built-in converters.
//!
//! Every type listed here implements [`Describe`](crate::Describe) through one of
//! these converters, except [`BincodeConverter`], which callers opt into per type.

pub mod boxed;
pub mod bridge;
pub mod collection;
pub mod nullable;
pub mod primitive;
pub mod tuple;
pub mod wellknown;

pub use boxed::BoxConverter;
pub use bridge::BincodeConverter;
pub use collection::{MapConverter, SequenceConverter};
pub use nullable::NullableConverter;
pub use primitive::{BoolConverter, CharConverter, LittleEndian, LittleEndianConverter, StringConverter};
pub use wellknown::{
    DurationConverter, IpAddrConverter, Ipv4Converter, Ipv6Converter, SocketAddrConverter,
};
