//! Composite codecs built from member descriptions.
//!
//! [`NamedObjectBuilder`] and [`TupleObjectBuilder`] are the member-description side of
//! the resolver: a type's [`crate::Describe`] implementation lists its members with
//! accessors, and the builder resolves each member's converter and produces a
//! [`NamedObjectConverter`] or [`TupleObjectConverter`]. No per-type code is generated;
//! encoding walks the member list.

/// Type-erased members and the values handed to constructors.
pub mod member;
/// Key/value encoded composites.
pub mod named;
/// Positional composites.
pub mod tuple;

pub use member::MemberValues;
pub use named::{NamedObjectBuilder, NamedObjectConverter};
pub use tuple::{TupleObjectBuilder, TupleObjectConverter};
