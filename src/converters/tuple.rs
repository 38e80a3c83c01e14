//! Rust tuples are tuple objects with one member per position.

use std::sync::Arc;

use crate::converter::Converter;
use crate::describe::Describe;
use crate::error::Result;
use crate::generator::Context;

macro_rules! impl_describe_tuple {
    ($(($($name:ident . $index:tt),+)),* $(,)?) => {
        $(
            impl<$($name: Describe),+> Describe for ($($name,)+) {
                fn describe(context: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
                    context
                        .tuple_object::<Self>()
                        $(.field(|t: &Self| &t.$index))+
                        .construct(|m| Ok(($(m.take::<$name>()?,)+)))
                }
            }
        )*
    }
}

impl_describe_tuple!(
    (A.0),
    (A.0, B.1),
    (A.0, B.1, C.2),
    (A.0, B.1, C.2, D.3),
    (A.0, B.1, C.2, D.3, E.4),
    (A.0, B.1, C.2, D.3, E.4, F.5),
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6),
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7),
);
