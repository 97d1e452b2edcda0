//! Typed CRM entities
//!
//! Each entity wraps a [`crate::Record`] and exposes typed getters for its
//! standard fields. Getters return `Ok(None)` for empty values and
//! `Err(MissingField)` when the last snapshot does not carry the field.
//! Custom fields go through `Entity::get` / `Entity::set`.

/// Declares typed getters whose names match the local attribute names
macro_rules! field_getters {
    ($( $(#[$meta:meta])* $attr:ident: $reader:ident -> $ty:ty ),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $attr(&self) -> Result<Option<$ty>, $crate::error::CrmError> {
                self.record.$reader(stringify!($attr))
            }
        )*
    };
}

mod company;
mod contact;
mod deal;
mod note;
mod product_row;

pub use company::Company;
pub use contact::Contact;
pub use deal::Deal;
pub use note::{Note, NoteSet};
pub use product_row::{ProductRow, ProductRowSet};
