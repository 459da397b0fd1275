//! Krapper schema engine: wrap documents, their grooming and loading.
//!
//! A wrap is decoded strictly into the [`raw`] model, then [`groom`]ed into the
//! resolved [`Wrap`]: labels derived, defaults filled in, enums and expressions
//! checked and every field's value path computed.

#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod load;
pub mod raw;
pub mod types;
pub mod wrap;

pub use error::{GroomError, GroomErrorKind};
pub use field::{ArrayItem, Field, FieldType};
pub use load::{load, load_str, LoadError};
pub use types::{FieldArray, FieldBoolean, FieldDuration, FieldInteger, FieldNumber, FieldObject, FieldString, Validation};
pub use wrap::{groom, MenuMode, Operations, Schema, Source, Wrap};
