pub mod class;
pub mod de;
pub mod error;
pub mod field;
pub mod method;
pub mod nested;
pub mod resolve;
pub mod schema;
pub mod ser;
pub mod value;


pub use crate::{
    class::{ClassBuilder, SchemaClass},
    de::value::{from_map, from_value},
    error::{Error, Result},
    field::{Context, Descriptor, Field, FieldOptions, Kind},
    method::MethodField,
    nested::Nested,
    resolve::Resolver,
    schema::{Reconstructed, Schema, SchemaInstance},
    ser::value::to_value,
    value::{Callable, Map, Value},
};
