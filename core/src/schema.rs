use crate::{
    class::{ClassBuilder, SchemaClass},
    de::value::from_map,
    error::*,
    resolve::Resolver,
    ser::value::to_value,
    value::{Map, Value},
};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::OnceCell;

/// Declarative description of how to project host objects into ordered
/// key-value data and back.
///
/// # Example
/// ```rust
/// use serde::Serialize;
/// use serde_schematic::{ClassBuilder, Field, Map, Schema, SchemaInstance};
///
/// #[derive(Serialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// struct PointSchema;
///
/// impl Schema for PointSchema {
///     type Object = Map;
///
///     fn define(class: &mut ClassBuilder<Self>) {
///         class.field("x", Field::int()).field("y", Field::int());
///     }
/// }
///
/// let instance = SchemaInstance::new(PointSchema)
///     .source_of(&Point { x: 1, y: 2 })
///     .unwrap();
/// let data = instance.serialized().unwrap();
/// assert_eq!(data.get("y").and_then(|v| v.as_i64()), Some(2));
/// ```
pub trait Schema: Sized + 'static {
    /// How field paths are walked through sources.
    const RESOLVER: Resolver = Resolver::Attribute;

    /// Type produced by reconstruction.
    type Object: DeserializeOwned;

    /// Declares fields, methods and ancestors. Runs once per type.
    fn define(class: &mut ClassBuilder<Self>);

    /// Builds the reconstructed object out of collected field data.
    fn make_object(&self, data: Map) -> Result<Self::Object> {
        from_map(&data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reconstructed<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Reconstructed<T> {
    pub fn as_one(&self) -> Option<&T> {
        match self {
            Self::One(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[T]> {
        match self {
            Self::Many(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(v) => vec![v],
            Self::Many(v) => v,
        }
    }
}

/// Schema applied either to a source object (serialization) or to input
/// data (reconstruction). Both results are computed on first access and
/// cached for the lifetime of the instance.
pub struct SchemaInstance<S>
where
    S: Schema,
{
    schema: S,
    source: Option<Value>,
    input: Option<Value>,
    many: bool,
    serialized: OnceCell<Value>,
    reconstructed: OnceCell<Reconstructed<S::Object>>,
}

impl<S> SchemaInstance<S>
where
    S: Schema,
{
    pub fn new(schema: S) -> Self {
        Self {
            schema,
            source: None,
            input: None,
            many: false,
            serialized: OnceCell::new(),
            reconstructed: OnceCell::new(),
        }
    }

    pub fn source(mut self, value: impl Into<Value>) -> Self {
        self.source = Some(value.into());
        self
    }

    pub fn source_of<T>(self, value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        Ok(self.source(to_value(value)?))
    }

    pub fn input(mut self, value: impl Into<Value>) -> Self {
        self.input = Some(value.into());
        self
    }

    /// Treats the source or input as a sequence of independent items.
    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn serialized(&self) -> Result<&Value> {
        if let Some(value) = self.serialized.get() {
            return Ok(value);
        }
        let source = match (&self.source, &self.input) {
            (Some(_), Some(_)) => return Err(Error::Conflict),
            (Some(source), None) => source,
            (None, _) => return Err(Error::NoInstance),
        };
        let class = SchemaClass::<S>::of()?;
        log::trace!("serializing with `{}`", class.name());
        let value = self.each(source, |item| {
            class.serialize(&self.schema, item).map(Value::Map)
        })?;
        Ok(self.serialized.get_or_init(|| value))
    }

    pub fn into_serialized(self) -> Result<Value> {
        self.serialized()?;
        Ok(self.serialized.into_inner().unwrap_or_default())
    }

    pub fn reconstructed(&self) -> Result<&Reconstructed<S::Object>> {
        if let Some(object) = self.reconstructed.get() {
            return Ok(object);
        }
        let input = self.reverse_input()?;
        let class = SchemaClass::<S>::of()?;
        log::trace!("reconstructing with `{}`", class.name());
        let object = if self.many {
            let items = input.as_seq().ok_or_else(|| Error::NotSeq(input.clone()))?;
            Reconstructed::Many(
                items
                    .iter()
                    .map(|item| {
                        let data = class.accumulate(&self.schema, item)?;
                        self.schema.make_object(data)
                    })
                    .collect::<Result<_>>()?,
            )
        } else {
            let data = class.accumulate(&self.schema, input)?;
            Reconstructed::One(self.schema.make_object(data)?)
        };
        Ok(self.reconstructed.get_or_init(|| object))
    }

    /// Reconstruction data before it is handed to [`Schema::make_object`].
    pub(crate) fn accumulated(&self) -> Result<Value> {
        let input = self.reverse_input()?;
        let class = SchemaClass::<S>::of()?;
        self.each(input, |item| {
            class.accumulate(&self.schema, item).map(Value::Map)
        })
    }

    fn reverse_input(&self) -> Result<&Value> {
        match (&self.source, &self.input) {
            (Some(_), Some(_)) => Err(Error::Conflict),
            (None, Some(input)) => Ok(input),
            (_, None) => Err(Error::NoData),
        }
    }

    fn each(&self, value: &Value, f: impl Fn(&Value) -> Result<Value>) -> Result<Value> {
        if !self.many {
            return f(value);
        }
        match value {
            Value::Seq(items) => items.iter().map(f).collect::<Result<_>>().map(Value::Seq),
            _ => Err(Error::NotSeq(value.clone())),
        }
    }
}
