use crate::{
    error::*,
    resolve::Resolver,
    value::{Map, Value},
};
/// Settings shared by every kind of field.
#[derive(Debug, Clone)]
pub struct FieldOptions {
    /// Dotted path read from the source; defaults to the field name.
    pub attr: Option<String>,
    /// Label used in emitted output; defaults to the field name.
    pub key: Option<String>,
    pub call: bool,
    pub required: bool,
    pub read_only: bool,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self {
            attr: None,
            key: None,
            call: false,
            required: true,
            read_only: false,
        }
    }
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Binding of a declared field inside a registered schema class.
#[derive(Debug, Copy, Clone)]
pub struct Context<'a> {
    pub name: &'a str,
    pub path: &'a [String],
    pub resolver: Resolver,
}

impl Context<'_> {
    /// Resolves the field path against `source`, invoking the result when
    /// `call` is set.
    ///
    /// Returns `None` when an optional field cannot be resolved at all.
    pub fn lookup(&self, source: &Value, options: &FieldOptions) -> Result<Option<Value>> {
        let value = match self.resolver.resolve(source, self.path) {
            Ok(value) => value,
            Err(error) if error.is_lookup() && !options.required => return Ok(None),
            Err(error) => return Err(error),
        };
        if value.is_null() && !options.required {
            return Ok(Some(Value::Null));
        }
        if options.call {
            return value
                .call()
                .map(Some)
                .ok_or_else(|| Error::NotCallable(self.name.to_owned()));
        }
        Ok(Some(value.clone()))
    }
}

/// Reads one value out of a source and writes it back into reconstruction
/// data.
pub trait Descriptor: Send + Sync + 'static {
    fn options(&self) -> &FieldOptions;

    /// `None` leaves the field out of the emitted output.
    fn read(&self, cx: &Context, source: &Value) -> Result<Option<Value>>;

    fn write(&self, cx: &Context, data: &mut Map, value: Value) -> Result<()>;
}

/// Conversion between the source representation and the emitted one.
pub trait Kind: Send + Sync + 'static {
    fn to_representation(&self, _field: &str, value: Value) -> Result<Value> {
        Ok(value)
    }

    fn to_internal(&self, _field: &str, value: Value) -> Result<Value> {
        Ok(value)
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Raw;

impl Kind for Raw {}

#[derive(Debug, Default, Copy, Clone)]
pub struct Int;

impl Int {
    fn convert(field: &str, value: Value) -> Result<Value> {
        match value {
            Value::Int(v) => Ok(Value::Int(v)),
            Value::Bool(v) => Ok(Value::Int(v as i64)),
            Value::Float(v) if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                Ok(Value::Int(v.trunc() as i64))
            }
            Value::String(v) => match v.trim().parse::<i64>() {
                Ok(v) => Ok(Value::Int(v)),
                Err(_) => Err(Error::conversion(field, Value::String(v), "integer")),
            },
            value => Err(Error::conversion(field, value, "integer")),
        }
    }
}

impl Kind for Int {
    fn to_representation(&self, field: &str, value: Value) -> Result<Value> {
        Self::convert(field, value)
    }

    fn to_internal(&self, field: &str, value: Value) -> Result<Value> {
        Self::convert(field, value)
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Float;

impl Float {
    fn convert(field: &str, value: Value) -> Result<Value> {
        match value {
            Value::Float(v) => Ok(Value::Float(v)),
            Value::Int(v) => Ok(Value::Float(v as f64)),
            Value::Bool(v) => Ok(Value::Float(if v { 1.0 } else { 0.0 })),
            Value::String(v) => match v.trim().parse::<f64>() {
                Ok(v) => Ok(Value::Float(v)),
                Err(_) => Err(Error::conversion(field, Value::String(v), "float")),
            },
            value => Err(Error::conversion(field, value, "float")),
        }
    }
}

impl Kind for Float {
    fn to_representation(&self, field: &str, value: Value) -> Result<Value> {
        Self::convert(field, value)
    }

    fn to_internal(&self, field: &str, value: Value) -> Result<Value> {
        Self::convert(field, value)
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Str;

impl Str {
    fn convert(field: &str, value: Value) -> Result<Value> {
        match value {
            Value::String(v) => Ok(Value::String(v)),
            Value::Int(v) => Ok(Value::String(v.to_string())),
            Value::Float(v) => Ok(Value::String(format!("{:?}", v))),
            Value::Bool(v) => Ok(Value::String(v.to_string())),
            value => Err(Error::conversion(field, value, "string")),
        }
    }
}

impl Kind for Str {
    fn to_representation(&self, field: &str, value: Value) -> Result<Value> {
        Self::convert(field, value)
    }

    fn to_internal(&self, field: &str, value: Value) -> Result<Value> {
        Self::convert(field, value)
    }
}

/// Truthiness: null, zero and empty values are `false`.
#[derive(Debug, Default, Copy, Clone)]
pub struct Bool;

impl Bool {
    fn convert(value: Value) -> Value {
        Value::Bool(match value {
            Value::Null => false,
            Value::Bool(v) => v,
            Value::Int(v) => v != 0,
            Value::Float(v) => v != 0.0,
            Value::String(v) => !v.is_empty(),
            Value::Seq(v) => !v.is_empty(),
            Value::Map(v) | Value::Object(v) => !v.is_empty(),
            Value::Callable(_) => true,
        })
    }
}

impl Kind for Bool {
    fn to_representation(&self, _: &str, value: Value) -> Result<Value> {
        Ok(Self::convert(value))
    }

    fn to_internal(&self, _: &str, value: Value) -> Result<Value> {
        Ok(Self::convert(value))
    }
}

/// Field reading a value at an attribute path of the source.
#[derive(Debug, Clone)]
pub struct Field<K = Raw> {
    options: FieldOptions,
    kind: K,
}

impl Field {
    pub fn new() -> Self {
        Self::with_kind(Raw)
    }

    pub fn int() -> Field<Int> {
        Field::with_kind(Int)
    }

    pub fn float() -> Field<Float> {
        Field::with_kind(Float)
    }

    pub fn str() -> Field<Str> {
        Field::with_kind(Str)
    }

    pub fn bool() -> Field<Bool> {
        Field::with_kind(Bool)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Field<K>
where
    K: Kind,
{
    pub fn with_kind(kind: K) -> Self {
        Self {
            options: FieldOptions::new(),
            kind,
        }
    }

    pub fn attr(mut self, path: impl ToString) -> Self {
        self.options.attr = Some(path.to_string());
        self
    }

    pub fn key(mut self, key: impl ToString) -> Self {
        self.options.key = Some(key.to_string());
        self
    }

    pub fn call(mut self, call: bool) -> Self {
        self.options.call = call;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.options.read_only = read_only;
        self
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }
}

impl<K> Descriptor for Field<K>
where
    K: Kind,
{
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn read(&self, cx: &Context, source: &Value) -> Result<Option<Value>> {
        let value = match cx.lookup(source, &self.options)? {
            Some(value) => value,
            None => return Ok(None),
        };
        if value.is_null() && !self.options.required {
            return Ok(Some(value));
        }
        self.kind.to_representation(cx.name, value).map(Some)
    }

    fn write(&self, cx: &Context, data: &mut Map, value: Value) -> Result<()> {
        let value = if value.is_null() && !self.options.required {
            value
        } else {
            self.kind.to_internal(cx.name, value)?
        };
        data.insert(cx.name, value);
        Ok(())
    }
}
