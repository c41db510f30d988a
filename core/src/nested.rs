use crate::{
    error::*,
    field::{Context, Descriptor, FieldOptions},
    schema::{Schema, SchemaInstance},
    value::{Map, Value},
};

/// Schema used as a field of another schema.
///
/// The nested source (or every element of it, with `many`) is serialized by
/// a fresh [`SchemaInstance`] of `C`.
#[derive(Debug, Clone)]
pub struct Nested<C> {
    schema: C,
    options: FieldOptions,
    many: bool,
}

impl<C> Nested<C>
where
    C: Schema + Clone + Send + Sync,
{
    pub fn new(schema: C) -> Self {
        Self {
            schema,
            options: FieldOptions::new(),
            many: false,
        }
    }

    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
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
}

impl<C> Descriptor for Nested<C>
where
    C: Schema + Clone + Send + Sync,
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
        SchemaInstance::new(self.schema.clone())
            .source(value)
            .many(self.many)
            .into_serialized()
            .map(Some)
    }

    fn write(&self, cx: &Context, data: &mut Map, value: Value) -> Result<()> {
        let value = if value.is_null() && !self.options.required {
            value
        } else {
            SchemaInstance::new(self.schema.clone())
                .input(value)
                .many(self.many)
                .accumulated()?
        };
        data.insert(cx.name, value);
        Ok(())
    }
}
