use crate::{
    error::*,
    value::{Map, Value},
};
use serde::{
    de::{
        value::MapAccessDeserializer, DeserializeSeed, EnumAccess, MapAccess,
        SeqAccess, VariantAccess, Visitor,
    },
    forward_to_deserialize_any, Deserialize,
};

/// Builds a host object out of a [`Value`].
pub fn from_value<'a, T>(value: &'a Value) -> Result<T>
where
    T: Deserialize<'a>,
{
    T::deserialize(Deserializer::from_value(value))
}

/// Builds a host object out of map entries, as if they were struct fields.
pub fn from_map<'a, T>(map: &'a Map) -> Result<T>
where
    T: Deserialize<'a>,
{
    T::deserialize(MapAccessDeserializer::new(MapDeserializer {
        values: map.entries(),
        index: 0,
    }))
}

#[derive(Debug)]
pub struct Deserializer<'de> {
    input: &'de Value,
}

impl<'de> Deserializer<'de> {
    pub fn from_value(input: &'de Value) -> Self {
        Self { input }
    }
}

impl<'de> serde::de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.input {
            Value::Null => visitor.visit_unit(),
            Value::Bool(v) => visitor.visit_bool(*v),
            Value::Int(v) => visitor.visit_i64(*v),
            Value::Float(v) => visitor.visit_f64(*v),
            Value::String(v) => visitor.visit_borrowed_str(v),
            Value::Seq(v) => visitor.visit_seq(SeqDeserializer {
                values: v.as_slice(),
                index: 0,
            }),
            Value::Map(v) | Value::Object(v) => visitor.visit_map(MapDeserializer {
                values: v.entries(),
                index: 0,
            }),
            Value::Callable(_) => Err(Error::Message(
                "cannot deserialize a callable".to_owned(),
            )),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.input {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.input {
            Value::String(name) => visitor.visit_enum(EnumDeserializer {
                name,
                content: None,
            }),
            Value::Map(v) | Value::Object(v) if v.len() == 1 => {
                let (name, content) = &v.entries()[0];
                visitor.visit_enum(EnumDeserializer {
                    name,
                    content: Some(content),
                })
            }
            _ => self.deserialize_any(visitor),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

#[derive(Debug)]
pub struct SeqDeserializer<'de> {
    values: &'de [Value],
    index: usize,
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if let Some(value) = self.values.get(self.index) {
            self.index += 1;
            return seed.deserialize(Deserializer::from_value(value)).map(Some);
        }
        Ok(None)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.values.len() - self.index)
    }
}

#[derive(Debug)]
pub struct MapDeserializer<'de> {
    values: &'de [(String, Value)],
    index: usize,
}

impl<'de> MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if let Some((key, _)) = self.values.get(self.index) {
            return seed.deserialize(KeyDeserializer { key }).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        if let Some((_, value)) = self.values.get(self.index) {
            self.index += 1;
            return seed.deserialize(Deserializer::from_value(value));
        }
        Err(Error::ExpectedMapEntry)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.values.len() - self.index)
    }
}

/// Map keys are stored as text; scalar keys are parsed back on demand.
#[derive(Debug)]
struct KeyDeserializer<'de> {
    key: &'de str,
}

macro_rules! impl_deserialize_key {
    ($name:ident, $visit:ident, $type:ty) => {
        fn $name<V>(self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            match self.key.parse::<$type>() {
                Ok(value) => visitor.$visit(value),
                Err(_) => Err(Error::Message(format!(
                    "cannot parse map key `{}` as {}",
                    self.key,
                    stringify!($type)
                ))),
            }
        }
    };
}

impl<'de> serde::de::Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.key)
    }

    impl_deserialize_key!(deserialize_bool, visit_bool, bool);
    impl_deserialize_key!(deserialize_i8, visit_i8, i8);
    impl_deserialize_key!(deserialize_i16, visit_i16, i16);
    impl_deserialize_key!(deserialize_i32, visit_i32, i32);
    impl_deserialize_key!(deserialize_i64, visit_i64, i64);
    impl_deserialize_key!(deserialize_u8, visit_u8, u8);
    impl_deserialize_key!(deserialize_u16, visit_u16, u16);
    impl_deserialize_key!(deserialize_u32, visit_u32, u32);
    impl_deserialize_key!(deserialize_u64, visit_u64, u64);
    impl_deserialize_key!(deserialize_f32, visit_f32, f32);
    impl_deserialize_key!(deserialize_f64, visit_f64, f64);
    impl_deserialize_key!(deserialize_char, visit_char, char);

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(EnumDeserializer {
            name: self.key,
            content: None,
        })
    }

    forward_to_deserialize_any! {
        i128 u128 str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

#[derive(Debug)]
struct EnumDeserializer<'de> {
    name: &'de str,
    content: Option<&'de Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: DeserializeSeed<'de>,
    {
        let name = seed.deserialize(KeyDeserializer { key: self.name })?;
        Ok((name, self))
    }
}

impl<'de> VariantAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.content {
            None | Some(Value::Null) => Ok(()),
            _ => Err(Error::ExpectedUnitVariant),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        match self.content {
            Some(content) => seed.deserialize(Deserializer::from_value(content)),
            None => Err(Error::ExpectedNewTypeVariant),
        }
    }

    fn tuple_variant<V>(self, _: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.content {
            Some(Value::Seq(content)) => visitor.visit_seq(SeqDeserializer {
                values: content,
                index: 0,
            }),
            _ => Err(Error::ExpectedTupleVariant),
        }
    }

    fn struct_variant<V>(self, _: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.content {
            Some(Value::Map(content)) | Some(Value::Object(content)) => {
                visitor.visit_map(MapDeserializer {
                    values: content.entries(),
                    index: 0,
                })
            }
            _ => Err(Error::ExpectedStructVariant),
        }
    }
}
