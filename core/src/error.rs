use crate::value::Value;
use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub enum Error {
    Message(String),
    /// Serialized output requested without a source object.
    NoInstance,
    /// Reconstructed object requested without input data.
    NoData,
    /// Both a source object and input data were supplied.
    Conflict,
    /// (field path, segment that could not be resolved)
    LookupFailed {
        path: String,
        segment: String,
    },
    /// (field name, rejected value, expected representation)
    Conversion {
        field: String,
        value: Value,
        expected: &'static str,
    },
    NotCallable(String),
    /// (field name, method name)
    MissingMethod {
        field: String,
        method: String,
    },
    CyclicInheritance(&'static str),
    InconsistentHierarchy(&'static str),
    NotSeq(Value),
    NotMap(Value),
    InvalidMapKey(Value),
    IntegerOutOfRange(String),
    ExpectedMapEntry,
    ExpectedUnitVariant,
    ExpectedNewTypeVariant,
    ExpectedTupleVariant,
    ExpectedStructVariant,
}

impl Error {
    pub fn conversion(field: impl ToString, value: Value, expected: &'static str) -> Self {
        Self::Conversion {
            field: field.to_string(),
            value,
            expected,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NoInstance | Self::NoData | Self::Conflict)
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::LookupFailed { .. })
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Message(msg) => formatter.write_str(msg),
            Error::NoInstance => formatter.write_str("no instance provided"),
            Error::NoData => formatter.write_str("no data provided"),
            Error::Conflict => {
                formatter.write_str("either an instance or data can be provided, not both")
            }
            Error::LookupFailed { path, segment } => {
                write!(formatter, "cannot resolve `{}` of path `{}`", segment, path)
            }
            Error::Conversion {
                field,
                value,
                expected,
            } => write!(
                formatter,
                "field `{}` expected {}, got: {:?}",
                field, expected, value
            ),
            Error::NotCallable(field) => write!(formatter, "field `{}` is not callable", field),
            Error::MissingMethod { field, method } => write!(
                formatter,
                "field `{}` refers to undefined method `{}`",
                field, method
            ),
            Error::CyclicInheritance(name) => {
                write!(formatter, "schema `{}` inherits from itself", name)
            }
            Error::InconsistentHierarchy(name) => write!(
                formatter,
                "cannot linearize ancestors of schema `{}`",
                name
            ),
            Error::NotSeq(_) => formatter.write_str("value is not a sequence"),
            Error::NotMap(_) => formatter.write_str("value is not a map"),
            Error::InvalidMapKey(_) => formatter.write_str("map key must be a scalar"),
            Error::IntegerOutOfRange(v) => write!(formatter, "integer out of range: {}", v),
            Error::ExpectedMapEntry => formatter.write_str("expected map entry"),
            Error::ExpectedUnitVariant => formatter.write_str("expected unit variant"),
            Error::ExpectedNewTypeVariant => formatter.write_str("expected newtype variant"),
            Error::ExpectedTupleVariant => formatter.write_str("expected tuple variant"),
            Error::ExpectedStructVariant => formatter.write_str("expected struct variant"),
        }
    }
}

impl std::error::Error for Error {}
