use crate::{error::*, value::Value};

pub const PATH_SEPARATOR: char = '.';

/// Splits a dotted attribute path into its segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR).map(|s| s.to_owned()).collect()
}

/// Strategy used to walk a field path through a source value.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Resolver {
    /// Segments name attributes of nested objects.
    #[default]
    Attribute,
    /// Segments name keys of nested mappings.
    Mapping,
}

impl Resolver {
    pub fn resolve<'a>(&self, source: &'a Value, path: &[String]) -> Result<&'a Value> {
        path.iter().try_fold(source, |current, segment| {
            let entries = match (self, current) {
                (Self::Attribute, Value::Object(entries)) => entries,
                (Self::Mapping, Value::Map(entries)) => entries,
                _ => return Err(lookup_failed(path, segment)),
            };
            entries
                .get(segment)
                .ok_or_else(|| lookup_failed(path, segment))
        })
    }
}

fn lookup_failed(path: &[String], segment: &str) -> Error {
    let separator = PATH_SEPARATOR.to_string();
    Error::LookupFailed {
        path: path.join(separator.as_str()),
        segment: segment.to_owned(),
    }
}
