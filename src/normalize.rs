use kube::core::DynamicObject;
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde_json::{Map, Value};

use crate::error::ViewError;
use crate::model::Collection;

/// Flattens a fetched object into its generic field map, keeping every field.
pub fn to_field_map(
    collection: Collection,
    object: &DynamicObject,
) -> Result<Map<String, Value>, ViewError> {
    let normalize_error = |source| ViewError::Normalize { collection, source };
    match serde_json::to_value(object).map_err(normalize_error)? {
        Value::Object(fields) => Ok(fields),
        other => Err(normalize_error(serde_json::Error::custom(format!(
            "expected an object, found {}",
            value_kind(&other)
        )))),
    }
}

/// Validates a generic field map into a typed record.
pub fn from_field_map<T>(collection: Collection, fields: Map<String, Value>) -> Result<T, ViewError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(Value::Object(fields))
        .map_err(|source| ViewError::Normalize { collection, source })
}

pub fn normalize<T>(collection: Collection, object: &DynamicObject) -> Result<T, ViewError>
where
    T: DeserializeOwned,
{
    from_field_map(collection, to_field_map(collection, object)?)
}

/// Normalizes a whole collection, keeping the fetched order.
pub fn normalize_all<T>(collection: Collection, objects: &[DynamicObject]) -> Result<Vec<T>, ViewError>
where
    T: DeserializeOwned,
{
    objects
        .iter()
        .map(|object| normalize(collection, object))
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
