use serde_json::{Map, Value};

pub enum NullableValue<T> {
    Omitted,
    Null,
    Present(T),
}

impl<T> NullableValue<T> {
    /// Collapses to the changeset shape: `None` = untouched, `Some(None)` = clear.
    pub fn into_patch(self) -> Option<Option<T>> {
        match self {
            NullableValue::Omitted => None,
            NullableValue::Null => Some(None),
            NullableValue::Present(value) => Some(Some(value)),
        }
    }
}

pub fn classify_nullable(optional_value: Option<&Value>) -> Result<NullableValue<String>, String> {
    match optional_value {
        None => Ok(NullableValue::Omitted),
        Some(Value::Null) => Ok(NullableValue::Null),
        Some(Value::String(s)) => Ok(NullableValue::Present(s.to_owned())),
        Some(other) => Err(format!("expected string or null, got {other}")),
    }
}

pub fn classify_nullable_object(
    optional_value: Option<&Value>,
) -> Result<NullableValue<Map<String, Value>>, String> {
    match optional_value {
        None => Ok(NullableValue::Omitted),
        Some(Value::Null) => Ok(NullableValue::Null),
        Some(Value::Object(map)) => Ok(NullableValue::Present(map.clone())),
        Some(other) => Err(format!("expected object or null, got {other}")),
    }
}
