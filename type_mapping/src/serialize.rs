//! Serialization utilities
//!
//! This module bridges native values and `serde_json` for map-based
//! transports such as request and response bodies.

use crate::errors::ConvertError;
use crate::native::{NativeArray, NativeValue};
use crate::sql::ElementType;
use serde_json::{Map, Number, Value as JsonValue};

impl NativeValue {
    /// Render a native value as JSON
    ///
    /// Numerics are written as strings so no precision is lost, temporal
    /// values as ISO-8601 strings. Opaque values have no JSON form.
    pub fn into_json(self) -> Result<JsonValue, ConvertError> {
        Ok(match self {
            NativeValue::Null => JsonValue::Null,
            NativeValue::Boolean(b) => JsonValue::Bool(b),
            NativeValue::SmallInt(v) => JsonValue::from(v),
            NativeValue::Integer(v) => JsonValue::from(v),
            NativeValue::BigInt(v) => JsonValue::from(v),
            NativeValue::Real(v) => float_to_json(f64::from(v))?,
            NativeValue::Double(v) => float_to_json(v)?,
            NativeValue::Numeric(d) => JsonValue::String(d.to_string()),
            NativeValue::Text(s) => JsonValue::String(s),
            NativeValue::Bytes(bytes) => JsonValue::Array(bytes.into_iter().map(JsonValue::from).collect()),
            NativeValue::Uuid(id) => JsonValue::String(id.to_string()),
            NativeValue::Date(date) => JsonValue::String(date.to_string()),
            NativeValue::Time(time) => JsonValue::String(time.to_string()),
            NativeValue::Timestamp(ts) => {
                JsonValue::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            NativeValue::TimestampTz(ts) => JsonValue::String(ts.to_rfc3339()),
            NativeValue::Json(json) => json,
            NativeValue::Array(array) => JsonValue::Array(
                array
                    .into_elements()
                    .into_iter()
                    .map(NativeValue::into_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            NativeValue::Opaque(value) => {
                return Err(ConvertError::Json(format!(
                    "{} has no registered conversion and cannot be written as JSON",
                    value.type_name()
                )))
            }
        })
    }

    /// Read a JSON value into its closest native form
    pub fn from_json(json: JsonValue) -> NativeValue {
        match json {
            JsonValue::Null => NativeValue::Null,
            JsonValue::Bool(b) => NativeValue::Boolean(b),
            JsonValue::Number(n) => number_to_native(n),
            JsonValue::String(s) => NativeValue::Text(s),
            JsonValue::Array(items) => {
                let elements: Vec<NativeValue> = items.into_iter().map(NativeValue::from_json).collect();
                let element_type = elements
                    .iter()
                    .find_map(ElementType::of)
                    .unwrap_or(ElementType::Text);
                NativeValue::Array(NativeArray::new(element_type.default_name(), elements))
            }
            object @ JsonValue::Object(_) => NativeValue::Json(object),
        }
    }
}

fn float_to_json(value: f64) -> Result<JsonValue, ConvertError> {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| ConvertError::Json(format!("{} is not a finite number", value)))
}

fn number_to_native(n: Number) -> NativeValue {
    if let Some(i) = n.as_i64() {
        NativeValue::BigInt(i)
    } else if let Some(u) = n.as_u64() {
        NativeValue::Numeric(rust_decimal::Decimal::from(u))
    } else {
        NativeValue::Double(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Render an ordered set of named native values as a JSON object
pub fn object_from_natives<I>(entries: I) -> Result<JsonValue, ConvertError>
where
    I: IntoIterator<Item = (String, NativeValue)>,
{
    let mut object = Map::new();
    for (key, native) in entries {
        object.insert(key, native.into_json()?);
    }
    Ok(JsonValue::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_native_to_json() {
        assert_eq!(NativeValue::Numeric(Decimal::new(1346, 2)).into_json().unwrap(), json!("13.46"));
        assert_eq!(NativeValue::Integer(5).into_json().unwrap(), json!(5));
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(NativeValue::Date(date).into_json().unwrap(), json!("2024-02-29"));
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap().fixed_offset();
        assert_eq!(
            NativeValue::TimestampTz(ts).into_json().unwrap(),
            json!("2024-01-02T03:04:05+00:00")
        );
        assert!(NativeValue::Double(f64::NAN).into_json().is_err());
    }

    #[test]
    fn test_json_to_native() {
        assert_eq!(NativeValue::from_json(json!(7)), NativeValue::BigInt(7));
        assert_eq!(NativeValue::from_json(json!(1.5)), NativeValue::Double(1.5));
        assert_eq!(NativeValue::from_json(json!("x")), NativeValue::Text("x".into()));
        match NativeValue::from_json(json!([null, 1, 2])) {
            NativeValue::Array(array) => {
                assert_eq!(array.element_type(), "numeric");
                assert_eq!(array.len(), 3);
            }
            other => panic!("Expected array, got {:?}", other),
        }
        assert_eq!(
            NativeValue::from_json(json!({"a": 1})),
            NativeValue::Json(json!({"a": 1}))
        );
    }

    #[test]
    fn test_object_from_natives() {
        let object = object_from_natives(vec![
            ("b".to_string(), NativeValue::Integer(1)),
            ("a".to_string(), NativeValue::Null),
        ])
        .unwrap();
        assert_eq!(object, json!({"b": 1, "a": null}));
    }
}
