//! PostgreSQL glue over sqlx
//!
//! Decodes fetched rows into native values and binds native values to
//! queries. Nothing here talks to the database by itself.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use record_mapper::ValueMap;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo};
use std::str::FromStr;
use type_mapping::{ConvertError, ElementType, NativeArray, NativeContext, NativeValue, Slot, Value};
use uuid::Uuid;

use crate::errors::RowHausError;

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Array element type names sqlx can bind directly
const BINDABLE_ELEMENT_TYPES: &[&str] = &[
    "varchar",
    "text",
    "bpchar",
    "numeric",
    "int2",
    "int4",
    "int8",
    "float4",
    "float8",
    "bool",
    "uuid",
    "date",
    "time",
    "timestamp",
    "timestamptz",
    "jsonb",
    "json",
];

/// [`NativeContext`] that checks arrays against the PostgreSQL element types
#[derive(Debug, Clone, Copy, Default)]
pub struct PgArrayContext;

impl NativeContext for PgArrayContext {
    fn create_array(
        &self,
        element_type: &str,
        elements: Vec<NativeValue>,
    ) -> Result<NativeValue, ConvertError> {
        let name = element_type.to_ascii_lowercase();
        if !BINDABLE_ELEMENT_TYPES.contains(&name.as_str()) {
            return Err(ConvertError::Array {
                element_type: element_type.to_string(),
                reason: "unsupported PostgreSQL element type".to_string(),
            });
        }
        if let Some(element) = elements.iter().find(|e| !element_fits(&name, e)) {
            return Err(ConvertError::Array {
                element_type: element_type.to_string(),
                reason: format!("element of kind {} does not fit", element.kind_name()),
            });
        }
        Ok(NativeValue::Array(NativeArray::new(name, elements)))
    }
}

fn element_fits(element_type: &str, element: &NativeValue) -> bool {
    match element {
        NativeValue::Null => true,
        NativeValue::SmallInt(_) => matches!(element_type, "int2" | "int4" | "int8" | "numeric"),
        NativeValue::Integer(_) => matches!(element_type, "int4" | "int8" | "numeric"),
        NativeValue::BigInt(_) => matches!(element_type, "int8" | "numeric"),
        NativeValue::Real(_) => matches!(element_type, "float4" | "float8" | "numeric"),
        NativeValue::Double(_) => matches!(element_type, "float8" | "numeric"),
        NativeValue::Numeric(_) => element_type == "numeric",
        other => ElementType::of(other).is_some_and(|kind| kind.accepts(element_type)),
    }
}

/// Decode one column of `row` by its PostgreSQL type name
pub fn native_from_row(row: &PgRow, column: &str) -> Result<NativeValue, RowHausError> {
    let type_name = row.try_column(column)?.type_info().name().to_string();

    macro_rules! scalar {
        ($ty:ty, $variant:ident) => {
            row.try_get::<Option<$ty>, _>(column)?
                .map_or(NativeValue::Null, NativeValue::$variant)
        };
    }

    macro_rules! array {
        ($ty:ty, $element:expr, $variant:ident) => {
            row.try_get::<Option<Vec<$ty>>, _>(column)?
                .map_or(NativeValue::Null, |items| {
                    NativeValue::Array(NativeArray::new(
                        $element,
                        items.into_iter().map(NativeValue::$variant).collect(),
                    ))
                })
        };
    }

    let native = match type_name.as_str() {
        "BOOL" => scalar!(bool, Boolean),
        "INT2" => scalar!(i16, SmallInt),
        "INT4" => scalar!(i32, Integer),
        "INT8" => scalar!(i64, BigInt),
        "FLOAT4" => scalar!(f32, Real),
        "FLOAT8" => scalar!(f64, Double),
        "NUMERIC" => scalar!(Decimal, Numeric),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => scalar!(String, Text),
        "BYTEA" => scalar!(Vec<u8>, Bytes),
        "UUID" => scalar!(Uuid, Uuid),
        "DATE" => scalar!(NaiveDate, Date),
        "TIME" => scalar!(NaiveTime, Time),
        "TIMESTAMP" => scalar!(NaiveDateTime, Timestamp),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(column)?
            .map_or(NativeValue::Null, instant_native),
        "JSON" | "JSONB" => scalar!(serde_json::Value, Json),
        "BOOL[]" => array!(bool, "bool", Boolean),
        "INT2[]" => array!(i16, "int2", SmallInt),
        "INT4[]" => array!(i32, "int4", Integer),
        "INT8[]" => array!(i64, "int8", BigInt),
        "FLOAT4[]" => array!(f32, "float4", Real),
        "FLOAT8[]" => array!(f64, "float8", Double),
        "NUMERIC[]" => array!(Decimal, "numeric", Numeric),
        "TEXT[]" => array!(String, "text", Text),
        "VARCHAR[]" => array!(String, "varchar", Text),
        "BPCHAR[]" => array!(String, "bpchar", Text),
        "UUID[]" => array!(Uuid, "uuid", Uuid),
        "DATE[]" => array!(NaiveDate, "date", Date),
        "TIME[]" => array!(NaiveTime, "time", Time),
        "TIMESTAMP[]" => array!(NaiveDateTime, "timestamp", Timestamp),
        "TIMESTAMPTZ[]" => row
            .try_get::<Option<Vec<DateTime<Utc>>>, _>(column)?
            .map_or(NativeValue::Null, |items| {
                NativeValue::Array(NativeArray::new(
                    "timestamptz",
                    items.into_iter().map(instant_native).collect(),
                ))
            }),
        "JSON[]" => array!(serde_json::Value, "json", Json),
        "JSONB[]" => array!(serde_json::Value, "jsonb", Json),
        other => {
            return Err(ConvertError::Mismatch {
                from_kind: format!("PostgreSQL type {}", other),
                target: "NativeValue",
            }
            .into())
        }
    };
    Ok(native)
}

fn instant_native(instant: DateTime<Utc>) -> NativeValue {
    NativeValue::TimestampTz(DateTime::<FixedOffset>::from(instant))
}

/// All columns of `row` as a value map holding native values
pub fn row_values(row: &PgRow) -> Result<ValueMap, RowHausError> {
    let mut values = ValueMap::with_capacity(row.len());
    for column in row.columns() {
        let native = native_from_row(row, column.name())?;
        let slot = match native {
            NativeValue::Null => Slot::Null,
            native => Slot::Present(Value::new(native)),
        };
        values.insert(column.name().to_string(), slot);
    }
    Ok(values)
}

/// Bind a native value as the next query parameter
pub fn bind_native(query: PgQuery<'_>, value: NativeValue) -> Result<PgQuery<'_>, ConvertError> {
    let query = match value {
        NativeValue::Null => query.bind(Option::<String>::None),
        NativeValue::Boolean(v) => query.bind(v),
        NativeValue::SmallInt(v) => query.bind(v),
        NativeValue::Integer(v) => query.bind(v),
        NativeValue::BigInt(v) => query.bind(v),
        NativeValue::Real(v) => query.bind(v),
        NativeValue::Double(v) => query.bind(v),
        NativeValue::Numeric(v) => query.bind(v),
        NativeValue::Text(v) => query.bind(v),
        NativeValue::Bytes(v) => query.bind(v),
        NativeValue::Uuid(v) => query.bind(v),
        NativeValue::Date(v) => query.bind(v),
        NativeValue::Time(v) => query.bind(v),
        NativeValue::Timestamp(v) => query.bind(v),
        NativeValue::TimestampTz(v) => query.bind(v.with_timezone(&Utc)),
        NativeValue::Json(v) => query.bind(v),
        NativeValue::Array(array) => bind_array(query, array)?,
        NativeValue::Opaque(value) => {
            return Err(ConvertError::mismatch(value.type_name(), "PostgreSQL parameter"))
        }
    };
    Ok(query)
}

fn bind_array(query: PgQuery<'_>, array: NativeArray) -> Result<PgQuery<'_>, ConvertError> {
    let element_type = array.element_type().to_ascii_lowercase();

    macro_rules! elements {
        ($ty:ty, $($pattern:pat => $value:expr),+) => {
            array
                .into_elements()
                .into_iter()
                .map(|element| match element {
                    $($pattern => Ok($value),)+
                    other => Err(ConvertError::Array {
                        element_type: element_type.clone(),
                        reason: format!("cannot bind element of kind {}", other.kind_name()),
                    }),
                })
                .collect::<Result<Vec<$ty>, ConvertError>>()?
        };
    }

    let query = match element_type.as_str() {
        "varchar" | "text" | "bpchar" => query.bind(elements!(String, NativeValue::Text(v) => v)),
        "bool" => query.bind(elements!(bool, NativeValue::Boolean(v) => v)),
        "int2" => query.bind(elements!(i16, NativeValue::SmallInt(v) => v)),
        "int4" => query.bind(elements!(i32,
            NativeValue::SmallInt(v) => i32::from(v),
            NativeValue::Integer(v) => v)),
        "int8" => query.bind(elements!(i64,
            NativeValue::SmallInt(v) => i64::from(v),
            NativeValue::Integer(v) => i64::from(v),
            NativeValue::BigInt(v) => v)),
        "float4" => query.bind(elements!(f32, NativeValue::Real(v) => v)),
        "float8" => query.bind(elements!(f64,
            NativeValue::Real(v) => f64::from(v),
            NativeValue::Double(v) => v)),
        "numeric" => query.bind(
            array
                .into_elements()
                .into_iter()
                .map(numeric_element)
                .collect::<Result<Vec<Decimal>, ConvertError>>()?,
        ),
        "uuid" => query.bind(elements!(Uuid, NativeValue::Uuid(v) => v)),
        "date" => query.bind(elements!(NaiveDate, NativeValue::Date(v) => v)),
        "time" => query.bind(elements!(NaiveTime, NativeValue::Time(v) => v)),
        "timestamp" => query.bind(elements!(NaiveDateTime, NativeValue::Timestamp(v) => v)),
        "timestamptz" => query.bind(elements!(DateTime<Utc>,
            NativeValue::TimestampTz(v) => v.with_timezone(&Utc))),
        "jsonb" | "json" => query.bind(elements!(serde_json::Value, NativeValue::Json(v) => v)),
        other => {
            return Err(ConvertError::Array {
                element_type: other.to_string(),
                reason: "unsupported PostgreSQL element type".to_string(),
            })
        }
    };
    Ok(query)
}

fn numeric_element(value: NativeValue) -> Result<Decimal, ConvertError> {
    let decimal = match value {
        NativeValue::Numeric(v) => v,
        NativeValue::SmallInt(v) => Decimal::from(v),
        NativeValue::Integer(v) => Decimal::from(v),
        NativeValue::BigInt(v) => Decimal::from(v),
        NativeValue::Text(v) => {
            Decimal::from_str(&v).map_err(|e| ConvertError::parse(v.as_str(), "numeric", e))?
        }
        other => return Err(ConvertError::mismatch(other.kind_name(), "numeric")),
    };
    Ok(decimal)
}
