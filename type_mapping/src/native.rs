//! Native value definitions
//!
//! This module provides the closed set of storage-native value kinds
//! and the narrow storage-driver contract used to build native arrays.

use crate::errors::ConvertError;
use crate::value::Value;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// Flat value shape understood directly by the storage layer or wire format
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Boolean(bool),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Numeric(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    Json(serde_json::Value),
    Array(NativeArray),
    /// Domain value with no registered conversion, handed to the native layer as is
    Opaque(Value),
}

/// Native array: element type name plus the native elements
#[derive(Debug, Clone, PartialEq)]
pub struct NativeArray {
    element_type: String,
    elements: Vec<NativeValue>,
}

impl NativeArray {
    pub fn new(element_type: impl Into<String>, elements: Vec<NativeValue>) -> Self {
        Self {
            element_type: element_type.into(),
            elements,
        }
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn elements(&self) -> &[NativeValue] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<NativeValue> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Storage-driver capability needed when producing native arrays.
///
/// Some drivers need to know the element type name at creation time,
/// so collections are turned into arrays through this handle when one is supplied.
pub trait NativeContext {
    fn create_array(
        &self,
        element_type: &str,
        elements: Vec<NativeValue>,
    ) -> Result<NativeValue, ConvertError>;
}

impl<F> NativeContext for F
where
    F: Fn(&str, Vec<NativeValue>) -> Result<NativeValue, ConvertError>,
{
    fn create_array(
        &self,
        element_type: &str,
        elements: Vec<NativeValue>,
    ) -> Result<NativeValue, ConvertError> {
        self(element_type, elements)
    }
}

impl NativeValue {
    /// Stable kind name used in error messages and as array element type
    pub fn kind_name(&self) -> &'static str {
        match self {
            NativeValue::Null => "null",
            NativeValue::Boolean(_) => "bool",
            NativeValue::SmallInt(_) => "int2",
            NativeValue::Integer(_) => "int4",
            NativeValue::BigInt(_) => "int8",
            NativeValue::Real(_) => "float4",
            NativeValue::Double(_) => "float8",
            NativeValue::Numeric(_) => "numeric",
            NativeValue::Text(_) => "varchar",
            NativeValue::Bytes(_) => "bytea",
            NativeValue::Uuid(_) => "uuid",
            NativeValue::Date(_) => "date",
            NativeValue::Time(_) => "time",
            NativeValue::Timestamp(_) => "timestamp",
            NativeValue::TimestampTz(_) => "timestamptz",
            NativeValue::Json(_) => "jsonb",
            NativeValue::Array(_) => "array",
            NativeValue::Opaque(_) => "opaque",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            NativeValue::SmallInt(_)
                | NativeValue::Integer(_)
                | NativeValue::BigInt(_)
                | NativeValue::Real(_)
                | NativeValue::Double(_)
                | NativeValue::Numeric(_)
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NativeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn mismatch(&self, target: &'static str) -> ConvertError {
        ConvertError::mismatch(self.kind_name(), target)
    }

    /// Any integral native value, widened; fractional values are rejected
    pub(crate) fn to_integer(&self, target: &'static str) -> Result<i128, ConvertError> {
        match self {
            NativeValue::SmallInt(v) => Ok(i128::from(*v)),
            NativeValue::Integer(v) => Ok(i128::from(*v)),
            NativeValue::BigInt(v) => Ok(i128::from(*v)),
            NativeValue::Numeric(d) if d.fract().is_zero() => d
                .to_i128()
                .ok_or_else(|| ConvertError::out_of_range(d, target)),
            NativeValue::Real(f) if f.fract() == 0.0 => Ok(*f as i128),
            NativeValue::Double(f) if f.fract() == 0.0 => Ok(*f as i128),
            NativeValue::Text(s) => s
                .trim()
                .parse::<i128>()
                .map_err(|e| ConvertError::parse(s.as_str(), target, e)),
            other => Err(other.mismatch(target)),
        }
    }

    pub(crate) fn to_float(&self, target: &'static str) -> Result<f64, ConvertError> {
        match self {
            NativeValue::SmallInt(v) => Ok(f64::from(*v)),
            NativeValue::Integer(v) => Ok(f64::from(*v)),
            NativeValue::BigInt(v) => Ok(*v as f64),
            NativeValue::Real(v) => Ok(f64::from(*v)),
            NativeValue::Double(v) => Ok(*v),
            NativeValue::Numeric(d) => d.to_f64().ok_or_else(|| ConvertError::out_of_range(d, target)),
            NativeValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| ConvertError::parse(s.as_str(), target, e)),
            other => Err(other.mismatch(target)),
        }
    }

    pub(crate) fn to_decimal(&self, target: &'static str) -> Result<Decimal, ConvertError> {
        match self {
            NativeValue::SmallInt(v) => Ok(Decimal::from(*v)),
            NativeValue::Integer(v) => Ok(Decimal::from(*v)),
            NativeValue::BigInt(v) => Ok(Decimal::from(*v)),
            NativeValue::Real(v) => {
                Decimal::try_from(*v).map_err(|_| ConvertError::out_of_range(v, target))
            }
            NativeValue::Double(v) => {
                Decimal::try_from(*v).map_err(|_| ConvertError::out_of_range(v, target))
            }
            NativeValue::Numeric(d) => Ok(*d),
            NativeValue::Text(s) => Decimal::from_str(s.trim())
                .map_err(|e| ConvertError::parse(s.as_str(), target, e)),
            other => Err(other.mismatch(target)),
        }
    }
}

/// Convert basic Rust types to NativeValue
impl From<String> for NativeValue {
    fn from(val: String) -> Self {
        NativeValue::Text(val)
    }
}

impl From<&str> for NativeValue {
    fn from(val: &str) -> Self {
        NativeValue::Text(val.to_string())
    }
}

impl From<i16> for NativeValue {
    fn from(val: i16) -> Self {
        NativeValue::SmallInt(val)
    }
}

impl From<i32> for NativeValue {
    fn from(val: i32) -> Self {
        NativeValue::Integer(val)
    }
}

impl From<i64> for NativeValue {
    fn from(val: i64) -> Self {
        NativeValue::BigInt(val)
    }
}

impl From<f64> for NativeValue {
    fn from(val: f64) -> Self {
        NativeValue::Double(val)
    }
}

impl From<bool> for NativeValue {
    fn from(val: bool) -> Self {
        NativeValue::Boolean(val)
    }
}

impl From<Decimal> for NativeValue {
    fn from(val: Decimal) -> Self {
        NativeValue::Numeric(val)
    }
}

impl From<Uuid> for NativeValue {
    fn from(val: Uuid) -> Self {
        NativeValue::Uuid(val)
    }
}

impl From<NaiveDate> for NativeValue {
    fn from(val: NaiveDate) -> Self {
        NativeValue::Date(val)
    }
}

impl From<NaiveDateTime> for NativeValue {
    fn from(val: NaiveDateTime) -> Self {
        NativeValue::Timestamp(val)
    }
}

impl From<DateTime<FixedOffset>> for NativeValue {
    fn from(val: DateTime<FixedOffset>) -> Self {
        NativeValue::TimestampTz(val)
    }
}

impl From<serde_json::Value> for NativeValue {
    fn from(val: serde_json::Value) -> Self {
        NativeValue::Json(val)
    }
}

impl From<NativeArray> for NativeValue {
    fn from(val: NativeArray) -> Self {
        NativeValue::Array(val)
    }
}

impl<T> From<Option<T>> for NativeValue
where
    T: Into<NativeValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => NativeValue::Null,
        }
    }
}
