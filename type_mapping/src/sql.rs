//! SQL array element types
//!
//! This module names the PostgreSQL element types used when collections
//! are turned into native arrays.

use crate::native::NativeValue;
use std::fmt;
use std::str::FromStr;

/// Element type family of a native array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Text,
    Numeric,
    Boolean,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Bytes,
}

impl ElementType {
    /// Infer the element type from a native element
    pub fn of(value: &NativeValue) -> Option<Self> {
        match value {
            NativeValue::Null | NativeValue::Array(_) | NativeValue::Opaque(_) => None,
            NativeValue::Boolean(_) => Some(ElementType::Boolean),
            NativeValue::SmallInt(_)
            | NativeValue::Integer(_)
            | NativeValue::BigInt(_)
            | NativeValue::Real(_)
            | NativeValue::Double(_)
            | NativeValue::Numeric(_) => Some(ElementType::Numeric),
            NativeValue::Text(_) => Some(ElementType::Text),
            NativeValue::Bytes(_) => Some(ElementType::Bytes),
            NativeValue::Uuid(_) => Some(ElementType::Uuid),
            NativeValue::Date(_) => Some(ElementType::Date),
            NativeValue::Time(_) => Some(ElementType::Time),
            NativeValue::Timestamp(_) => Some(ElementType::Timestamp),
            NativeValue::TimestampTz(_) => Some(ElementType::TimestampTz),
            NativeValue::Json(_) => Some(ElementType::Json),
        }
    }

    /// Default PostgreSQL name of the element type
    pub fn default_name(&self) -> &'static str {
        match self {
            ElementType::Text => "varchar",
            ElementType::Numeric => "numeric",
            ElementType::Boolean => "bool",
            ElementType::Uuid => "uuid",
            ElementType::Date => "date",
            ElementType::Time => "time",
            ElementType::Timestamp => "timestamp",
            ElementType::TimestampTz => "timestamptz",
            ElementType::Json => "jsonb",
            ElementType::Bytes => "bytea",
        }
    }

    /// Check if a PostgreSQL type name belongs to this element type family
    pub fn accepts(&self, pg_type: &str) -> bool {
        pg_type
            .parse::<ElementType>()
            .is_ok_and(|parsed| parsed == *self)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Normalize type string by removing whitespace and case for consistent matching
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "varchar" | "text" | "bpchar" | "char" | "name" | "character varying" => {
                Ok(ElementType::Text)
            }
            "numeric" | "decimal" | "int2" | "int4" | "int8" | "smallint" | "integer"
            | "bigint" | "float4" | "float8" | "real" | "double precision" => {
                Ok(ElementType::Numeric)
            }
            "bool" | "boolean" => Ok(ElementType::Boolean),
            "uuid" => Ok(ElementType::Uuid),
            "date" => Ok(ElementType::Date),
            "time" => Ok(ElementType::Time),
            "timestamp" => Ok(ElementType::Timestamp),
            "timestamptz" | "timestamp with time zone" => Ok(ElementType::TimestampTz),
            "json" | "jsonb" => Ok(ElementType::Json),
            "bytea" => Ok(ElementType::Bytes),
            other => Err(format!("Unsupported array element type: {}", other)),
        }
    }
}
