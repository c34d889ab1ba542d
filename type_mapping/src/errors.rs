//! Error types for value conversion
//!
//! This module defines all error types that can occur while converting
//! between domain values and their native representation.

use thiserror::Error;

/// Boxed failure raised by user code (wrapper constructors, custom converters)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Cannot convert {from_kind} to {target}")]
    Mismatch {
        from_kind: String,
        target: &'static str,
    },

    #[error("Null cannot be converted to non-nullable {target}")]
    UnexpectedNull { target: &'static str },

    #[error("Cannot parse '{input}' as {target}: {reason}")]
    Parse {
        input: String,
        target: &'static str,
        reason: String,
    },

    #[error("Value {value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("Expected {expected} elements for {target}, got {actual}")]
    Length {
        target: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot create array of {element_type}: {reason}")]
    Array { element_type: String, reason: String },

    #[error("JSON conversion error: {0}")]
    Json(String),

    #[error(transparent)]
    User(BoxError),
}

impl ConvertError {
    pub fn mismatch(from_kind: impl Into<String>, target: &'static str) -> Self {
        ConvertError::Mismatch {
            from_kind: from_kind.into(),
            target,
        }
    }

    pub fn parse(input: impl Into<String>, target: &'static str, reason: impl ToString) -> Self {
        ConvertError::Parse {
            input: input.into(),
            target,
            reason: reason.to_string(),
        }
    }

    pub fn out_of_range(value: impl ToString, target: &'static str) -> Self {
        ConvertError::OutOfRange {
            value: value.to_string(),
            target,
        }
    }

    /// Wrap a failure raised by user code so it propagates unchanged
    pub fn user<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        ConvertError::User(error.into())
    }
}
