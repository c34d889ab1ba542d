//! Unified type mapping between Rust domain values and storage-native values
//! This crate provides the conversion logic used across the rowhaus ecosystem

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

mod catalogue;
pub mod converter;
pub mod decimal;
pub mod descriptor;
pub mod errors;
pub mod native;
pub mod registry;
pub mod serialize;
pub mod sql;
pub mod value;

pub use converter::Converter;
pub use decimal::{FixedDecimal, Money};
pub use descriptor::{
    CollectionKind, CollectionShape, Described, OptionalShape, Shape, SingleField, TypeDescriptor,
    WrapperShape,
};
pub use errors::ConvertError;
pub use native::{NativeArray, NativeContext, NativeValue};
pub use registry::{ConversionEntry, ConverterRegistry, Resolution};
pub use sql::ElementType;
pub use value::{DynValue, IntoSlot, Slot, Value};

// Re-export the external types that appear in the public conversion API
pub use chrono;
pub use rust_decimal;
pub use uuid;
