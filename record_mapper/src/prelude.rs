//! Convenience re-exports for common record-mapper usage

// Core traits and derives
pub use crate::{model, Record, Wrapper};
pub use type_mapping::{Described, SingleField};

// Mapping
pub use crate::mapper::Mapper;
pub use crate::value_map;
pub use crate::values::ValueMap;
pub use type_mapping::{Converter, ConverterRegistry, IntoSlot, NativeValue, Slot, Value};

// Error types
pub use crate::errors::MapperError;
pub use type_mapping::ConvertError;

// Common value types
pub use type_mapping::{FixedDecimal, Money};
pub use type_mapping::uuid::Uuid;
