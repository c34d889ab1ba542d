//! Convenience re-exports for common RowHaus usage
//!
//! This prelude module re-exports the most commonly used items from the RowHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use rowhaus::prelude::*;
//!
//! // Now you have access to all the common RowHaus types and traits
//! ```

// Core RowHaus components
pub use crate::core::{RowHaus, RowHausBuilder};
pub use crate::errors::RowHausError;
pub use crate::pg::{bind_native, native_from_row, row_values, PgArrayContext, PgQuery};

// Re-export centralized config
pub use config::{AppConfig, ConversionConfig};

// Records, wrappers and value maps
pub use record_mapper::prelude::*;

// Re-export record_mapper for macro-generated code
pub use record_mapper;

// Common external dependencies
pub use sqlx;

// Commonly used sqlx types
pub use sqlx::{PgPool, Row};
