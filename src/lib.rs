//! # RowHaus
//!
//! Maps plain Rust structs to ordered value maps and back, converting every
//! value through a pluggable registry of native conversions, with glue for
//! PostgreSQL rows and queries over sqlx.
//!
//! ## Quick Start
//!
//! ```rust
//! use rowhaus::prelude::*;
//!
//! #[model]
//! pub struct User {
//!     pub id: i64,
//!     pub name: String,
//!     #[record(default)]
//!     pub tags: Vec<String>,
//!     pub balance: Money,
//! }
//!
//! fn main() -> Result<(), RowHausError> {
//!     let rowhaus = RowHaus::new(AppConfig::default())?;
//!     let mapper = rowhaus.mapper();
//!
//!     let user: User = mapper.create_from(value_map! {
//!         "id" => 1_i32,
//!         "name" => "Ada",
//!         "balance" => "12.345",
//!     })?;
//!     assert_eq!(user.balance.to_string(), "12.35");
//!
//!     let values = mapper.to_values(&user)?;
//!     assert_eq!(values.len(), 4);
//!     Ok(())
//! }
//! ```

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

pub mod core;
pub mod errors;
pub mod pg;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::{RowHaus, RowHausBuilder};
pub use errors::RowHausError;

// Re-export centralized config
pub use config::{AppConfig, ConversionConfig};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated macro code to work correctly
pub use record_mapper;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;
