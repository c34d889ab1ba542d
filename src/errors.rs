//! Error types for the RowHaus crate
//!
//! This module contains all error types that can be returned by RowHaus operations.

use config::ConfigError;
use record_mapper::MapperError;
use thiserror::Error;
use type_mapping::ConvertError;

#[derive(Error, Debug)]
pub enum RowHausError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Mapping(#[from] MapperError),

    #[error(transparent)]
    Conversion(#[from] ConvertError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
