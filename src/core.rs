//! Core RowHaus functionality
//!
//! This module contains the application context that owns the configuration,
//! the frozen converter and the metadata cache, and ties them to sqlx rows
//! and queries.

use indexmap::IndexMap;
use record_mapper::{Mapper, MapperError, Parameter, Record, ValueMap};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::fmt::Display;
use std::str::FromStr;
use type_mapping::{
    ConvertError, Converter, ConverterRegistry, Described, NativeValue, Slot, Value,
};

use crate::debug_log;
use crate::errors::RowHausError;
use crate::pg::{bind_native, native_from_row, PgArrayContext, PgQuery};
use config::AppConfig;

/// Application context shared by reference or `Arc`
#[derive(Debug, Clone)]
pub struct RowHaus {
    config: AppConfig,
    mapper: Mapper,
}

impl RowHaus {
    /// Create a context with the default converter catalogue
    pub fn new(config: AppConfig) -> Result<Self, RowHausError> {
        Ok(Self::builder(config)?.build())
    }

    /// Start from the default catalogue and register extra converters before freezing
    pub fn builder(config: AppConfig) -> Result<RowHausBuilder, RowHausError> {
        config.validate()?;
        let registry = ConverterRegistry::with_defaults(&config.conversion)?;
        Ok(RowHausBuilder { config, registry })
    }

    /// Create a context from `rowhaus.toml` / `ROWHAUS_CONFIG`, or defaults
    pub fn from_env() -> Result<Self, RowHausError> {
        Self::new(AppConfig::load()?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn converter(&self) -> &Converter {
        self.mapper.converter()
    }

    /// Serialize `record` into PostgreSQL-ready native values, in field order
    pub fn to_row<T: Record>(
        &self,
        record: &T,
    ) -> Result<IndexMap<String, NativeValue>, RowHausError> {
        Ok(self.mapper.to_native_values(record, Some(&PgArrayContext))?)
    }

    /// Build a `T` from a fetched row; columns the row lacks are absent
    pub fn from_row<T: Record>(&self, row: &PgRow) -> Result<T, RowHausError> {
        Ok(self.mapper.create::<T, _>(|parameter| column_slot(row, parameter))?)
    }

    /// Build a `T` from `provided` values, reading the rest from `row`
    pub fn from_row_with<T: Record>(
        &self,
        row: &PgRow,
        provided: ValueMap,
    ) -> Result<T, RowHausError> {
        Ok(self
            .mapper
            .create_with::<T, _>(provided, |parameter| column_slot(row, parameter))?)
    }

    /// Bind every serialized field of `record` to `query`, in field order
    pub fn bind_record<'q, T: Record>(
        &self,
        query: PgQuery<'q>,
        record: &T,
    ) -> Result<PgQuery<'q>, RowHausError> {
        let mut query = query;
        for (_, native) in self.to_row(record)? {
            query = bind_native(query, native)?;
        }
        Ok(query)
    }
}

fn column_slot(row: &PgRow, parameter: &Parameter) -> Result<Slot, MapperError> {
    let name = parameter.name();
    if row.try_column(name).is_err() {
        return Ok(Slot::Absent);
    }
    match native_from_row(row, name) {
        Ok(NativeValue::Null) => Ok(Slot::Null),
        Ok(native) => Ok(Slot::Present(Value::new(native))),
        Err(e) => Err(MapperError::Provider {
            parameter: name.to_string(),
            source: Box::new(e),
        }),
    }
}

/// Builder collecting extra converters on top of the default catalogue
#[derive(Debug)]
pub struct RowHausBuilder {
    config: AppConfig,
    registry: ConverterRegistry,
}

impl RowHausBuilder {
    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    /// Register a custom conversion for `T`, replacing any earlier one
    pub fn register<T, F, G>(mut self, to: F, from: G) -> Self
    where
        T: Described,
        F: Fn(&T) -> Result<NativeValue, ConvertError> + Send + Sync + 'static,
        G: Fn(NativeValue) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        self.registry.register::<T, F, G>(to, from);
        self
    }

    /// Register `T` to be stored as its display string
    pub fn register_string_form<T>(mut self) -> Self
    where
        T: Described + Display + FromStr,
        T::Err: Display,
    {
        self.registry.register_string_form::<T>();
        self
    }

    /// Freeze the registry and create the context
    pub fn build(self) -> RowHaus {
        debug_log!(
            "[ROWHAUS] Freezing converter registry with {} entries",
            self.registry.len()
        );
        let converter = Converter::new(self.registry, &self.config.conversion);
        RowHaus {
            mapper: Mapper::new(converter),
            config: self.config,
        }
    }
}
