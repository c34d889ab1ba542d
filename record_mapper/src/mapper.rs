//! Mapper facade
//!
//! Owns the metadata cache and the frozen converter and exposes the
//! serialize / deserialize operations for any [`Record`].

use crate::cache::MetadataCache;
use crate::deserializer::{deserialize, deserialize_map, deserialize_with};
use crate::errors::MapperError;
use crate::metadata::{Parameter, Record, TypeMetadata};
use crate::serializer::serialize;
use crate::values::ValueMap;
use indexmap::IndexMap;
use std::sync::Arc;
use type_mapping::serialize::object_from_natives;
use type_mapping::{ConvertError, Converter, NativeContext, NativeValue, Slot, Value};

#[derive(Debug, Clone, Default)]
pub struct Mapper {
    cache: Arc<MetadataCache>,
    converter: Arc<Converter>,
}

impl Mapper {
    pub fn new(converter: Converter) -> Self {
        Self::with_converter(Arc::new(converter))
    }

    pub fn with_converter(converter: Arc<Converter>) -> Self {
        Self {
            cache: Arc::new(MetadataCache::new()),
            converter,
        }
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn metadata<T: Record>(&self) -> Result<Arc<TypeMetadata<T>>, MapperError> {
        self.cache.metadata_of::<T>()
    }

    /// All readable fields of `record`, in declaration order
    pub fn to_values<T: Record>(&self, record: &T) -> Result<ValueMap, MapperError> {
        self.to_values_with(record, ValueMap::new(), &[])
    }

    pub fn to_values_skipping<T: Record>(
        &self,
        record: &T,
        skip: &[&str],
    ) -> Result<ValueMap, MapperError> {
        self.to_values_with(record, ValueMap::new(), skip)
    }

    /// Serialize with explicit values replacing (or adding to) the read ones
    pub fn to_values_with<T: Record>(
        &self,
        record: &T,
        overrides: ValueMap,
        skip: &[&str],
    ) -> Result<ValueMap, MapperError> {
        let metadata = self.metadata::<T>()?;
        Ok(serialize(&metadata, record, overrides, skip))
    }

    /// Serialize and convert every value to its native form
    pub fn to_native_values<T: Record>(
        &self,
        record: &T,
        context: Option<&dyn NativeContext>,
    ) -> Result<IndexMap<String, NativeValue>, MapperError> {
        self.to_values(record)?
            .into_iter()
            .map(|(name, slot)| {
                let native = self.converter.to_slot(&slot, context)?;
                Ok::<_, MapperError>((name, native))
            })
            .collect()
    }

    /// Build a `T` from a value map
    pub fn create_from<T: Record>(&self, values: ValueMap) -> Result<T, MapperError> {
        let metadata = self.metadata::<T>()?;
        deserialize_map(&metadata, &self.converter, values)
    }

    /// Build a `T`, asking `value_of` for every constructor parameter
    pub fn create<T, F>(&self, value_of: F) -> Result<T, MapperError>
    where
        T: Record,
        F: FnMut(&Parameter) -> Result<Slot, MapperError>,
    {
        let metadata = self.metadata::<T>()?;
        deserialize(&metadata, &self.converter, value_of)
    }

    /// Build a `T` from `provided` values, asking `value_of` for the rest
    pub fn create_with<T, F>(&self, provided: ValueMap, value_of: F) -> Result<T, MapperError>
    where
        T: Record,
        F: FnMut(&Parameter) -> Result<Slot, MapperError>,
    {
        let metadata = self.metadata::<T>()?;
        deserialize_with(&metadata, &self.converter, provided, value_of)
    }

    /// Serialize `record` into a JSON object
    pub fn to_json<T: Record>(&self, record: &T) -> Result<serde_json::Value, MapperError> {
        let natives = self.to_native_values(record, None)?;
        Ok(object_from_natives(natives)?)
    }

    /// Build a `T` from a JSON object; `null` members are explicit nulls
    pub fn from_json<T: Record>(&self, json: serde_json::Value) -> Result<T, MapperError> {
        let object = match json {
            serde_json::Value::Object(object) => object,
            other => {
                return Err(ConvertError::Json(format!(
                    "Expected an object to create {}, got {}",
                    T::type_name(),
                    other
                ))
                .into())
            }
        };
        let values: ValueMap = object
            .into_iter()
            .map(|(name, member)| {
                let slot = match member {
                    serde_json::Value::Null => Slot::Null,
                    member => Slot::Present(Value::new(NativeValue::from_json(member))),
                };
                (name, slot)
            })
            .collect();
        self.create_from(values)
    }
}
