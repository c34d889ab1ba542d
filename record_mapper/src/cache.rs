//! Type metadata cache
//!
//! Metadata is computed once per record type and shared read-only.

use crate::errors::MapperError;
use crate::metadata::{Record, TypeMetadata};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use type_mapping::debug_log;

type Entries = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Lazily filled map from record type to its metadata
pub struct MetadataCache {
    entries: RwLock<Entries>,
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("cached_types", &self.len())
            .finish()
    }
}

impl MetadataCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, Entries> {
        // Entries are only ever inserted whole, so a poisoned map is still consistent
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Metadata of `T`, computed on first use
    ///
    /// Every caller observes the same shared instance. Configuration errors
    /// are not cached and are reported on every call.
    pub fn metadata_of<T: Record>(&self) -> Result<Arc<TypeMetadata<T>>, MapperError> {
        let id = TypeId::of::<T>();
        if let Some(cached) = self.read_entries().get(&id).cloned() {
            return Self::downcast::<T>(cached);
        }

        let mut entries = self.write_entries();
        // Another caller may have computed it while we waited for the write lock
        if let Some(cached) = entries.get(&id).cloned() {
            return Self::downcast::<T>(cached);
        }

        let metadata = Arc::new(TypeMetadata::<T>::compute()?);
        debug_log!(
            "[METADATA] Computed metadata for {} ({} fields, {} parameters)",
            T::type_name(),
            metadata.len(),
            metadata.constructor().parameters().len()
        );
        entries.insert(id, metadata.clone());
        Ok(metadata)
    }

    fn downcast<T: Record>(
        cached: Arc<dyn Any + Send + Sync>,
    ) -> Result<Arc<TypeMetadata<T>>, MapperError> {
        cached
            .downcast::<TypeMetadata<T>>()
            .map_err(|_| MapperError::configuration(T::type_name(), "cached metadata has a foreign type"))
    }

    /// Number of cached record types
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Constructor, FieldDescriptor, Parameter};
    use type_mapping::{TypeDescriptor, Value};

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: i64,
    }

    impl Record for Counter {
        fn type_name() -> &'static str {
            "Counter"
        }

        fn fields() -> Vec<FieldDescriptor<Self>> {
            vec![FieldDescriptor::new(
                "count",
                TypeDescriptor::of::<i64>(),
                false,
                |c: &Counter| Value::new(c.count),
            )]
        }

        fn constructor() -> Option<Constructor<Self>> {
            Some(Constructor::new(
                vec![Parameter::new("count", TypeDescriptor::of::<i64>(), false)],
                |args| Ok(Counter { count: args.take("count")? }),
            ))
        }
    }

    struct NoConstructor;

    impl Record for NoConstructor {
        fn type_name() -> &'static str {
            "NoConstructor"
        }

        fn fields() -> Vec<FieldDescriptor<Self>> {
            Vec::new()
        }
    }

    #[test]
    fn test_single_shared_instance() {
        let cache = MetadataCache::new();
        assert!(cache.is_empty());
        let first = cache.metadata_of::<Counter>().unwrap();
        let second = cache.metadata_of::<Counter>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_first_use() {
        let cache = Arc::new(MetadataCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.metadata_of::<Counter>().unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().all(|m| Arc::ptr_eq(m, &results[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_configuration_errors_are_not_cached() {
        let cache = MetadataCache::new();
        assert!(cache.metadata_of::<NoConstructor>().is_err());
        assert!(cache.metadata_of::<NoConstructor>().is_err());
        assert!(cache.is_empty());
    }
}
