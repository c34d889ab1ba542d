//! Struct serializer
//!
//! Turns a record into an ordered [`ValueMap`].

use crate::metadata::{Record, TypeMetadata};
use crate::values::ValueMap;
use type_mapping::{trace_log, Slot};

/// Serialize `record` field by field
///
/// Skipped fields and override keys are never read. The remaining fields
/// come first in declaration order, followed by every override in its own
/// order. `Absent` overrides are dropped.
pub fn serialize<T: Record>(
    metadata: &TypeMetadata<T>,
    record: &T,
    overrides: ValueMap,
    skip: &[&str],
) -> ValueMap {
    let mut values = ValueMap::with_capacity(metadata.len() + overrides.len());

    for field in metadata.fields() {
        let name = field.name();
        if overrides.contains_key(name) || skip.contains(&name) {
            continue;
        }
        values.insert(name.to_string(), field.value_of(record));
    }

    for (name, slot) in overrides {
        if !slot.is_absent() {
            values.insert(name, slot);
        }
    }

    trace_log!(
        "[SERIALIZER] {} serialized into {} values",
        metadata.type_name(),
        values.len()
    );
    values
}
