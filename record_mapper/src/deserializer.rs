//! Struct deserializer
//!
//! Rebuilds a record through its canonical constructor, telling apart
//! parameters that were not supplied from parameters supplied as null.

use crate::errors::MapperError;
use crate::metadata::{Arguments, Parameter, Record, TypeMetadata};
use crate::values::ValueMap;
use type_mapping::{debug_log, Converter, Slot};

/// Build a `T` from per-parameter slots supplied by `value_of`
///
/// For every parameter:
/// - `Absent`: nullable parameters without a default are bound to null,
///   all others are left to their default
/// - `Null`: nullable parameters are bound to null, all others are left unbound
/// - a value: converted to the declared type and bound
///
/// All unbound parameters without a default are reported together.
pub fn deserialize<T, F>(
    metadata: &TypeMetadata<T>,
    converter: &Converter,
    mut value_of: F,
) -> Result<T, MapperError>
where
    T: Record,
    F: FnMut(&Parameter) -> Result<Slot, MapperError>,
{
    let type_name = metadata.type_name();
    let constructor = metadata.constructor();
    let mut arguments = Arguments::new(type_name);
    let mut missing = Vec::new();

    for parameter in constructor.parameters() {
        let name = parameter.name();
        let slot = converter
            .convert_slot(value_of(parameter)?, parameter.declared())
            .map_err(|source| MapperError::Parameter {
                type_name,
                parameter: name.to_string(),
                source,
            })?;

        match slot {
            Slot::Present(value) => arguments.bind(name, value),
            Slot::Absent if parameter.has_default() => {}
            Slot::Absent | Slot::Null => {
                if let Some(null) = parameter.null_value() {
                    arguments.bind(name, null);
                }
            }
        }

        if !arguments.is_bound(name) && !parameter.has_default() {
            missing.push(name.to_string());
        }
    }

    if !missing.is_empty() {
        debug_log!("[DESERIALIZER] Cannot create {}: missing {:?}", type_name, missing);
        return Err(MapperError::Construction {
            type_name,
            missing,
            arguments: arguments.describe(),
        });
    }

    constructor.invoke(&mut arguments)
}

/// Build a `T` from a value map; keys not present are `Absent`
pub fn deserialize_map<T: Record>(
    metadata: &TypeMetadata<T>,
    converter: &Converter,
    mut values: ValueMap,
) -> Result<T, MapperError> {
    deserialize(metadata, converter, |parameter| {
        Ok(values.shift_remove(parameter.name()).unwrap_or_default())
    })
}

/// Build a `T` from `provided` values, asking `value_of` for the rest
pub fn deserialize_with<T, F>(
    metadata: &TypeMetadata<T>,
    converter: &Converter,
    mut provided: ValueMap,
    mut value_of: F,
) -> Result<T, MapperError>
where
    T: Record,
    F: FnMut(&Parameter) -> Result<Slot, MapperError>,
{
    deserialize(metadata, converter, |parameter| {
        match provided.shift_remove(parameter.name()) {
            Some(slot) if !slot.is_absent() => Ok(slot),
            _ => value_of(parameter),
        }
    })
}
