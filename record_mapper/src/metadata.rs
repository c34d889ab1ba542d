//! Record metadata
//!
//! This module defines the [`Record`] trait and the field, parameter and
//! constructor descriptions it exposes. Implementations are generated by
//! `#[derive(Record)]`.

use crate::errors::MapperError;
use indexmap::IndexMap;
use std::fmt;
use type_mapping::{Described, Slot, TypeDescriptor, Value};

/// Structural description of a record type
///
/// Recommended usage:
/// ```
/// use record_mapper::Record;
///
/// #[derive(Debug, Clone, PartialEq, Record)]
/// pub struct Customer {
///     pub name: String,
///     #[record(default)]
///     pub tags: Vec<String>,
///     pub nickname: Option<String>,
/// }
/// ```
pub trait Record: Sized + Send + Sync + 'static {
    /// Readable type name used in error messages
    fn type_name() -> &'static str;

    /// Publicly readable fields in declaration order
    fn fields() -> Vec<FieldDescriptor<Self>>;

    /// The canonical constructor
    fn constructor() -> Option<Constructor<Self>> {
        None
    }
}

/// A readable field of `T`
pub struct FieldDescriptor<T> {
    name: &'static str,
    declared: TypeDescriptor,
    has_default: bool,
    getter: fn(&T) -> Value,
}

impl<T> FieldDescriptor<T> {
    pub fn new(
        name: &'static str,
        declared: TypeDescriptor,
        has_default: bool,
        getter: fn(&T) -> Value,
    ) -> Self {
        Self {
            name,
            declared,
            has_default,
            getter,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared(&self) -> &TypeDescriptor {
        &self.declared
    }

    pub fn is_nullable(&self) -> bool {
        self.declared.is_nullable()
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// Read the field; `None` becomes [`Slot::Null`]
    pub fn value_of(&self, record: &T) -> Slot {
        Slot::from_value((self.getter)(record))
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            declared: self.declared,
            has_default: self.has_default,
            getter: self.getter,
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("has_default", &self.has_default)
            .finish()
    }
}

/// A parameter of the canonical constructor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameter {
    name: &'static str,
    declared: TypeDescriptor,
    has_default: bool,
}

impl Parameter {
    pub fn new(name: &'static str, declared: TypeDescriptor, has_default: bool) -> Self {
        Self {
            name,
            declared,
            has_default,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared(&self) -> &TypeDescriptor {
        &self.declared
    }

    pub fn is_nullable(&self) -> bool {
        self.declared.is_nullable()
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// The `None` value of a nullable parameter
    pub fn null_value(&self) -> Option<Value> {
        self.declared.null_value()
    }
}

pub type InvokeFn<T> = fn(&mut Arguments) -> Result<T, MapperError>;

/// Canonical constructor: ordered parameters plus the function building the instance
pub struct Constructor<T> {
    parameters: Vec<Parameter>,
    invoke: InvokeFn<T>,
}

impl<T> Constructor<T> {
    pub fn new(parameters: Vec<Parameter>, invoke: InvokeFn<T>) -> Self {
        Self { parameters, invoke }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn invoke(&self, arguments: &mut Arguments) -> Result<T, MapperError> {
        (self.invoke)(arguments)
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Cached metadata of a record type
#[derive(Debug)]
pub struct TypeMetadata<T> {
    type_name: &'static str,
    fields: IndexMap<&'static str, FieldDescriptor<T>>,
    constructor: Constructor<T>,
}

impl<T: Record> TypeMetadata<T> {
    /// Enumerate fields and the constructor of `T`
    pub fn compute() -> Result<Self, MapperError> {
        let type_name = T::type_name();
        let constructor = T::constructor()
            .ok_or_else(|| MapperError::configuration(type_name, "no canonical constructor"))?;

        let mut fields = IndexMap::new();
        for field in T::fields() {
            let name = field.name();
            if fields.insert(name, field).is_some() {
                return Err(MapperError::configuration(
                    type_name,
                    format!("duplicate field '{}'", name),
                ));
            }
        }

        let mut seen = Vec::with_capacity(constructor.parameters().len());
        for parameter in constructor.parameters() {
            if seen.contains(&parameter.name()) {
                return Err(MapperError::configuration(
                    type_name,
                    format!("duplicate constructor parameter '{}'", parameter.name()),
                ));
            }
            seen.push(parameter.name());
        }

        Ok(Self {
            type_name,
            fields,
            constructor,
        })
    }
}

impl<T> TypeMetadata<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.keys().copied().collect()
    }

    pub fn constructor(&self) -> &Constructor<T> {
        &self.constructor
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Arguments bound for one constructor invocation
#[derive(Debug, Clone)]
pub struct Arguments {
    type_name: &'static str,
    values: IndexMap<&'static str, Value>,
}

impl Arguments {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            values: IndexMap::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn bind(&mut self, name: &'static str, value: Value) {
        self.values.insert(name, value);
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take a bound argument as `T`
    pub fn take<T: Described>(&mut self, name: &'static str) -> Result<T, MapperError> {
        let value = self
            .values
            .shift_remove(name)
            .ok_or_else(|| MapperError::Construction {
                type_name: self.type_name,
                missing: vec![name.to_string()],
                arguments: self.describe(),
            })?;
        value
            .downcast::<T>()
            .map_err(|source| MapperError::Parameter {
                type_name: self.type_name,
                parameter: name.to_string(),
                source,
            })
    }

    /// Take a bound argument, or fall back to the parameter's default
    pub fn take_or_else<T, F>(&mut self, name: &'static str, default: F) -> Result<T, MapperError>
    where
        T: Described,
        F: FnOnce() -> T,
    {
        if self.is_bound(name) {
            self.take(name)
        } else {
            Ok(default())
        }
    }

    /// Render the bound arguments as `{name=value, ...}`
    pub fn describe(&self) -> String {
        let entries: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{}={:?}", name, value))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}
