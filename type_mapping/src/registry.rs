//! Converter registry
//!
//! Maps exact domain types to their conversion entries. The registry is
//! built mutably at start-up and then frozen inside a [`crate::Converter`].

use crate::catalogue;
use crate::decimal::FixedDecimal;
use crate::descriptor::{Described, Shape, TypeDescriptor, WrapperShape};
use crate::errors::ConvertError;
use crate::native::NativeValue;
use crate::sql::ElementType;
use crate::value::Value;
use chrono::{FixedOffset, Offset, Utc};
use config::{ConfigError, ConversionConfig};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

pub type ToNativeFn = Arc<dyn Fn(&Value) -> Result<NativeValue, ConvertError> + Send + Sync>;
pub type FromNativeFn =
    Arc<dyn Fn(NativeValue, &TypeDescriptor) -> Result<Value, ConvertError> + Send + Sync>;

/// Conversion pair for one domain type
#[derive(Clone)]
pub struct ConversionEntry {
    to_native: ToNativeFn,
    from_native: FromNativeFn,
    array_type: Option<ElementType>,
}

impl ConversionEntry {
    /// Build an entry from typed conversion functions
    pub fn new<T, F, G>(to: F, from: G) -> Self
    where
        T: Described,
        F: Fn(&T) -> Result<NativeValue, ConvertError> + Send + Sync + 'static,
        G: Fn(NativeValue) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        let target = type_name::<T>();
        Self {
            to_native: Arc::new(move |value: &Value| match value.downcast_ref::<T>() {
                Some(typed) => to(typed),
                None => Err(ConvertError::mismatch(value.type_name(), target)),
            }),
            from_native: Arc::new(move |native, _| from(native).map(Value::new)),
            array_type: None,
        }
    }

    /// Build an entry from untyped functions that also see the requested descriptor
    pub fn raw(to_native: ToNativeFn, from_native: FromNativeFn) -> Self {
        Self {
            to_native,
            from_native,
            array_type: None,
        }
    }

    pub fn with_array_type(mut self, array_type: ElementType) -> Self {
        self.array_type = Some(array_type);
        self
    }

    pub fn array_type(&self) -> Option<ElementType> {
        self.array_type
    }

    pub fn to_native(&self, value: &Value) -> Result<NativeValue, ConvertError> {
        (self.to_native)(value)
    }

    pub fn from_native(
        &self,
        native: NativeValue,
        descriptor: &TypeDescriptor,
    ) -> Result<Value, ConvertError> {
        (self.from_native)(native, descriptor)
    }
}

impl fmt::Debug for ConversionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEntry")
            .field("array_type", &self.array_type)
            .finish_non_exhaustive()
    }
}

/// Result of resolving a descriptor against the registry
#[derive(Debug)]
pub enum Resolution<'a> {
    Entry(&'a ConversionEntry),
    /// No entry, but the type is a single-field wrapper: convert its inner value
    Unwrap(WrapperShape),
    Unresolved,
}

#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    entries: HashMap<TypeId, ConversionEntry>,
}

impl ConverterRegistry {
    /// Empty registry, without the default catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the default catalogue; instants are anchored at `anchor`
    pub fn with_anchor(anchor: FixedOffset) -> Self {
        let mut registry = Self::new();
        catalogue::install(&mut registry, anchor);
        registry
    }

    /// Registry with the default catalogue configured from `config`
    pub fn with_defaults(config: &ConversionConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_anchor(config.instant_offset()?))
    }

    /// Register an entry for `T`, replacing any earlier one
    pub fn insert<T: Described>(&mut self, entry: ConversionEntry) -> &mut Self {
        if self.entries.insert(TypeId::of::<T>(), entry).is_some() {
            debug_log!("[REGISTRY] Replaced converter for {}", type_name::<T>());
        }
        self
    }

    pub fn register<T, F, G>(&mut self, to: F, from: G) -> &mut Self
    where
        T: Described,
        F: Fn(&T) -> Result<NativeValue, ConvertError> + Send + Sync + 'static,
        G: Fn(NativeValue) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        self.insert::<T>(ConversionEntry::new(to, from))
    }

    /// Register a type stored as its display string and read back with `FromStr`
    pub fn register_string_form<T>(&mut self) -> &mut Self
    where
        T: Described + Display + FromStr,
        T::Err: Display,
    {
        let entry = ConversionEntry::new(
            |value: &T| Ok(NativeValue::Text(value.to_string())),
            |native: NativeValue| match native {
                NativeValue::Text(text) => text
                    .parse::<T>()
                    .map_err(|e| ConvertError::parse(text.as_str(), type_name::<T>(), e)),
                other => Err(other.mismatch(type_name::<T>())),
            },
        )
        .with_array_type(ElementType::Text);
        self.insert::<T>(entry)
    }

    /// Register a fixed-scale decimal stored as numeric
    pub fn register_fixed_decimal<const SCALE: u32>(&mut self) -> &mut Self {
        let entry = ConversionEntry::new(
            |value: &FixedDecimal<SCALE>| Ok(NativeValue::Numeric(value.value())),
            |native: NativeValue| {
                native
                    .to_decimal(type_name::<FixedDecimal<SCALE>>())
                    .map(FixedDecimal::new)
            },
        )
        .with_array_type(ElementType::Numeric);
        self.insert::<FixedDecimal<SCALE>>(entry)
    }

    pub fn lookup(&self, id: TypeId) -> Option<&ConversionEntry> {
        self.entries.get(&id)
    }

    /// Exact entry first, then the inner type of a single-field wrapper
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Resolution<'_> {
        if let Some(entry) = self.lookup(descriptor.id) {
            return Resolution::Entry(entry);
        }
        match descriptor.shape {
            Shape::Wrapper(wrapper) => Resolution::Unwrap(wrapper),
            _ => Resolution::Unresolved,
        }
    }

    /// Static array element type for values of `descriptor`, looking through wrappers
    pub fn array_type_of(&self, descriptor: &TypeDescriptor) -> Option<ElementType> {
        match self.resolve(&descriptor.non_null()) {
            Resolution::Entry(entry) => entry.array_type(),
            Resolution::Unwrap(wrapper) => self.array_type_of(&(wrapper.inner)()),
            Resolution::Unresolved => None,
        }
    }

    pub fn contains<T: Described>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry with the default catalogue anchored at UTC
pub fn default_registry() -> ConverterRegistry {
    ConverterRegistry::with_anchor(Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[derive(Debug, Clone, PartialEq)]
    struct Celsius(f64);

    impl Described for Celsius {}

    #[test]
    fn test_defaults_cover_catalogue() {
        let registry = default_registry();
        assert!(registry.contains::<i64>());
        assert!(registry.contains::<chrono::NaiveDate>());
        assert!(registry.contains::<crate::Money>());
        assert!(!registry.contains::<Celsius>());
        assert!(!ConverterRegistry::new().contains::<i64>());
    }

    #[test]
    fn test_register_replaces_entry() {
        let mut registry = ConverterRegistry::new();
        registry.register::<Celsius, _, _>(
            |c| Ok(NativeValue::Double(c.0)),
            |native| native.to_float("Celsius").map(Celsius),
        );
        registry.register::<Celsius, _, _>(
            |c| Ok(NativeValue::Text(format!("{}C", c.0))),
            |_| Ok(Celsius(0.0)),
        );
        assert_eq!(registry.len(), 1);

        let entry = registry.lookup(TypeId::of::<Celsius>()).unwrap();
        let native = entry.to_native(&Value::new(Celsius(21.5))).unwrap();
        assert_eq!(native, NativeValue::Text("21.5C".into()));
    }

    #[test]
    fn test_string_form_entry() {
        let mut registry = ConverterRegistry::new();
        registry.register_string_form::<Weekday>();
        let entry = registry.lookup(TypeId::of::<Weekday>()).unwrap();
        assert_eq!(entry.array_type(), Some(ElementType::Text));

        let value = entry
            .from_native("Tue".into(), &TypeDescriptor::of::<Weekday>())
            .unwrap();
        assert_eq!(value, Value::new(Weekday::Tue));
        assert!(entry
            .from_native("Someday".into(), &TypeDescriptor::of::<Weekday>())
            .is_err());
    }

    #[test]
    fn test_entry_rejects_foreign_value() {
        let registry = default_registry();
        let entry = registry.lookup(TypeId::of::<i64>()).unwrap();
        let err = entry.to_native(&Value::new("x".to_string())).unwrap_err();
        assert!(matches!(err, ConvertError::Mismatch { .. }));
    }
}
