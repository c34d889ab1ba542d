//! Value converter
//!
//! Type-directed conversion between domain values and native values.
//! The write path dispatches on the runtime value's descriptor, the read
//! path on the requested target descriptor.

use crate::descriptor::{Described, Shape, TypeDescriptor};
use crate::errors::ConvertError;
use crate::native::{NativeArray, NativeContext, NativeValue};
use crate::registry::{default_registry, ConverterRegistry, Resolution};
use crate::sql::ElementType;
use crate::value::{Slot, Value};
use config::{ConfigError, ConversionConfig};
use std::any::TypeId;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Converter {
    registry: Arc<ConverterRegistry>,
    text_array_type: String,
    numeric_array_type: String,
}

impl Converter {
    /// Freeze `registry` into a converter
    pub fn new(registry: ConverterRegistry, config: &ConversionConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            text_array_type: config.text_array_type.clone(),
            numeric_array_type: config.numeric_array_type.clone(),
        }
    }

    /// Converter over the default catalogue
    pub fn from_config(config: &ConversionConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ConverterRegistry::with_defaults(config)?, config))
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    fn array_type_name(&self, element_type: ElementType) -> &str {
        match element_type {
            ElementType::Text => &self.text_array_type,
            ElementType::Numeric => &self.numeric_array_type,
            other => other.default_name(),
        }
    }

    /// Convert a domain value to its native form
    pub fn to(
        &self,
        value: &Value,
        context: Option<&dyn NativeContext>,
    ) -> Result<NativeValue, ConvertError> {
        let descriptor = *value.descriptor();
        match self.registry.resolve(&descriptor) {
            Resolution::Entry(entry) => return entry.to_native(value),
            Resolution::Unwrap(wrapper) => {
                let inner = (wrapper.unwrap)(value)
                    .ok_or_else(|| ConvertError::mismatch(descriptor.name, (wrapper.inner)().name))?;
                return self.to(&inner, context);
            }
            Resolution::Unresolved => {}
        }

        match descriptor.shape {
            Shape::Optional(optional) => match (optional.unwrap)(value) {
                Some(inner) => self.to(&inner, context),
                None => Ok(NativeValue::Null),
            },
            Shape::Collection(collection) => {
                let items = (collection.items)(value)
                    .ok_or_else(|| ConvertError::mismatch(value.type_name(), descriptor.name))?;
                let elements = items
                    .iter()
                    .map(|item| self.to(item, context))
                    .collect::<Result<Vec<_>, _>>()?;
                let element_type = self
                    .registry
                    .array_type_of(&(collection.element)())
                    .or_else(|| elements.iter().find_map(ElementType::of))
                    .unwrap_or(ElementType::Text);
                let type_name = self.array_type_name(element_type);
                debug_log!(
                    "[CONVERTER] Creating {} array of {} elements for {}",
                    type_name,
                    elements.len(),
                    descriptor.name
                );
                match context {
                    Some(context) => context.create_array(type_name, elements),
                    None => Ok(NativeValue::Array(NativeArray::new(type_name, elements))),
                }
            }
            Shape::Scalar | Shape::Wrapper(_) => {
                trace_log!("[CONVERTER] Passing {} through as opaque", descriptor.name);
                Ok(NativeValue::Opaque(value.clone()))
            }
        }
    }

    /// Absent and null slots both become native null
    pub fn to_slot(
        &self,
        slot: &Slot,
        context: Option<&dyn NativeContext>,
    ) -> Result<NativeValue, ConvertError> {
        match slot {
            Slot::Absent | Slot::Null => Ok(NativeValue::Null),
            Slot::Present(value) => self.to(value, context),
        }
    }

    pub fn to_native<T: Described>(&self, value: &T) -> Result<NativeValue, ConvertError> {
        self.to(&Value::new(value.clone()), None)
    }

    /// Convert a native value into a domain value of the `target` type
    pub fn from(&self, native: NativeValue, target: &TypeDescriptor) -> Result<Value, ConvertError> {
        if target.id == TypeId::of::<NativeValue>() {
            return Ok(Value::new(native));
        }
        let native = match native {
            NativeValue::Opaque(value) => return self.from_opaque(value, target),
            NativeValue::Null => {
                return target
                    .null_value()
                    .ok_or(ConvertError::UnexpectedNull { target: target.name });
            }
            other => other,
        };

        match self.registry.resolve(target) {
            Resolution::Entry(entry) => entry.from_native(native, target),
            Resolution::Unwrap(wrapper) => {
                let inner = self.from(native, &(wrapper.inner)())?;
                (wrapper.wrap)(inner)
            }
            Resolution::Unresolved => match target.shape {
                Shape::Optional(optional) => {
                    let inner = self.from(native, &(optional.inner)())?;
                    (optional.some)(inner)
                }
                Shape::Collection(collection) => {
                    let elements = match native {
                        NativeValue::Array(array) => array.into_elements(),
                        NativeValue::Json(serde_json::Value::Array(items)) => {
                            items.into_iter().map(NativeValue::from_json).collect()
                        }
                        other => return Err(other.mismatch(target.name)),
                    };
                    let element = (collection.element)();
                    let items = elements
                        .into_iter()
                        .map(|native| self.from(native, &element))
                        .collect::<Result<Vec<_>, _>>()?;
                    (collection.collect)(items)
                }
                Shape::Scalar | Shape::Wrapper(_) => Err(native.mismatch(target.name)),
            },
        }
    }

    fn from_opaque(&self, value: Value, target: &TypeDescriptor) -> Result<Value, ConvertError> {
        if value.type_id() == target.id {
            return Ok(value);
        }
        match target.shape {
            Shape::Optional(optional) => {
                let inner = self.from_opaque(value, &(optional.inner)())?;
                (optional.some)(inner)
            }
            _ => Err(ConvertError::mismatch(value.type_name(), target.name)),
        }
    }

    pub fn from_native<T: Described>(&self, native: NativeValue) -> Result<T, ConvertError> {
        self.from(native, &T::descriptor())?.downcast::<T>()
    }

    /// Convert a domain value of any type into the `target` type
    pub fn convert(&self, value: Value, target: &TypeDescriptor) -> Result<Value, ConvertError> {
        if value.type_id() == target.id {
            return Ok(value);
        }
        if let Shape::Optional(optional) = target.shape {
            if (optional.inner)().id == value.type_id() {
                return (optional.some)(value);
            }
        }
        let native = if value.is::<NativeValue>() {
            value.downcast::<NativeValue>()?
        } else {
            self.to(&value, None)?
        };
        self.from(native, target)
    }

    /// Convert a slot, keeping absent and null as they are
    pub fn convert_slot(&self, slot: Slot, target: &TypeDescriptor) -> Result<Slot, ConvertError> {
        let value = match slot {
            Slot::Present(value) => value,
            other => return Ok(other),
        };
        match Slot::from_value(value) {
            Slot::Present(value) if value.downcast_ref::<NativeValue>() == Some(&NativeValue::Null) => {
                Ok(Slot::Null)
            }
            Slot::Present(value) => Ok(Slot::Present(self.convert(value, target)?)),
            other => Ok(other),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(default_registry(), &ConversionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::descriptor::SingleField;
    use chrono::{DateTime, Month, NaiveDate, TimeZone, Utc, Weekday};
    use rust_decimal::Decimal;
    use std::collections::{BTreeSet, HashSet};
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq)]
    struct Email(String);

    impl Described for Email {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::wrapper::<Self>()
        }
    }

    impl SingleField for Email {
        type Inner = String;

        fn inner(&self) -> &String {
            &self.0
        }

        fn from_inner(inner: String) -> Result<Self, ConvertError> {
            if inner.contains('@') {
                Ok(Email(inner))
            } else {
                Err(ConvertError::user(format!("Invalid email: {}", inner)))
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Tsid(i64);

    impl Described for Tsid {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::wrapper::<Self>()
        }
    }

    impl SingleField for Tsid {
        type Inner = i64;

        fn inner(&self) -> &i64 {
            &self.0
        }

        fn from_inner(inner: i64) -> Result<Self, ConvertError> {
            Ok(Tsid(inner))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Described for Point {}

    fn array_of(native: NativeValue) -> NativeArray {
        match native {
            NativeValue::Array(array) => array,
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_string_collections_become_varchar_arrays() {
        let converter = Converter::default();
        let array = array_of(converter.to_native(&vec!["a".to_string(), "b".to_string()]).unwrap());
        assert_eq!(array.element_type(), "varchar");
        assert_eq!(array.elements(), &[NativeValue::from("a"), NativeValue::from("b")]);

        let days = array_of(converter.to_native(&vec![Weekday::Mon]).unwrap());
        assert_eq!(days.element_type(), "varchar");
        assert_eq!(days.elements(), &[NativeValue::from("Mon")]);
    }

    #[test]
    fn test_string_form_collections_from_text_arrays() {
        let converter = Converter::default();
        let months = || {
            NativeValue::Array(NativeArray::new(
                "varchar",
                vec![NativeValue::from("October"), NativeValue::from("December")],
            ))
        };

        let list: Vec<Month> = converter.from_native(months()).unwrap();
        assert_eq!(list, vec![Month::October, Month::December]);

        let set: BTreeSet<Month> = converter.from_native(months()).unwrap();
        assert_eq!(set, BTreeSet::from([Month::October, Month::December]));

        let native = converter.to_native(&vec![Weekday::Mon, Weekday::Fri]).unwrap();
        let days: Vec<Weekday> = converter.from_native(native).unwrap();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Fri]);
    }

    #[test]
    fn test_numeric_and_uuid_arrays() {
        let converter = Converter::default();
        let decimals = array_of(converter.to_native(&vec![Decimal::ONE]).unwrap());
        assert_eq!(decimals.element_type(), "numeric");

        let ids = array_of(converter.to_native(&HashSet::from([Uuid::nil()])).unwrap());
        assert_eq!(ids.element_type(), "uuid");
        assert_eq!(ids.elements(), &[NativeValue::Uuid(Uuid::nil())]);
    }

    #[test]
    fn test_wrapper_array_keeps_inner_elements() {
        let converter = Converter::default();
        let native = converter.to_native(&vec![Tsid(7), Tsid(9)]).unwrap();
        let array = array_of(native.clone());
        assert_eq!(array.element_type(), "numeric");
        assert_eq!(array.elements(), &[NativeValue::BigInt(7), NativeValue::BigInt(9)]);

        let back: Vec<Tsid> = converter.from_native(native).unwrap();
        assert_eq!(back, vec![Tsid(7), Tsid(9)]);
    }

    #[test]
    fn test_context_creates_arrays() {
        let converter = Converter::default();
        let context = |element_type: &str,
                       elements: Vec<NativeValue>|
         -> Result<NativeValue, ConvertError> {
            Ok(NativeValue::Text(format!("{}[{}]", element_type, elements.len())))
        };
        let native = converter
            .to(&Value::new(vec![1_i32, 2, 3]), Some(&context))
            .unwrap();
        assert_eq!(native, NativeValue::Text("numeric[3]".into()));
    }

    #[test]
    fn test_configured_array_type_names() {
        let config = ConversionConfig {
            text_array_type: "text".into(),
            ..ConversionConfig::default()
        };
        let converter = Converter::from_config(&config).unwrap();
        let array = array_of(converter.to_native(&vec!["x".to_string()]).unwrap());
        assert_eq!(array.element_type(), "text");
    }

    #[test]
    fn test_wrapper_round_trip_and_user_error() {
        let converter = Converter::default();
        let native = converter.to_native(&Email("a@b.c".into())).unwrap();
        assert_eq!(native, NativeValue::Text("a@b.c".into()));
        let email: Email = converter.from_native(native).unwrap();
        assert_eq!(email, Email("a@b.c".into()));

        let err = converter.from_native::<Email>("nope".into()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email: nope");
    }

    #[test]
    fn test_optional_and_null() {
        let converter = Converter::default();
        assert_eq!(converter.to_native(&None::<i32>).unwrap(), NativeValue::Null);
        assert_eq!(converter.to_native(&Some(3_i32)).unwrap(), NativeValue::Integer(3));
        assert_eq!(converter.from_native::<Option<i32>>(NativeValue::Null).unwrap(), None);
        assert_eq!(
            converter.from_native::<Option<i64>>(NativeValue::Integer(3)).unwrap(),
            Some(3)
        );
        let err = converter.from_native::<i32>(NativeValue::Null).unwrap_err();
        assert!(matches!(err, ConvertError::UnexpectedNull { .. }));
    }

    #[test]
    fn test_money_rounding() {
        let converter = Converter::default();
        let money: Money = converter
            .from_native(NativeValue::Numeric(Decimal::new(13456, 3)))
            .unwrap();
        assert_eq!(money.to_string(), "13.46");
    }

    #[test]
    fn test_unregistered_scalar_is_opaque() {
        let converter = Converter::default();
        let point = Point { x: 1, y: 2 };
        let native = converter.to_native(&point).unwrap();
        assert!(matches!(native, NativeValue::Opaque(_)));
        assert_eq!(converter.from_native::<Point>(native.clone()).unwrap(), point);
        assert_eq!(converter.from_native::<Option<Point>>(native).unwrap(), Some(point));

        let err = converter.from_native::<Point>(NativeValue::Integer(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Cannot convert int4 to {}", std::any::type_name::<Point>())
        );
    }

    #[test]
    fn test_collections_from_json_arrays() {
        let converter = Converter::default();
        let json = NativeValue::Json(serde_json::json!([1, 2, 2]));
        let set: BTreeSet<i32> = converter.from_native(json).unwrap();
        assert_eq!(set, BTreeSet::from([1, 2]));

        let err = converter
            .from_native::<[i32; 2]>(NativeValue::Array(NativeArray::new(
                "numeric",
                vec![NativeValue::Integer(1)],
            )))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Length { .. }));
    }

    #[test]
    fn test_convert_between_domain_types() {
        let converter = Converter::default();
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let ts = date.and_hms_milli_opt(0, 0, 0, 123).unwrap();

        let converted = converter
            .convert(Value::new(ts), &TypeDescriptor::of::<NaiveDate>())
            .unwrap();
        assert_eq!(converted, Value::new(date));

        let instant: DateTime<Utc> = Utc.timestamp_millis_opt(123).unwrap();
        let converted = converter
            .convert(Value::new(instant), &TypeDescriptor::of::<Option<DateTime<Utc>>>())
            .unwrap();
        assert_eq!(converted, Value::new(Some(instant)));

        let converted = converter
            .convert(Value::new(5_i32), &TypeDescriptor::of::<i64>())
            .unwrap();
        assert_eq!(converted, Value::new(5_i64));
    }

    #[test]
    fn test_convert_slot_keeps_absent_and_null() {
        let converter = Converter::default();
        let target = TypeDescriptor::of::<String>();
        assert_eq!(converter.convert_slot(Slot::Absent, &target).unwrap(), Slot::Absent);
        assert_eq!(converter.convert_slot(Slot::Null, &target).unwrap(), Slot::Null);
        assert_eq!(
            converter
                .convert_slot(Slot::Present(Value::new(NativeValue::Null)), &target)
                .unwrap(),
            Slot::Null
        );
        assert_eq!(
            converter
                .convert_slot(Slot::Present(Value::new(None::<String>)), &target)
                .unwrap(),
            Slot::Null
        );
    }
}
