//! Default conversion catalogue

use crate::descriptor::Described;
use crate::errors::ConvertError;
use crate::native::NativeValue;
use crate::registry::{ConversionEntry, ConverterRegistry};
use crate::sql::ElementType;
use chrono::{
    DateTime, FixedOffset, Month, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday,
};
use rust_decimal::Decimal;
use std::any::type_name;
use uuid::Uuid;

fn add<T, F, G>(registry: &mut ConverterRegistry, array_type: ElementType, to: F, from: G)
where
    T: Described,
    F: Fn(&T) -> Result<NativeValue, ConvertError> + Send + Sync + 'static,
    G: Fn(NativeValue) -> Result<T, ConvertError> + Send + Sync + 'static,
{
    registry.insert::<T>(ConversionEntry::new(to, from).with_array_type(array_type));
}

macro_rules! integer_entry {
    ($registry:expr, $ty:ty => $variant:ident($native:ty)) => {
        add::<$ty, _, _>(
            $registry,
            ElementType::Numeric,
            |value| Ok(NativeValue::$variant(<$native>::from(*value))),
            |native| {
                let wide = native.to_integer(type_name::<$ty>())?;
                <$ty>::try_from(wide)
                    .map_err(|_| ConvertError::out_of_range(wide, type_name::<$ty>()))
            },
        )
    };
}

pub(crate) fn install(registry: &mut ConverterRegistry, anchor: FixedOffset) {
    integer_entry!(registry, i8 => SmallInt(i16));
    integer_entry!(registry, u8 => SmallInt(i16));
    integer_entry!(registry, i16 => SmallInt(i16));
    integer_entry!(registry, u16 => Integer(i32));
    integer_entry!(registry, i32 => Integer(i32));
    integer_entry!(registry, u32 => BigInt(i64));
    integer_entry!(registry, i64 => BigInt(i64));
    integer_entry!(registry, u64 => Numeric(Decimal));

    add::<f32, _, _>(
        registry,
        ElementType::Numeric,
        |value| Ok(NativeValue::Real(*value)),
        |native| match native {
            NativeValue::Real(v) => Ok(v),
            other => other.to_float("f32").map(|v| v as f32),
        },
    );
    add::<f64, _, _>(
        registry,
        ElementType::Numeric,
        |value| Ok(NativeValue::Double(*value)),
        |native| native.to_float("f64"),
    );
    add::<bool, _, _>(
        registry,
        ElementType::Boolean,
        |value| Ok(NativeValue::Boolean(*value)),
        |native| match native {
            NativeValue::Boolean(v) => Ok(v),
            NativeValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "1" => Ok(true),
                "false" | "f" | "no" | "0" => Ok(false),
                _ => Err(ConvertError::parse(text.as_str(), "bool", "expected a boolean literal")),
            },
            other if other.is_numeric() => Ok(other.to_integer("bool")? != 0),
            other => Err(other.mismatch("bool")),
        },
    );
    add::<char, _, _>(
        registry,
        ElementType::Text,
        |value| Ok(NativeValue::Text(value.to_string())),
        |native| match native {
            NativeValue::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConvertError::parse(text.as_str(), "char", "expected exactly one character")),
                }
            }
            other => Err(other.mismatch("char")),
        },
    );
    add::<String, _, _>(
        registry,
        ElementType::Text,
        |value| Ok(NativeValue::Text(value.clone())),
        |native| match native {
            NativeValue::Text(text) => Ok(text),
            other => Err(other.mismatch("String")),
        },
    );
    add::<Vec<u8>, _, _>(
        registry,
        ElementType::Bytes,
        |value| Ok(NativeValue::Bytes(value.clone())),
        |native| match native {
            NativeValue::Bytes(bytes) => Ok(bytes),
            other => Err(other.mismatch("Vec<u8>")),
        },
    );

    add::<Decimal, _, _>(
        registry,
        ElementType::Numeric,
        |value| Ok(NativeValue::Numeric(*value)),
        |native| native.to_decimal("Decimal"),
    );
    registry.register_fixed_decimal::<2>();

    add::<Uuid, _, _>(
        registry,
        ElementType::Uuid,
        |value| Ok(NativeValue::Uuid(*value)),
        |native| match native {
            NativeValue::Uuid(id) => Ok(id),
            NativeValue::Text(text) => Uuid::parse_str(text.trim())
                .map_err(|e| ConvertError::parse(text.as_str(), "Uuid", e)),
            NativeValue::Bytes(bytes) => {
                Uuid::from_slice(&bytes).map_err(|e| ConvertError::parse(format!("{:?}", bytes), "Uuid", e))
            }
            other => Err(other.mismatch("Uuid")),
        },
    );

    install_temporal(registry, anchor);

    add::<Month, _, _>(
        registry,
        ElementType::Text,
        |value| Ok(NativeValue::Text(value.name().to_string())),
        |native| match native {
            NativeValue::Text(text) => text
                .trim()
                .parse::<Month>()
                .map_err(|e| ConvertError::parse(text.as_str(), "Month", format!("{:?}", e))),
            other if other.is_numeric() => {
                let number = other.to_integer("Month")?;
                u8::try_from(number)
                    .ok()
                    .and_then(|n| Month::try_from(n).ok())
                    .ok_or_else(|| ConvertError::out_of_range(number, "Month"))
            }
            other => Err(other.mismatch("Month")),
        },
    );
    registry.register_string_form::<Weekday>();

    add::<serde_json::Value, _, _>(
        registry,
        ElementType::Json,
        |value| Ok(NativeValue::Json(value.clone())),
        |native| match native {
            NativeValue::Json(json) => Ok(json),
            NativeValue::Text(text) => {
                serde_json::from_str(&text).map_err(|e| ConvertError::Json(e.to_string()))
            }
            other => Err(other.mismatch("serde_json::Value")),
        },
    );

    registry.insert::<NativeValue>(ConversionEntry::new(
        |value: &NativeValue| Ok(value.clone()),
        |native: NativeValue| Ok(native),
    ));
}

fn install_temporal(registry: &mut ConverterRegistry, anchor: FixedOffset) {
    add::<NaiveDate, _, _>(
        registry,
        ElementType::Date,
        |value| Ok(NativeValue::Date(*value)),
        |native| match native {
            NativeValue::Date(date) => Ok(date),
            NativeValue::Timestamp(ts) => Ok(ts.date()),
            NativeValue::TimestampTz(ts) => Ok(ts.date_naive()),
            NativeValue::Text(text) => text
                .trim()
                .parse::<NaiveDate>()
                .map_err(|e| ConvertError::parse(text.as_str(), "NaiveDate", e)),
            other => Err(other.mismatch("NaiveDate")),
        },
    );
    add::<NaiveTime, _, _>(
        registry,
        ElementType::Time,
        |value| Ok(NativeValue::Time(*value)),
        |native| match native {
            NativeValue::Time(time) => Ok(time),
            NativeValue::Timestamp(ts) => Ok(ts.time()),
            NativeValue::Text(text) => text
                .trim()
                .parse::<NaiveTime>()
                .map_err(|e| ConvertError::parse(text.as_str(), "NaiveTime", e)),
            other => Err(other.mismatch("NaiveTime")),
        },
    );
    add::<NaiveDateTime, _, _>(
        registry,
        ElementType::Timestamp,
        |value| Ok(NativeValue::Timestamp(*value)),
        |native| match native {
            NativeValue::Timestamp(ts) => Ok(ts),
            NativeValue::TimestampTz(ts) => Ok(ts.naive_local()),
            NativeValue::Date(date) => Ok(date.and_time(NaiveTime::MIN)),
            NativeValue::Text(text) => text
                .trim()
                .parse::<NaiveDateTime>()
                .map_err(|e| ConvertError::parse(text.as_str(), "NaiveDateTime", e)),
            other => Err(other.mismatch("NaiveDateTime")),
        },
    );
    add::<DateTime<FixedOffset>, _, _>(
        registry,
        ElementType::TimestampTz,
        |value| Ok(NativeValue::TimestampTz(*value)),
        |native| match native {
            NativeValue::TimestampTz(ts) => Ok(ts),
            NativeValue::Timestamp(ts) => Ok(ts.and_utc().fixed_offset()),
            NativeValue::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map_err(|e| ConvertError::parse(text.as_str(), "DateTime<FixedOffset>", e)),
            other => Err(other.mismatch("DateTime<FixedOffset>")),
        },
    );
    // Instants are written in the configured zone and read back as absolute points in time
    add::<DateTime<Utc>, _, _>(
        registry,
        ElementType::TimestampTz,
        move |value| Ok(NativeValue::TimestampTz(value.with_timezone(&anchor))),
        |native| match native {
            NativeValue::TimestampTz(ts) => Ok(ts.with_timezone(&Utc)),
            NativeValue::Timestamp(ts) => Ok(ts.and_utc()),
            NativeValue::BigInt(millis) => DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| ConvertError::out_of_range(millis, "DateTime<Utc>")),
            NativeValue::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| ConvertError::parse(text.as_str(), "DateTime<Utc>", e)),
            other => Err(other.mismatch("DateTime<Utc>")),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::value::Value;
    use chrono::{Offset, TimeZone};
    use std::any::TypeId;

    fn registry() -> ConverterRegistry {
        ConverterRegistry::with_anchor(Utc.fix())
    }

    fn read<T: Described>(registry: &ConverterRegistry, native: NativeValue) -> Result<T, ConvertError> {
        registry
            .lookup(TypeId::of::<T>())
            .expect("entry registered")
            .from_native(native, &TypeDescriptor::of::<T>())?
            .downcast::<T>()
    }

    fn write<T: Described>(registry: &ConverterRegistry, value: T) -> NativeValue {
        registry
            .lookup(TypeId::of::<T>())
            .expect("entry registered")
            .to_native(&Value::new(value))
            .unwrap()
    }

    #[test]
    fn test_integer_narrowing_is_range_checked() {
        let registry = registry();
        assert_eq!(read::<i16>(&registry, NativeValue::BigInt(300)).unwrap(), 300);
        let err = read::<i8>(&registry, NativeValue::BigInt(300)).unwrap_err();
        assert!(matches!(err, ConvertError::OutOfRange { .. }));
        assert_eq!(read::<u64>(&registry, NativeValue::Text("42".into())).unwrap(), 42);
        assert_eq!(write(&registry, u64::MAX), NativeValue::Numeric(Decimal::from(u64::MAX)));
    }

    #[test]
    fn test_boolean_and_char_forms() {
        let registry = registry();
        assert!(read::<bool>(&registry, NativeValue::Text("t".into())).unwrap());
        assert!(!read::<bool>(&registry, NativeValue::Integer(0)).unwrap());
        assert_eq!(read::<char>(&registry, NativeValue::Text("x".into())).unwrap(), 'x');
        assert!(read::<char>(&registry, NativeValue::Text("xy".into())).is_err());
    }

    #[test]
    fn test_dates_from_timestamps_and_text() {
        let registry = registry();
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let ts = date.and_hms_milli_opt(0, 0, 0, 123).unwrap();
        assert_eq!(read::<NaiveDate>(&registry, NativeValue::Timestamp(ts)).unwrap(), date);
        assert_eq!(read::<NaiveDate>(&registry, "1970-01-01".into()).unwrap(), date);
        assert_eq!(
            read::<NaiveDateTime>(&registry, NativeValue::Date(date)).unwrap(),
            date.and_time(NaiveTime::MIN)
        );
    }

    #[test]
    fn test_instant_anchoring() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let utc = write(&registry(), instant);
        match utc {
            NativeValue::TimestampTz(ts) => {
                assert_eq!(ts.offset().local_minus_utc(), 0);
                assert_eq!(ts.with_timezone(&Utc), instant);
            }
            other => panic!("Expected timestamptz, got {:?}", other),
        }

        let shifted = ConverterRegistry::with_anchor(FixedOffset::east_opt(3 * 3600).unwrap());
        match write(&shifted, instant) {
            NativeValue::TimestampTz(ts) => {
                assert_eq!(ts.offset().local_minus_utc(), 3 * 3600);
                assert_eq!(ts.with_timezone(&Utc), instant);
            }
            other => panic!("Expected timestamptz, got {:?}", other),
        }
    }

    #[test]
    fn test_instant_from_epoch_millis() {
        let read_back = read::<DateTime<Utc>>(&registry(), NativeValue::BigInt(123)).unwrap();
        assert_eq!(read_back.timestamp_millis(), 123);
    }

    #[test]
    fn test_month_forms() {
        let registry = registry();
        assert_eq!(write(&registry, Month::March), NativeValue::Text("March".into()));
        assert_eq!(read::<Month>(&registry, "March".into()).unwrap(), Month::March);
        assert_eq!(read::<Month>(&registry, NativeValue::Integer(12)).unwrap(), Month::December);
        assert!(read::<Month>(&registry, NativeValue::Integer(13)).is_err());
    }

    #[test]
    fn test_uuid_from_text() {
        let id = Uuid::new_v4();
        assert_eq!(read::<Uuid>(&registry(), NativeValue::Text(id.to_string())).unwrap(), id);
    }
}
