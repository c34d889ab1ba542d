//! Integration tests for derived records
//!
//! Exercises the `Record` / `Wrapper` derives end to end through the
//! mapper: round trips, defaults, absent vs null, overrides and errors.

use rowhaus::prelude::*;
use rowhaus::type_mapping::chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Wrapper)]
pub struct Tsid(i64);

#[derive(Debug, Clone, PartialEq, Wrapper)]
#[wrapper(constructor = "Email::parse")]
pub struct Email {
    value: String,
}

impl Email {
    pub fn parse(value: String) -> Result<Self, String> {
        if value.contains('@') {
            Ok(Self { value })
        } else {
            Err(format!("invalid email: {}", value))
        }
    }
}

#[model]
pub struct Customer {
    pub id: Tsid,
    pub name: String,
    pub email: Option<Email>,
    #[record(default)]
    pub friends: Vec<Tsid>,
    pub balance: Money,
    pub external_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[model]
pub struct Profile {
    pub name: String,
    #[record(default = "Some(\"anon\".to_string())")]
    pub nickname: Option<String>,
    pub bio: Option<String>,
}

#[model]
#[record(constructor = "Range::checked")]
pub struct Range {
    pub low: i32,
    pub high: i32,
}

impl Range {
    fn checked(low: i32, high: i32) -> Result<Self, String> {
        if low > high {
            return Err(format!("{} is above {}", low, high));
        }
        Ok(Self { low, high })
    }
}

#[model]
pub struct Session {
    pub user: String,
    token: String,
    #[record(skip)]
    pub hits: u32,
    #[record(rename = "type")]
    pub kind: String,
}

impl Session {
    fn token(&self) -> &str {
        &self.token
    }
}

fn customer() -> Customer {
    Customer {
        id: Tsid(1001),
        name: "Ada".to_string(),
        email: Some(Email {
            value: "ada@example.com".to_string(),
        }),
        friends: vec![Tsid(7), Tsid(8)],
        balance: Money::new("12.5".parse().unwrap()),
        external_id: Uuid::from_u128(0x1234),
        joined_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
    }
}

#[test]
fn test_round_trip_through_values() {
    let rowhaus = RowHaus::new(AppConfig::default()).unwrap();
    let mapper = rowhaus.mapper();

    let values = mapper.to_values(&customer()).unwrap();
    let keys: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "name", "email", "friends", "balance", "external_id", "joined_at"]
    );
    assert_eq!(mapper.create_from::<Customer>(values).unwrap(), customer());
}

#[test]
fn test_round_trip_through_native_values() {
    let rowhaus = RowHaus::new(AppConfig::default()).unwrap();
    let natives = rowhaus.to_row(&customer()).unwrap();

    assert_eq!(natives["id"], NativeValue::BigInt(1001));
    assert_eq!(natives["email"], NativeValue::Text("ada@example.com".into()));
    match &natives["friends"] {
        NativeValue::Array(array) => {
            assert_eq!(array.element_type(), "numeric");
            assert_eq!(
                array.elements(),
                &[NativeValue::BigInt(7), NativeValue::BigInt(8)]
            );
        }
        other => panic!("expected array, got {:?}", other),
    }

    let values: ValueMap = natives
        .into_iter()
        .map(|(name, native)| (name, Slot::of(native)))
        .collect();
    let created: Customer = rowhaus.mapper().create_from(values).unwrap();
    assert_eq!(created, customer());
}

#[test]
fn test_round_trip_through_json() {
    let mapper = Mapper::default();
    let json = mapper.to_json(&customer()).unwrap();
    assert_eq!(json["balance"], "12.50");
    assert_eq!(json["friends"], serde_json::json!([7, 8]));
    assert_eq!(mapper.from_json::<Customer>(json).unwrap(), customer());
}

#[test]
fn test_absent_and_null_are_distinct() {
    let mapper = Mapper::default();

    let absent: Profile = mapper.create_from(value_map! { "name" => "Ada" }).unwrap();
    assert_eq!(absent.nickname.as_deref(), Some("anon"));
    assert_eq!(absent.bio, None);

    let null: Profile = mapper
        .create_from(value_map! { "name" => "Ada", "nickname" => Slot::Null })
        .unwrap();
    assert_eq!(null.nickname, None);
}

#[test]
fn test_missing_parameter_is_reported() {
    let mapper = Mapper::default();
    let err = mapper
        .create_from::<Profile>(value_map! { "nickname" => "x" })
        .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Cannot create Profile from {"));
    assert!(message.ends_with("missing name"));

    let err = mapper
        .create_from::<Customer>(value_map! { "name" => Slot::Null })
        .unwrap_err();
    match err {
        MapperError::Construction { missing, .. } => assert_eq!(
            missing,
            vec!["id", "name", "balance", "external_id", "joined_at"]
        ),
        other => panic!("expected construction error, got {}", other),
    }
}

#[test]
fn test_overrides_and_skip() {
    let mapper = Mapper::default();
    let values = mapper
        .to_values_with(
            &customer(),
            value_map! { "name" => "Override", "audit" => true },
            &["email", "friends"],
        )
        .unwrap();
    let keys: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "balance", "external_id", "joined_at", "name", "audit"]
    );
    assert_eq!(values["name"].get::<String>().map(String::as_str), Some("Override"));
}

#[test]
fn test_decimal_values_are_rounded() {
    let mapper = Mapper::default();
    let mut values = mapper.to_values(&customer()).unwrap();
    values.insert("balance".to_string(), Slot::of("13.456".to_string()));
    let created: Customer = mapper.create_from(values).unwrap();
    assert_eq!(created.balance.to_string(), "13.46");
}

#[test]
fn test_wrapper_constructor_errors_propagate() {
    let mapper = Mapper::default();
    let mut values = mapper.to_values(&customer()).unwrap();
    values.insert("email".to_string(), Slot::of("nope".to_string()));
    let err = mapper.create_from::<Customer>(values).unwrap_err();
    assert!(matches!(err, MapperError::Parameter { ref parameter, .. } if parameter == "email"));
    assert!(err.to_string().contains("invalid email: nope"));
}

#[test]
fn test_record_constructor_validates() {
    let mapper = Mapper::default();
    let range: Range = mapper
        .create_from(value_map! { "low" => 1_i32, "high" => 3_i64 })
        .unwrap();
    assert_eq!(range, Range { low: 1, high: 3 });

    let err = mapper
        .create_from::<Range>(value_map! { "low" => 5_i32, "high" => 3_i32 })
        .unwrap_err();
    assert_eq!(err.to_string(), "5 is above 3");
}

#[test]
fn test_private_skipped_and_renamed_fields() {
    let mapper = Mapper::default();
    let session: Session = mapper
        .create_from(value_map! { "user" => "ada", "token" => "secret", "type" => "web" })
        .unwrap();
    assert_eq!(session.token(), "secret");
    assert_eq!(session.hits, 0);
    assert_eq!(session.kind, "web");

    let values = mapper.to_values(&session).unwrap();
    let keys: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["user", "type"]);

    // the private token is a parameter but cannot be read back
    assert!(mapper.create_from::<Session>(values).is_err());
}

#[test]
fn test_metadata_is_cached_per_type() {
    let mapper = Mapper::default();
    let first = mapper.metadata::<Customer>().unwrap();
    let second = mapper.metadata::<Customer>().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    mapper.metadata::<Profile>().unwrap();
    assert_eq!(mapper.cache().len(), 2);
    assert_eq!(first.field_names().len(), 7);
}
