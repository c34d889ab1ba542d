//! Type descriptors
//!
//! A [`TypeDescriptor`] is the registration-time replacement for runtime type
//! introspection: a stable type identifier, a readable name and the shape of
//! the type (scalar, optional, collection or single-field wrapper), with the
//! monomorphised functions needed to take values of that shape apart and put
//! them back together.

use crate::errors::ConvertError;
use crate::native::NativeValue;
use crate::value::Value;
use chrono::{DateTime, FixedOffset, Month, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// Types that can travel through the converter.
///
/// Scalar types only need an empty impl; generic containers and
/// wrappers describe their shape.
pub trait Described: Any + Send + Sync + Clone + PartialEq + fmt::Debug {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::scalar::<Self>()
    }
}

/// A type that exists purely to hold one underlying value with a distinct domain meaning
pub trait SingleField: Described {
    type Inner: Described;

    fn inner(&self) -> &Self::Inner;

    fn from_inner(inner: Self::Inner) -> Result<Self, ConvertError>;
}

#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub name: &'static str,
    pub shape: Shape,
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Scalar,
    Optional(OptionalShape),
    Collection(CollectionShape),
    Wrapper(WrapperShape),
}

#[derive(Clone, Copy)]
pub struct OptionalShape {
    pub inner: fn() -> TypeDescriptor,
    /// `None` when the optional holds no value
    pub unwrap: fn(&Value) -> Option<Value>,
    pub some: fn(Value) -> Result<Value, ConvertError>,
    pub none: fn() -> Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Deque,
    Set,
    OrderedSet,
    Array(usize),
}

#[derive(Clone, Copy)]
pub struct CollectionShape {
    pub kind: CollectionKind,
    pub element: fn() -> TypeDescriptor,
    pub items: fn(&Value) -> Option<Vec<Value>>,
    pub collect: fn(Vec<Value>) -> Result<Value, ConvertError>,
}

#[derive(Clone, Copy)]
pub struct WrapperShape {
    pub inner: fn() -> TypeDescriptor,
    pub unwrap: fn(&Value) -> Option<Value>,
    pub wrap: fn(Value) -> Result<Value, ConvertError>,
}

impl TypeDescriptor {
    pub fn of<T: Described>() -> Self {
        T::descriptor()
    }

    pub fn scalar<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape: Shape::Scalar,
        }
    }

    pub fn optional<T: Described>() -> Self {
        Self {
            id: TypeId::of::<Option<T>>(),
            name: type_name::<Option<T>>(),
            shape: Shape::Optional(OptionalShape {
                inner: T::descriptor,
                unwrap: unwrap_optional::<T>,
                some: wrap_some::<T>,
                none: none_value::<T>,
            }),
        }
    }

    pub fn collection<C, T>(kind: CollectionKind) -> Self
    where
        C: Described + FromIterator<T>,
        T: Described,
        for<'a> &'a C: IntoIterator<Item = &'a T>,
    {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
            shape: Shape::Collection(CollectionShape {
                kind,
                element: T::descriptor,
                items: collection_items::<C, T>,
                collect: collect_items::<C, T>,
            }),
        }
    }

    pub fn array<T: Described, const N: usize>() -> Self {
        Self {
            id: TypeId::of::<[T; N]>(),
            name: type_name::<[T; N]>(),
            shape: Shape::Collection(CollectionShape {
                kind: CollectionKind::Array(N),
                element: T::descriptor,
                items: collection_items::<[T; N], T>,
                collect: collect_array::<T, N>,
            }),
        }
    }

    pub fn wrapper<W: SingleField>() -> Self {
        Self {
            id: TypeId::of::<W>(),
            name: type_name::<W>(),
            shape: Shape::Wrapper(WrapperShape {
                inner: <W::Inner as Described>::descriptor,
                unwrap: unwrap_field::<W>,
                wrap: wrap_field::<W>,
            }),
        }
    }

    /// Nullable types are exactly the optional ones
    pub fn is_nullable(&self) -> bool {
        matches!(self.shape, Shape::Optional(_))
    }

    /// The `None` value of an optional type
    pub fn null_value(&self) -> Option<Value> {
        match self.shape {
            Shape::Optional(optional) => Some((optional.none)()),
            _ => None,
        }
    }

    /// Strip any number of `Option` layers
    pub fn non_null(&self) -> TypeDescriptor {
        match self.shape {
            Shape::Optional(optional) => (optional.inner)().non_null(),
            _ => *self,
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Debug for OptionalShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Optional").field(&(self.inner)()).finish()
    }
}

impl fmt::Debug for CollectionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &self.kind)
            .field("element", &(self.element)())
            .finish()
    }
}

impl fmt::Debug for WrapperShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Wrapper").field(&(self.inner)()).finish()
    }
}

fn unwrap_optional<T: Described>(value: &Value) -> Option<Value> {
    value
        .downcast_ref::<Option<T>>()
        .and_then(Option::as_ref)
        .map(|inner| Value::new(inner.clone()))
}

fn wrap_some<T: Described>(value: Value) -> Result<Value, ConvertError> {
    value.downcast::<T>().map(|inner| Value::new(Some(inner)))
}

fn none_value<T: Described>() -> Value {
    Value::new(None::<T>)
}

fn collection_items<C, T>(value: &Value) -> Option<Vec<Value>>
where
    C: Described,
    T: Described,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    value
        .downcast_ref::<C>()
        .map(|items| items.into_iter().cloned().map(Value::new).collect())
}

fn collect_items<C, T>(items: Vec<Value>) -> Result<Value, ConvertError>
where
    C: Described + FromIterator<T>,
    T: Described,
{
    items
        .into_iter()
        .map(Value::downcast::<T>)
        .collect::<Result<C, _>>()
        .map(Value::new)
}

fn collect_array<T: Described, const N: usize>(items: Vec<Value>) -> Result<Value, ConvertError> {
    let actual = items.len();
    let elements = items
        .into_iter()
        .map(Value::downcast::<T>)
        .collect::<Result<Vec<T>, _>>()?;
    let array: [T; N] = elements.try_into().map_err(|_| ConvertError::Length {
        target: type_name::<[T; N]>(),
        expected: N,
        actual,
    })?;
    Ok(Value::new(array))
}

fn unwrap_field<W: SingleField>(value: &Value) -> Option<Value> {
    value
        .downcast_ref::<W>()
        .map(|wrapper| Value::new(wrapper.inner().clone()))
}

fn wrap_field<W: SingleField>(value: Value) -> Result<Value, ConvertError> {
    W::from_inner(value.downcast::<W::Inner>()?).map(Value::new)
}

macro_rules! scalar_described {
    ($($ty:ty),* $(,)?) => {
        $(impl Described for $ty {})*
    };
}

scalar_described!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    char,
    String,
    Decimal,
    Uuid,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    DateTime<FixedOffset>,
    Month,
    Weekday,
    serde_json::Value,
    NativeValue,
);

impl<T: Described> Described for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional::<T>()
    }
}

impl<T: Described> Described for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection::<Vec<T>, T>(CollectionKind::List)
    }
}

impl<T: Described> Described for VecDeque<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection::<VecDeque<T>, T>(CollectionKind::Deque)
    }
}

impl<T: Described + Eq + Hash> Described for HashSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection::<HashSet<T>, T>(CollectionKind::Set)
    }
}

impl<T: Described + Ord> Described for BTreeSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection::<BTreeSet<T>, T>(CollectionKind::OrderedSet)
    }
}

impl<T: Described, const N: usize> Described for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array::<T, N>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
            Ok(Email(inner))
        }
    }

    #[test]
    fn test_optional_shape() {
        let descriptor = TypeDescriptor::of::<Option<i32>>();
        assert!(descriptor.is_nullable());
        assert_eq!(descriptor.non_null(), TypeDescriptor::of::<i32>());
        assert_eq!(descriptor.null_value(), Some(Value::new(None::<i32>)));
        assert!(TypeDescriptor::of::<i32>().null_value().is_none());
    }

    #[test]
    fn test_collection_shape_round_trip() {
        let Shape::Collection(shape) = TypeDescriptor::of::<BTreeSet<i32>>().shape else {
            panic!("Expected collection shape");
        };
        assert_eq!(shape.kind, CollectionKind::OrderedSet);
        let items = (shape.items)(&Value::new(BTreeSet::from([3, 1, 2]))).unwrap();
        assert_eq!(items, vec![Value::new(1), Value::new(2), Value::new(3)]);
        let rebuilt = (shape.collect)(items).unwrap();
        assert_eq!(rebuilt, Value::new(BTreeSet::from([1, 2, 3])));
    }

    #[test]
    fn test_fixed_array_length_is_checked() {
        let Shape::Collection(shape) = TypeDescriptor::of::<[i64; 2]>().shape else {
            panic!("Expected collection shape");
        };
        assert_eq!(shape.kind, CollectionKind::Array(2));
        let err = (shape.collect)(vec![Value::new(1_i64)]).unwrap_err();
        assert!(matches!(err, ConvertError::Length { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_wrapper_shape() {
        let Shape::Wrapper(shape) = TypeDescriptor::of::<Email>().shape else {
            panic!("Expected wrapper shape");
        };
        let email = Value::new(Email("a@b.c".into()));
        let inner = (shape.unwrap)(&email).unwrap();
        assert_eq!(inner, Value::new("a@b.c".to_string()));
        assert_eq!((shape.wrap)(inner).unwrap(), email);
        assert_eq!((shape.inner)(), TypeDescriptor::of::<String>());
    }
}
