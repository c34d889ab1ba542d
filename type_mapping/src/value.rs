//! Type-erased domain values
//!
//! Values exchanged between the mapper and its callers are boxed behind
//! [`DynValue`] together with the [`TypeDescriptor`] of their concrete type.

use crate::descriptor::{Described, Shape, TypeDescriptor};
use crate::errors::ConvertError;
use std::any::{Any, TypeId};
use std::fmt;

/// Object-safe view of a concrete domain value
pub trait DynValue: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_boxed(&self) -> Box<dyn DynValue>;
    fn eq_dyn(&self, other: &dyn Any) -> bool;
    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T> DynValue for T
where
    T: Any + Send + Sync + Clone + PartialEq + fmt::Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_boxed(&self) -> Box<dyn DynValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A domain value of any [`Described`] type
pub struct Value {
    inner: Box<dyn DynValue>,
    descriptor: TypeDescriptor,
}

impl Value {
    pub fn new<T: Described>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            descriptor: T::descriptor(),
        }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn type_id(&self) -> TypeId {
        self.descriptor.id
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Take the concrete value out, failing with a mismatch naming both types
    pub fn downcast<T: Any>(self) -> Result<T, ConvertError> {
        let from_kind = self.descriptor.name;
        self.inner
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ConvertError::mismatch(from_kind, std::any::type_name::<T>()))
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            descriptor: self.descriptor,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_dyn(other.inner.as_any())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_dyn(f)
    }
}

/// Three-state input value: not supplied, explicitly null, or present
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    #[default]
    Absent,
    Null,
    Present(Value),
}

impl Slot {
    /// Build a slot from a concrete value, mapping `None` to `Null`
    pub fn of<T: Described>(value: T) -> Self {
        Slot::from_value(Value::new(value))
    }

    /// Optional values are flattened: `None` becomes `Null`, `Some(x)` becomes `x`
    pub fn from_value(value: Value) -> Self {
        match value.descriptor().shape {
            Shape::Optional(optional) => match (optional.unwrap)(&value) {
                Some(inner) => Slot::from_value(inner),
                None => Slot::Null,
            },
            _ => Slot::Present(value),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Null)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Slot::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the present value as `T`
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.as_value().and_then(Value::downcast_ref::<T>)
    }
}

/// Anything that can be placed into a value map
pub trait IntoSlot {
    fn into_slot(self) -> Slot;
}

impl<T: Described> IntoSlot for T {
    fn into_slot(self) -> Slot {
        Slot::of(self)
    }
}

impl IntoSlot for &str {
    fn into_slot(self) -> Slot {
        Slot::of(self.to_string())
    }
}

impl IntoSlot for Value {
    fn into_slot(self) -> Slot {
        Slot::from_value(self)
    }
}

impl IntoSlot for Slot {
    fn into_slot(self) -> Slot {
        self
    }
}
