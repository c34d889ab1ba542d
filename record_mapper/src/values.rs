//! Value maps
//!
//! The flat, insertion-ordered field name to value representation of a record.

use indexmap::IndexMap;
use type_mapping::Slot;

pub type ValueMap = IndexMap<String, Slot>;

/// Build a [`ValueMap`] from `name => value` pairs
///
/// Values may be anything implementing [`type_mapping::IntoSlot`]:
/// plain values, `Option`s (where `None` is an explicit null) or slots.
///
/// ```
/// use record_mapper::value_map;
/// use record_mapper::type_mapping::Slot;
///
/// let values = value_map! {
///     "hello" => "World",
///     "world" => 42,
///     "nullable" => None::<String>,
/// };
/// assert_eq!(values["nullable"], Slot::Null);
/// ```
#[macro_export]
macro_rules! value_map {
    () => {
        $crate::values::ValueMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::values::ValueMap::new();
        $(
            map.insert(
                ::std::string::String::from($name),
                $crate::type_mapping::IntoSlot::into_slot($value),
            );
        )+
        map
    }};
}
