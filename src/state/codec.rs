//! Encode/decode contract between typed Rust values and [`Value`].
//!
//! Every implementation round-trips exactly: `T::from_value(&v.into_value()) == Some(v)`.
//! Arrays of scalars map to the dedicated typed array variants; arrays of anything else map
//! to [`Value::List`].

use crate::state::bundle::{Bundle, SparseArray};
use crate::state::parcel::Parcelable;
use crate::state::value::Value;

/// Values that can be stored in a [`Bundle`].
pub trait StateValue: Sized {
    /// Encode into a [`Value`].
    fn into_value(self) -> Value;

    /// Decode from a [`Value`]. `None` when the variant does not match.
    fn from_value(value: &Value) -> Option<Self>;

    /// Encode a whole array. Scalars override this to pick their typed array variant.
    fn array_into_value(items: Vec<Self>) -> Value {
        Value::List(items.into_iter().map(Self::into_value).collect())
    }

    /// Decode a whole array.
    fn array_from_value(value: &Value) -> Option<Vec<Self>> {
        match value {
            Value::List(items) => items.iter().map(Self::from_value).collect(),
            _ => None,
        }
    }
}

macro_rules! scalar_state_value {
    ($ty:ty, $scalar:ident, $array:ident) => {
        impl StateValue for $ty {
            fn into_value(self) -> Value {
                Value::$scalar(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$scalar(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn array_into_value(items: Vec<Self>) -> Value {
                Value::$array(items)
            }

            fn array_from_value(value: &Value) -> Option<Vec<Self>> {
                match value {
                    Value::$array(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

scalar_state_value!(bool, Bool, BoolArray);
scalar_state_value!(u8, Byte, ByteArray);
scalar_state_value!(i16, Short, ShortArray);
scalar_state_value!(char, Char, CharArray);
scalar_state_value!(i32, Int, IntArray);
scalar_state_value!(i64, Long, LongArray);
scalar_state_value!(f32, Float, FloatArray);
scalar_state_value!(f64, Double, DoubleArray);
scalar_state_value!(String, String, StringArray);

/// Stored as a char sequence rather than a string.
impl StateValue for Box<str> {
    fn into_value(self) -> Value {
        Value::CharSequence(self.into_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::CharSequence(s) => Some(s.as_str().into()),
            _ => None,
        }
    }

    fn array_into_value(items: Vec<Self>) -> Value {
        Value::CharSequenceArray(items.into_iter().map(str::into_string).collect())
    }

    fn array_from_value(value: &Value) -> Option<Vec<Self>> {
        match value {
            Value::CharSequenceArray(v) => Some(v.iter().map(|s| s.as_str().into()).collect()),
            _ => None,
        }
    }
}

impl StateValue for Value {
    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl StateValue for Bundle {
    fn into_value(self) -> Value {
        Value::Bundle(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bundle(b) => Some(b.clone()),
            _ => None,
        }
    }
}

impl<T: StateValue> StateValue for Vec<T> {
    fn into_value(self) -> Value {
        T::array_into_value(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        T::array_from_value(value)
    }
}

impl<T: StateValue> StateValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, T::into_value)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: StateValue> StateValue for SparseArray<T> {
    fn into_value(self) -> Value {
        Value::Sparse(
            self.into_iter()
                .map(|(k, v)| (k, v.into_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Sparse(items) => items
                .iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

/// Custom value persisted through serde.
///
/// A value whose `Serialize` impl fails is stored as [`Value::Null`] and logged; use
/// [`Bundle::put_serializable`] when the failure must surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Serialized<T>(pub T);

impl<T> StateValue for Serialized<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    fn into_value(self) -> Value {
        match serde_json::to_value(&self.0) {
            Ok(json) => Value::Serialized(json),
            Err(err) => {
                tracing::warn!(error = %err, "serialized state value dropped");
                Value::Null
            }
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Serialized(json) => T::deserialize(json).ok().map(Serialized),
            _ => None,
        }
    }
}

/// Custom structured value persisted as a [`Parcel`](crate::Parcel).
#[derive(Clone, Debug, PartialEq)]
pub struct Parcelled<T>(pub T);

impl<T: Parcelable> StateValue for Parcelled<T> {
    fn into_value(self) -> Value {
        Value::Parcel(self.0.to_parcel())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Parcel(p) => T::from_parcel(p).ok().map(Parcelled),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/codec.rs"]
mod tests;
