use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::state::bundle::{Bundle, SparseArray};
use crate::state::parcel::Parcel;

/// One value in a [`Bundle`].
///
/// Scalars, typed arrays and the composite variants all encode to bytes. [`Value::Retained`]
/// lives only in process memory and is dropped by byte encoding.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// Explicit absence, used for optional fields in parcels and lists.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Byte scalar.
    Byte(u8),
    /// 16-bit scalar.
    Short(i16),
    /// Character scalar.
    Char(char),
    /// 32-bit scalar.
    Int(i32),
    /// 64-bit scalar.
    Long(i64),
    /// Single precision scalar.
    Float(f32),
    /// Double precision scalar.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Character sequence. Same payload as `String`, distinct on decode.
    CharSequence(String),
    /// Boolean array.
    BoolArray(Vec<bool>),
    /// Byte array.
    ByteArray(Vec<u8>),
    /// 16-bit array.
    ShortArray(Vec<i16>),
    /// Character array.
    CharArray(Vec<char>),
    /// 32-bit array.
    IntArray(Vec<i32>),
    /// 64-bit array.
    LongArray(Vec<i64>),
    /// Single precision array.
    FloatArray(Vec<f32>),
    /// Double precision array.
    DoubleArray(Vec<f64>),
    /// String array.
    StringArray(Vec<String>),
    /// Character sequence array.
    CharSequenceArray(Vec<String>),
    /// Ordered list of arbitrary values.
    List(Vec<Value>),
    /// Sparse collection keyed by integer ids.
    Sparse(SparseArray<Value>),
    /// Nested bundle.
    Bundle(Bundle),
    /// Positional record written by a [`Parcelable`](crate::Parcelable).
    Parcel(Parcel),
    /// Custom value encoded through serde.
    Serialized(serde_json::Value),
    /// In-process handle. Never encoded.
    #[serde(skip)]
    Retained(Retained),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Char(_) => "char",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::CharSequence(_) => "char-sequence",
            Self::BoolArray(_) => "bool[]",
            Self::ByteArray(_) => "byte[]",
            Self::ShortArray(_) => "short[]",
            Self::CharArray(_) => "char[]",
            Self::IntArray(_) => "int[]",
            Self::LongArray(_) => "long[]",
            Self::FloatArray(_) => "float[]",
            Self::DoubleArray(_) => "double[]",
            Self::StringArray(_) => "string[]",
            Self::CharSequenceArray(_) => "char-sequence[]",
            Self::List(_) => "list",
            Self::Sparse(_) => "sparse",
            Self::Bundle(_) => "bundle",
            Self::Parcel(_) => "parcel",
            Self::Serialized(_) => "serialized",
            Self::Retained(_) => "retained",
        }
    }

    /// Whether this value survives byte encoding.
    pub fn is_persistable(&self) -> bool {
        !matches!(self, Self::Retained(_))
    }
}

/// Shared in-process object stored alongside persisted state.
///
/// Equality is identity: two handles are equal when they point at the same allocation.
#[derive(Clone)]
pub struct Retained(Rc<dyn Any>);

impl Retained {
    /// Wrap a shared value.
    pub fn new<T: Any>(value: Rc<T>) -> Self {
        Self(value)
    }

    /// Recover the shared value when it has type `T`.
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.0).downcast::<T>().ok()
    }
}

impl PartialEq for Retained {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Retained {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Retained(..)")
    }
}
