use super::*;
use crate::state::parcel::{Parcel, ParcelReader};
use crate::foundation::error::LayersResult;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Cursor {
    line: u32,
    column: u32,
    label: String,
}

#[derive(Clone, Debug, PartialEq)]
struct Scroll {
    offset: i32,
    anchor: Option<String>,
}

impl Parcelable for Scroll {
    const PARCEL_TAG: &'static str = "test.Scroll";

    fn write_to_parcel(&self, out: &mut Parcel) {
        out.write_int(self.offset);
        out.write_string(self.anchor.as_deref());
    }

    fn read_from_parcel(input: &mut ParcelReader<'_>) -> LayersResult<Self> {
        Ok(Self {
            offset: input.read_int()?,
            anchor: input.read_string()?,
        })
    }
}

fn round_trip<T: StateValue + Clone + PartialEq + std::fmt::Debug>(v: T) {
    let encoded = v.clone().into_value();
    assert_eq!(T::from_value(&encoded), Some(v.clone()), "value level");

    let mut bundle = Bundle::new();
    bundle.put("k", v.clone());
    let bytes = bundle.to_bytes().unwrap();
    let decoded = Bundle::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.get::<T>("k"), Some(v), "byte level");
}

#[test]
fn scalars_round_trip() {
    round_trip(7_i32);
    round_trip(-9_000_000_000_i64);
    round_trip(1.25_f32);
    round_trip(-3.5e10_f64);
    round_trip(true);
    round_trip(0xAB_u8);
    round_trip(-12_i16);
    round_trip('λ');
    round_trip(String::from("hello"));
    round_trip(Box::<str>::from("char sequence"));
}

#[test]
fn custom_values_round_trip() {
    round_trip(Serialized(Cursor {
        line: 3,
        column: 14,
        label: "caret".into(),
    }));
    round_trip(Parcelled(Scroll {
        offset: 120,
        anchor: Some("header".into()),
    }));
    round_trip(Parcelled(Scroll {
        offset: 0,
        anchor: None,
    }));
}

#[test]
fn arrays_round_trip() {
    round_trip(vec![1_i32, 2, 3]);
    round_trip(vec![1_i64, -2]);
    round_trip(vec![0.5_f32, 0.25]);
    round_trip(vec![0.1_f64, 0.2]);
    round_trip(vec![true, false]);
    round_trip(vec![String::from("a"), String::from("b")]);
    round_trip(vec![Box::<str>::from("x"), Box::<str>::from("y")]);
    round_trip(vec![
        Serialized(Cursor {
            line: 1,
            column: 1,
            label: "a".into(),
        }),
        Serialized(Cursor {
            line: 2,
            column: 2,
            label: "b".into(),
        }),
    ]);
    round_trip(vec![Parcelled(Scroll {
        offset: 4,
        anchor: None,
    })]);
}

#[test]
fn sparse_collection_of_structured_values_round_trips() {
    let mut sparse = SparseArray::new();
    sparse.put(
        10,
        Parcelled(Scroll {
            offset: 1,
            anchor: None,
        }),
    );
    sparse.put(
        -4,
        Parcelled(Scroll {
            offset: 2,
            anchor: Some("footer".into()),
        }),
    );
    round_trip(sparse);
}

#[test]
fn scalar_arrays_use_typed_variants() {
    assert!(matches!(vec![1_i32].into_value(), Value::IntArray(_)));
    assert!(matches!(
        vec![Box::<str>::from("a")].into_value(),
        Value::CharSequenceArray(_)
    ));
    assert!(matches!(
        vec![Bundle::new()].into_value(),
        Value::List(_)
    ));
}

#[test]
fn string_and_char_sequence_do_not_alias() {
    let v = String::from("same").into_value();
    assert_eq!(Box::<str>::from_value(&v), None);
    assert_eq!(String::from_value(&v), Some(String::from("same")));
}

#[test]
fn option_maps_none_to_null() {
    assert_eq!(Option::<i32>::None.into_value(), Value::Null);
    assert_eq!(Option::<i32>::from_value(&Value::Int(3)), Some(Some(3)));
    assert_eq!(Option::<i32>::from_value(&Value::Null), Some(None));
}

#[test]
fn mismatched_variant_decodes_to_none() {
    assert_eq!(i32::from_value(&Value::Long(1)), None);
    assert_eq!(Vec::<i32>::from_value(&Value::LongArray(vec![1])), None);
    assert_eq!(
        Parcelled::<Scroll>::from_value(&Value::Parcel(Parcel::new("other"))),
        None
    );
}
