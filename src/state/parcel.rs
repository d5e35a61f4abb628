use crate::foundation::error::{LayersError, LayersResult};
use crate::state::bundle::Bundle;
use crate::state::value::Value;

/// Positional record: fields are written and read back in the same order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parcel {
    tag: String,
    fields: Vec<Value>,
}

impl Parcel {
    /// Empty parcel for records of type `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: Vec::new(),
        }
    }

    /// Record type tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of written fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was written.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a raw value.
    pub fn write_value(&mut self, value: Value) {
        self.fields.push(value);
    }

    /// Append an optional string.
    pub fn write_string(&mut self, value: Option<&str>) {
        self.fields
            .push(value.map_or(Value::Null, |s| Value::String(s.to_owned())));
    }

    /// Append an int.
    pub fn write_int(&mut self, value: i32) {
        self.fields.push(Value::Int(value));
    }

    /// Append an int array.
    pub fn write_int_array(&mut self, values: &[i32]) {
        self.fields.push(Value::IntArray(values.to_vec()));
    }

    /// Append an optional bundle.
    pub fn write_bundle(&mut self, value: Option<&Bundle>) {
        self.fields
            .push(value.map_or(Value::Null, |b| Value::Bundle(b.clone())));
    }

    /// Cursor over the written fields.
    pub fn reader(&self) -> ParcelReader<'_> {
        ParcelReader {
            parcel: self,
            pos: 0,
        }
    }
}

/// Sequential reader over a [`Parcel`].
#[derive(Debug)]
pub struct ParcelReader<'a> {
    parcel: &'a Parcel,
    pos: usize,
}

impl<'a> ParcelReader<'a> {
    /// Next raw value.
    pub fn read_value(&mut self) -> LayersResult<&'a Value> {
        let value = self.parcel.fields.get(self.pos).ok_or_else(|| {
            LayersError::serde(format!(
                "parcel '{}' exhausted after {} fields",
                self.parcel.tag, self.pos
            ))
        })?;
        self.pos += 1;
        Ok(value)
    }

    /// Next optional string.
    pub fn read_string(&mut self) -> LayersResult<Option<String>> {
        match self.read_value()? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(self.unexpected("string", other)),
        }
    }

    /// Next int.
    pub fn read_int(&mut self) -> LayersResult<i32> {
        match self.read_value()? {
            Value::Int(v) => Ok(*v),
            other => Err(self.unexpected("int", other)),
        }
    }

    /// Next int array.
    pub fn read_int_array(&mut self) -> LayersResult<Vec<i32>> {
        match self.read_value()? {
            Value::IntArray(v) => Ok(v.clone()),
            other => Err(self.unexpected("int[]", other)),
        }
    }

    /// Next optional bundle.
    pub fn read_bundle(&mut self) -> LayersResult<Option<Bundle>> {
        match self.read_value()? {
            Value::Null => Ok(None),
            Value::Bundle(b) => Ok(Some(b.clone())),
            other => Err(self.unexpected("bundle", other)),
        }
    }

    fn unexpected(&self, expected: &str, found: &Value) -> LayersError {
        LayersError::serde(format!(
            "parcel '{}' field {}: expected {expected}, found {}",
            self.parcel.tag,
            self.pos.saturating_sub(1),
            found.kind()
        ))
    }
}

/// Types that persist themselves as a positional [`Parcel`].
pub trait Parcelable: Sized {
    /// Tag identifying the record type inside a parcel.
    const PARCEL_TAG: &'static str;

    /// Write fields in declaration order.
    fn write_to_parcel(&self, out: &mut Parcel);

    /// Read fields back in the order [`Parcelable::write_to_parcel`] wrote them.
    fn read_from_parcel(input: &mut ParcelReader<'_>) -> LayersResult<Self>;

    /// Encode into a fresh parcel.
    fn to_parcel(&self) -> Parcel {
        let mut out = Parcel::new(Self::PARCEL_TAG);
        self.write_to_parcel(&mut out);
        out
    }

    /// Decode from a parcel, checking its tag first.
    fn from_parcel(parcel: &Parcel) -> LayersResult<Self> {
        if parcel.tag() != Self::PARCEL_TAG {
            return Err(LayersError::serde(format!(
                "parcel tag '{}' does not match '{}'",
                parcel.tag(),
                Self::PARCEL_TAG
            )));
        }
        Self::read_from_parcel(&mut parcel.reader())
    }
}
