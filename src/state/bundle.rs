use std::collections::BTreeMap;

use serde::ser::SerializeMap;

use crate::foundation::error::{LayersError, LayersResult};
use crate::state::codec::StateValue;
use crate::state::parcel::Parcelable;
use crate::state::value::Value;

/// Hierarchical key to value store used for arguments and persisted state.
///
/// Keys are kept sorted so that encoding is deterministic: saving an unchanged stack twice
/// yields identical bytes.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    entries: BTreeMap<String, Value>,
}

impl Bundle {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bundle holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in encoding order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in encoding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Raw value stored under `key`.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Store a raw value, returning the previous one.
    pub fn put_value(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Remove and return the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Store a typed value.
    pub fn put<T: StateValue>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), value.into_value());
    }

    /// Read a typed value. `None` when absent or stored with a different type.
    pub fn get<T: StateValue>(&self, key: &str) -> Option<T> {
        self.entries.get(key).and_then(T::from_value)
    }

    /// Borrow a nested bundle.
    pub fn get_bundle(&self, key: &str) -> Option<&Bundle> {
        match self.entries.get(key) {
            Some(Value::Bundle(b)) => Some(b),
            _ => None,
        }
    }

    /// Store a nested bundle.
    pub fn put_bundle(&mut self, key: impl Into<String>, bundle: Bundle) {
        self.entries.insert(key.into(), Value::Bundle(bundle));
    }

    /// Store a structured value as a parcel.
    pub fn put_parcelable<T: Parcelable>(&mut self, key: impl Into<String>, value: &T) {
        self.entries
            .insert(key.into(), Value::Parcel(value.to_parcel()));
    }

    /// Read a structured value. Fails when the stored parcel does not decode as `T`.
    pub fn get_parcelable<T: Parcelable>(&self, key: &str) -> LayersResult<Option<T>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Parcel(p)) => T::from_parcel(p).map(Some),
            Some(other) => Err(type_mismatch(key, "parcel", other)),
        }
    }

    /// Store an ordered list of structured values.
    pub fn put_parcelable_list<'a, T: Parcelable + 'a>(
        &mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = &'a T>,
    ) {
        let list = values
            .into_iter()
            .map(|v| Value::Parcel(v.to_parcel()))
            .collect();
        self.entries.insert(key.into(), Value::List(list));
    }

    /// Read an ordered list of structured values.
    pub fn get_parcelable_list<T: Parcelable>(&self, key: &str) -> LayersResult<Option<Vec<T>>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Parcel(p) => T::from_parcel(p),
                    other => Err(type_mismatch(key, "parcel", other)),
                })
                .collect::<LayersResult<Vec<T>>>()
                .map(Some),
            Some(other) => Err(type_mismatch(key, "list", other)),
        }
    }

    /// Store a serde value.
    pub fn put_serializable<T: serde::Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> LayersResult<()> {
        let json = serde_json::to_value(value)?;
        self.entries.insert(key.into(), Value::Serialized(json));
        Ok(())
    }

    /// Read a serde value.
    pub fn get_serializable<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> LayersResult<Option<T>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Serialized(json)) => Ok(Some(T::deserialize(json)?)),
            Some(other) => Err(type_mismatch(key, "serialized", other)),
        }
    }

    /// Encode to bytes. Retained values are skipped.
    pub fn to_bytes(&self) -> LayersResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode bytes produced by [`Bundle::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> LayersResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn type_mismatch(key: &str, expected: &str, found: &Value) -> LayersError {
    LayersError::serde(format!(
        "key '{key}' holds {} where {expected} was expected",
        found.kind()
    ))
}

impl serde::Serialize for Bundle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let persisted = self.entries.iter().filter(|(_, v)| v.is_persistable());
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in persisted {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl FromIterator<(String, Value)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Collection keyed by sparse integer ids, such as view ids.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SparseArray<T> {
    items: BTreeMap<i32, T>,
}

impl<T> Default for SparseArray<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T> SparseArray<T> {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`.
    pub fn put(&mut self, key: i32, value: T) -> Option<T> {
        self.items.insert(key, value)
    }

    /// Borrow the value under `key`.
    pub fn get(&self, key: i32) -> Option<&T> {
        self.items.get(&key)
    }

    /// Remove the value under `key`.
    pub fn remove(&mut self, key: i32) -> Option<T> {
        self.items.remove(&key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &T)> {
        self.items.iter().map(|(k, v)| (*k, v))
    }
}

impl<T> IntoIterator for SparseArray<T> {
    type Item = (i32, T);
    type IntoIter = std::collections::btree_map::IntoIter<i32, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> FromIterator<(i32, T)> for SparseArray<T> {
    fn from_iter<I: IntoIterator<Item = (i32, T)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/bundle.rs"]
mod tests;
