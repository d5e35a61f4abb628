use super::*;
use crate::state::value::Retained;
use std::rc::Rc;

#[test]
fn typed_put_get() {
    let mut b = Bundle::new();
    b.put("count", 3_i32);
    b.put("title", String::from("Inbox"));
    assert_eq!(b.get::<i32>("count"), Some(3));
    assert_eq!(b.get::<String>("title").as_deref(), Some("Inbox"));
    assert_eq!(b.get::<i64>("count"), None);
    assert_eq!(b.get::<i32>("missing"), None);
    assert_eq!(b.len(), 2);
}

#[test]
fn keys_are_sorted_for_deterministic_bytes() {
    let mut a = Bundle::new();
    a.put("z", 1_i32);
    a.put("a", 2_i32);
    let mut b = Bundle::new();
    b.put("a", 2_i32);
    b.put("z", 1_i32);
    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    assert_eq!(a.keys().collect::<Vec<_>>(), vec!["a", "z"]);
}

#[test]
fn retained_values_are_skipped_by_encoding() {
    let mut b = Bundle::new();
    b.put("kept", 1_i32);
    b.put_value("handle", Value::Retained(Retained::new(Rc::new(5_u32))));
    let decoded = Bundle::from_bytes(&b.to_bytes().unwrap()).unwrap();
    assert!(decoded.contains_key("kept"));
    assert!(!decoded.contains_key("handle"));
}

#[test]
fn retained_equality_is_identity() {
    let shared = Rc::new(1_u8);
    let a = Retained::new(Rc::clone(&shared));
    let b = Retained::new(shared);
    let c = Retained::new(Rc::new(1_u8));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.downcast::<u8>().as_deref(), Some(&1));
    assert!(a.downcast::<u16>().is_none());
}

#[test]
fn nested_bundles_survive_bytes() {
    let mut inner = Bundle::new();
    inner.put("depth", 2_i32);
    let mut outer = Bundle::new();
    outer.put_bundle("inner", inner.clone());
    let decoded = Bundle::from_bytes(&outer.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.get_bundle("inner"), Some(&inner));
}

#[test]
fn serializable_accessors_report_type_mismatch() {
    let mut b = Bundle::new();
    b.put_serializable("point", &(1_i32, 2_i32)).unwrap();
    b.put("int", 1_i32);
    assert_eq!(
        b.get_serializable::<(i32, i32)>("point").unwrap(),
        Some((1, 2))
    );
    assert!(b.get_serializable::<(i32, i32)>("int").is_err());
    assert_eq!(b.get_serializable::<(i32, i32)>("missing").unwrap(), None);
}

#[test]
fn sparse_array_iterates_in_key_order() {
    let mut s = SparseArray::new();
    s.put(5, "five");
    s.put(-1, "minus one");
    s.put(2, "two");
    let keys: Vec<i32> = s.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![-1, 2, 5]);
    assert_eq!(s.remove(2), Some("two"));
    assert_eq!(s.len(), 2);
}
