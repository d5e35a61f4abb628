use super::*;

#[test]
fn add_and_remove_are_recorded_in_order() {
    let mut b = HeadlessBackend::new();
    let root = b.root();
    let v1 = b.create_view(1);
    let v2 = b.create_view(2);
    b.add_child(root, v1, 0).unwrap();
    b.add_child(root, v2, 0).unwrap();
    assert_eq!(b.children(root), vec![v2, v1]);
    b.remove_child(root, v1).unwrap();
    assert_eq!(b.added(), 2);
    assert_eq!(b.removed(), 1);
    assert_eq!(b.insert_positions(), vec![0, 0]);
    assert_eq!(b.child_count(root), 1);
}

#[test]
fn invalid_inserts_are_rejected() {
    let mut b = HeadlessBackend::new();
    let root = b.root();
    let v = b.create_view(1);
    assert!(b.add_child(root, v, 3).is_err());
    b.add_child(root, v, 0).unwrap();
    assert!(b.add_child(root, v, 0).is_err());
    assert!(b.remove_child(root, ViewId(999)).is_err());
}

#[test]
fn inflated_layouts_expose_declared_containers() {
    let mut b = HeadlessBackend::new();
    b.register_layout(LayoutRes(5), &[ContainerId(50), ContainerId(51)]);
    let view = b.inflate(LayoutRes(5)).unwrap();
    let inner = b.find_view(Some(view), ContainerId(51)).unwrap();
    assert_eq!(b.children(view)[1], inner);
    assert!(b.find_view(None, ContainerId(51)).is_none(), "not attached yet");
    let root = b.root();
    b.add_child(root, view, 0).unwrap();
    assert_eq!(b.find_view(None, ContainerId(51)), Some(inner));
}

#[test]
fn hierarchy_state_skips_opted_out_subtrees() {
    let mut b = HeadlessBackend::new();
    b.register_layout(LayoutRes(5), &[ContainerId(50)]);
    let view = b.inflate(LayoutRes(5)).unwrap();
    let container = b.find_view(Some(view), ContainerId(50)).unwrap();
    let nested = b.create_view(77);
    b.attach(container, nested).unwrap();
    b.set_content(view, Value::Int(12));
    b.set_content(nested, Value::Int(99));
    b.set_save_from_parent_enabled(container, false);

    let mut out = SparseArray::new();
    b.save_hierarchy_state(view, &mut out);
    assert_eq!(out.get(5), Some(&Value::Int(12)));
    assert_eq!(out.get(77), None);

    let fresh = b.inflate(LayoutRes(5)).unwrap();
    b.restore_hierarchy_state(fresh, &out);
    assert_eq!(b.content(fresh), Some(&Value::Int(12)));
}

#[test]
fn release_drops_the_subtree() {
    let mut b = HeadlessBackend::new();
    b.register_layout(LayoutRes(5), &[ContainerId(50)]);
    let view = b.inflate(LayoutRes(5)).unwrap();
    let container = b.find_view(Some(view), ContainerId(50)).unwrap();
    b.release_view(view);
    assert!(!b.contains(view));
    assert!(!b.contains(container));
    assert_eq!(b.released(), 1);
}

#[test]
fn user_dismissal_is_reported_once() {
    let mut b = HeadlessBackend::new();
    let v = b.create_view(3);
    b.user_dismiss(v);
    assert!(!b.take_dismissed(v), "not presented yet");

    b.present_detached(v, true).unwrap();
    assert!(b.is_presented(v));
    b.user_dismiss(v);
    assert!(!b.is_presented(v));
    assert!(b.take_dismissed(v));
    assert!(!b.take_dismissed(v));
}
