use super::*;

#[test]
fn lifecycle_follows_host_events() {
    let s = LifecycleState::Created;
    let s = s.after(HostEvent::Start);
    assert_eq!(s, LifecycleState::Started);
    let s = s.after(HostEvent::Resume);
    assert_eq!(s, LifecycleState::Resumed);
    assert_eq!(s.after(HostEvent::Pause), LifecycleState::Started);
    assert_eq!(s.after(HostEvent::Stop), LifecycleState::Created);
    assert_eq!(
        LifecycleState::Destroyed.after(HostEvent::Resume),
        LifecycleState::Destroyed
    );
    assert!(LifecycleState::Resumed >= LifecycleState::Started);
}

#[test]
fn config_defaults_fill_missing_fields() {
    let cfg = LayersConfig::from_json(r#"{ "animations_enabled": false }"#).unwrap();
    assert!(!cfg.animations_enabled);
    assert_eq!(cfg.default_visibility, Visibility::Opaque);

    let cfg = LayersConfig::from_json(r#"{ "default_visibility": "transparent" }"#).unwrap();
    assert!(cfg.animations_enabled);
    assert_eq!(cfg.default_visibility, Visibility::Transparent);

    assert!(LayersConfig::from_json("{ nope").is_err());
}

#[test]
fn entry_ids_are_shared_across_the_chain() {
    let root = HostContext::root(LayerRegistry::new(), LayersConfig::default());
    let child = HostContext::child(&root, "child", EntryId(7));
    assert_eq!(root.next_entry_id(), EntryId(0));
    assert_eq!(child.next_entry_id(), EntryId(1));
    assert_eq!(root.next_entry_id(), EntryId(2));
    assert!(root.is_root());
    assert!(!child.is_root());
}

#[test]
fn lifecycle_is_read_from_the_root() {
    let root = HostContext::root(LayerRegistry::new(), LayersConfig::default());
    let child = HostContext::child(&root, "child", EntryId(0));
    root.set_lifecycle(LifecycleState::Resumed);
    assert_eq!(child.lifecycle(), LifecycleState::Resumed);
}

struct Theme(&'static str);

#[test]
fn services_resolve_from_the_nearest_link() {
    let root = HostContext::root(LayerRegistry::new(), LayersConfig::default());
    let mid = HostContext::child(&root, "mid", EntryId(0));
    let leaf = HostContext::child(&mid, "leaf", EntryId(1));

    assert!(leaf.find::<Theme>().is_none());
    root.provide(Rc::new(Theme("light")));
    assert_eq!(leaf.find::<Theme>().map(|t| t.0), Some("light"));

    mid.provide(Rc::new(Theme("dark")));
    assert_eq!(leaf.find::<Theme>().map(|t| t.0), Some("dark"));
    assert_eq!(root.find::<Theme>().map(|t| t.0), Some("light"));

    mid.provide(Rc::new(Theme("contrast")));
    assert_eq!(leaf.find::<Theme>().map(|t| t.0), Some("contrast"));
}
