use super::*;
use crate::backend::headless::HeadlessBackend;
use crate::foundation::ids::LayoutRes;
use crate::layer::behavior::{Layer, LayerType};
use crate::layer::core::LayerCx;
use crate::state::value::Value;

#[derive(Default)]
struct Page {
    opened: i32,
}

impl Layer for Page {
    fn layout(&self) -> Option<LayoutRes> {
        Some(LayoutRes(1))
    }

    fn on_create(&mut self, _cx: &mut LayerCx<'_>, saved: Option<&Bundle>) -> LayersResult<()> {
        self.opened = saved.and_then(|b| b.get::<i32>("opened")).unwrap_or(0) + 1;
        Ok(())
    }

    fn on_save_layer_state(&mut self, _cx: &mut LayerCx<'_>, out: &mut Bundle) {
        out.put("opened", self.opened);
    }
}

impl LayerType for Page {
    const TAG: &'static str = "page";
}

fn registry() -> LayerRegistry {
    LayerRegistry::new().with::<Page>()
}

fn started(backend: &mut HeadlessBackend, saved: Option<&Bundle>) -> RootHost {
    let mut host = RootHost::create(backend, registry(), LayersConfig::default(), saved).unwrap();
    host.on_start(backend).unwrap();
    host.on_resume(backend).unwrap();
    host
}

fn push(host: &mut RootHost, backend: &mut HeadlessBackend, name: &str) {
    host.layers_mut()
        .add::<Page>(backend, |t| {
            t.name(name);
        })
        .unwrap();
}

#[test]
fn callbacks_reach_the_host_and_its_layers() {
    let mut backend = HeadlessBackend::new();
    let mut host = started(&mut backend, None);
    push(&mut host, &mut backend, "a");

    assert_eq!(host.context().lifecycle(), LifecycleState::Resumed);
    assert_eq!(host.layers().peek().unwrap().lifecycle(), LifecycleState::Resumed);

    host.on_pause(&mut backend).unwrap();
    host.on_stop(&mut backend).unwrap();
    assert_eq!(host.context().lifecycle(), LifecycleState::Created);
    assert_eq!(host.layers().peek().unwrap().lifecycle(), LifecycleState::Created);

    host.on_destroy(&mut backend).unwrap();
    assert_eq!(host.context().lifecycle(), LifecycleState::Destroyed);
    assert!(host.layers().peek().is_none());
    assert!(backend.children(backend.root()).is_empty());
}

#[test]
fn recreation_restores_the_stack() {
    let mut backend = HeadlessBackend::new();
    let mut host = started(&mut backend, None);
    push(&mut host, &mut backend, "a");
    push(&mut host, &mut backend, "b");
    let top = host.layers().peek().and_then(|l| l.view()).unwrap();
    backend.set_content(top, Value::Int(5));

    host.on_pause(&mut backend).unwrap();
    host.on_stop(&mut backend).unwrap();
    let saved = host.on_save_state(&mut backend, false).unwrap();
    assert!(host.is_in_saved_state());
    host.on_destroy(&mut backend).unwrap();

    let mut backend = HeadlessBackend::new();
    let mut host =
        RootHost::create(&mut backend, registry(), LayersConfig::default(), Some(&saved)).unwrap();
    assert_eq!(host.layers().stack_size(), 2);
    assert!(host.layers().is_view_paused());
    assert!(host.layers().peek().unwrap().view().is_none());

    host.on_start(&mut backend).unwrap();
    let layers = host.layers();
    assert!(!layers.is_view_paused());
    let names: Vec<_> = layers.handles().into_iter().filter_map(|h| h.name).collect();
    assert_eq!(names, vec!["a", "b"]);

    let top = layers.peek().unwrap();
    assert!(top.is_from_saved_state());
    assert_eq!(top.downcast_ref::<Page>().unwrap().opened, 2);
    assert_eq!(top.lifecycle(), LifecycleState::Started);
    let view = top.view().unwrap();
    assert_eq!(backend.content(view), Some(&Value::Int(5)));
    assert!(layers.get(0).unwrap().view().is_none());
}

#[test]
fn finishing_hosts_save_nothing() {
    let mut backend = HeadlessBackend::new();
    let mut host = started(&mut backend, None);
    push(&mut host, &mut backend, "a");
    let saved = host.on_save_state(&mut backend, true).unwrap();
    assert!(saved.is_empty());
    assert_eq!(host.layers().stack_size(), 1);
}

#[test]
fn back_press_pops_until_one_layer_is_left() {
    let mut backend = HeadlessBackend::new();
    let mut host = started(&mut backend, None);
    assert!(!host.on_back_pressed(&mut backend).unwrap());

    push(&mut host, &mut backend, "a");
    push(&mut host, &mut backend, "b");
    assert!(host.on_back_pressed(&mut backend).unwrap());
    host.layers_mut().fast_forward(&mut backend).unwrap();
    assert_eq!(host.layers().stack_size(), 1);
    assert_eq!(host.layers().peek().and_then(|l| l.name()), Some("a"));

    assert!(!host.on_back_pressed(&mut backend).unwrap());
    assert_eq!(host.layers().stack_size(), 1);
}
