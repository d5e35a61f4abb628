use std::time::Duration;

use super::*;
use crate::backend::headless::HeadlessBackend;
use crate::foundation::ids::{ContainerId, EntryId, LayoutRes};
use crate::host::context::{HostContext, LayersConfig};
use crate::layer::behavior::{Layer, LayerType};
use crate::layer::core::LayerCore;
use crate::layer::delegate::LayerDelegates;
use crate::layer::registry::LayerRegistry;
use crate::manager::layers::Layers;

#[derive(Default)]
struct Page;

impl Layer for Page {
    fn layout(&self) -> Option<LayoutRes> {
        Some(LayoutRes(1))
    }
}

impl LayerType for Page {
    const TAG: &'static str = "page";
}

#[derive(Default)]
struct Confirm;

impl Layer for Confirm {
    fn layout(&self) -> Option<LayoutRes> {
        Some(LayoutRes(9))
    }

    fn install_delegates(&mut self, delegates: &mut LayerDelegates) {
        let mut dialog = DialogDelegate::new();
        dialog.set_style(DialogStyle::NoFrame, 0);
        delegates.add(dialog);
    }
}

impl LayerType for Confirm {
    const TAG: &'static str = "confirm";
}

fn manager() -> (Layers, HeadlessBackend) {
    let registry = LayerRegistry::new().with::<Page>().with::<Confirm>();
    let host = HostContext::root(registry, LayersConfig::default());
    (Layers::new(host, ContainerId::DEFAULT), HeadlessBackend::new())
}

#[test]
fn frameless_style_picks_the_panel_theme() {
    let mut dialog = DialogDelegate::new();
    dialog.set_style(DialogStyle::NoTitle, 0);
    assert_eq!(dialog.theme(), 0);
    dialog.set_style(DialogStyle::NoInput, 0);
    assert_eq!(dialog.theme(), PANEL_THEME);
    dialog.set_style(DialogStyle::NoFrame, 42);
    assert_eq!(dialog.theme(), 42);
}

#[test]
fn settings_survive_a_save_and_restore() {
    let host = HostContext::root(LayerRegistry::new(), LayersConfig::default());
    let mut backend = HeadlessBackend::new();
    let mut core = LayerCore::new(EntryId(1), Confirm::TAG, &host);
    let mut cx = LayerCx::new(&mut core, &mut backend);

    let mut defaults = Bundle::new();
    DialogDelegate::new().save_layer_state(&mut cx, &mut defaults);
    assert!(defaults.is_empty());

    let mut dialog = DialogDelegate::new();
    dialog.set_style(DialogStyle::NoFrame, 0);
    dialog.set_cancelable(false);
    let mut out = Bundle::new();
    dialog.save_layer_state(&mut cx, &mut out);
    assert_eq!(out.get::<i32>(DIALOG_STYLE), Some(2));
    assert_eq!(out.get::<bool>(DIALOG_CANCELABLE), Some(false));

    let mut restored = DialogDelegate::new();
    restored.on_create(&mut cx, Some(&out));
    assert_eq!(restored.style(), DialogStyle::NoFrame);
    assert_eq!(restored.theme(), PANEL_THEME);
    assert!(!restored.is_cancelable());
}

#[test]
fn dialog_is_presented_outside_the_container() {
    let (mut layers, mut backend) = manager();
    layers.add::<Page>(&mut backend, |_| {}).unwrap();
    layers
        .add::<Confirm>(&mut backend, |t| {
            t.opaque(false);
        })
        .unwrap();

    let dialog = layers.peek().unwrap();
    let view = dialog.view().unwrap();
    assert!(!dialog.is_view_in_layout());
    assert!(dialog.delegate::<DialogDelegate>().unwrap().is_presented());
    assert!(backend.is_presented(view));
    assert_eq!(backend.children(backend.root()).len(), 1);
}

#[test]
fn user_dismissal_removes_the_layer() {
    let (mut layers, mut backend) = manager();
    layers.add::<Page>(&mut backend, |_| {}).unwrap();
    layers.add::<Confirm>(&mut backend, |_| {}).unwrap();
    assert!(backend.children(backend.root()).is_empty());

    let view = layers.peek().and_then(|l| l.view()).unwrap();
    backend.user_dismiss(view);
    layers.advance(&mut backend, Duration::from_millis(16)).unwrap();
    layers.fast_forward(&mut backend).unwrap();

    assert_eq!(layers.stack_size(), 1);
    assert_eq!(layers.peek().map(|l| l.tag()), Some(Page::TAG));
    assert_eq!(backend.children(backend.root()).len(), 1);
    assert!(!backend.contains(view));
}
