use std::any::Any;

use smallvec::SmallVec;

use crate::foundation::error::LayersResult;
use crate::foundation::ids::ViewId;
use crate::layer::core::LayerCx;
use crate::state::bundle::{Bundle, SparseArray};
use crate::state::value::Value;

/// Pluggable behavior attached to a layer, run alongside the layer's own hooks.
#[allow(unused_variables)]
pub trait LayerDelegate: Any {
    /// Whether the layer's view goes into the stack container.
    fn is_view_in_layout(&self) -> bool {
        true
    }

    /// Layer creation, with the layer's custom saved state.
    fn on_create(&mut self, cx: &mut LayerCx<'_>, saved: Option<&Bundle>) {}

    /// Layer attach.
    fn on_attach(&mut self, cx: &mut LayerCx<'_>) -> LayersResult<()> {
        Ok(())
    }

    /// View binding.
    fn on_bind_view(&mut self, cx: &mut LayerCx<'_>, view: ViewId, saved: Option<&Bundle>) {}

    /// View state restore.
    fn restore_view_state(&mut self, cx: &mut LayerCx<'_>, state: Option<&SparseArray<Value>>) {}

    /// View state save.
    fn save_view_state(&mut self, cx: &mut LayerCx<'_>, out: &mut SparseArray<Value>) {}

    /// Layer detach.
    fn on_detach(&mut self, cx: &mut LayerCx<'_>) {}

    /// View teardown.
    fn on_destroy_view(&mut self, cx: &mut LayerCx<'_>) {}

    /// The layer asked to be dismissed. Return true to keep it on the stack.
    fn on_dismiss(&mut self, cx: &mut LayerCx<'_>) -> bool {
        false
    }

    /// Persist delegate fields into the layer's custom state.
    fn save_layer_state(&mut self, cx: &mut LayerCx<'_>, out: &mut Bundle) {}

    /// Periodic tick from [`Layers::advance`](crate::Layers::advance).
    fn poll(&mut self, cx: &mut LayerCx<'_>) {}
}

/// Ordered set of delegates of one layer.
#[derive(Default)]
pub struct LayerDelegates {
    items: SmallVec<[Box<dyn LayerDelegate>; 1]>,
}

impl LayerDelegates {
    /// Append a delegate; delegates run in registration order.
    pub fn add(&mut self, delegate: impl LayerDelegate) {
        self.items.push(Box::new(delegate));
    }

    /// Number of delegates.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no delegate is installed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First delegate of type `D`.
    pub fn get<D: LayerDelegate>(&self) -> Option<&D> {
        self.items
            .iter()
            .find_map(|d| (&**d as &dyn Any).downcast_ref::<D>())
    }

    /// First delegate of type `D`, mutably.
    pub fn get_mut<D: LayerDelegate>(&mut self) -> Option<&mut D> {
        self.items
            .iter_mut()
            .find_map(|d| (&mut **d as &mut dyn Any).downcast_mut::<D>())
    }

    pub(crate) fn is_view_in_layout(&self) -> bool {
        self.items.iter().all(|d| d.is_view_in_layout())
    }

    pub(crate) fn on_create(&mut self, cx: &mut LayerCx<'_>, saved: Option<&Bundle>) {
        for d in &mut self.items {
            d.on_create(cx, saved);
        }
    }

    pub(crate) fn on_attach(&mut self, cx: &mut LayerCx<'_>) -> LayersResult<()> {
        for d in &mut self.items {
            d.on_attach(cx)?;
        }
        Ok(())
    }

    pub(crate) fn on_bind_view(&mut self, cx: &mut LayerCx<'_>, view: ViewId, saved: Option<&Bundle>) {
        for d in &mut self.items {
            d.on_bind_view(cx, view, saved);
        }
    }

    pub(crate) fn restore_view_state(
        &mut self,
        cx: &mut LayerCx<'_>,
        state: Option<&SparseArray<Value>>,
    ) {
        for d in &mut self.items {
            d.restore_view_state(cx, state);
        }
    }

    pub(crate) fn save_view_state(&mut self, cx: &mut LayerCx<'_>, out: &mut SparseArray<Value>) {
        for d in &mut self.items {
            d.save_view_state(cx, out);
        }
    }

    pub(crate) fn on_detach(&mut self, cx: &mut LayerCx<'_>) {
        for d in &mut self.items {
            d.on_detach(cx);
        }
    }

    pub(crate) fn on_destroy_view(&mut self, cx: &mut LayerCx<'_>) {
        for d in &mut self.items {
            d.on_destroy_view(cx);
        }
    }

    /// True when any delegate keeps the layer.
    pub(crate) fn on_dismiss(&mut self, cx: &mut LayerCx<'_>) -> bool {
        let mut kept = false;
        for d in &mut self.items {
            kept |= d.on_dismiss(cx);
        }
        kept
    }

    pub(crate) fn save_layer_state(&mut self, cx: &mut LayerCx<'_>, out: &mut Bundle) {
        for d in &mut self.items {
            d.save_layer_state(cx, out);
        }
    }

    pub(crate) fn poll(&mut self, cx: &mut LayerCx<'_>) {
        for d in &mut self.items {
            d.poll(cx);
        }
    }
}

impl std::fmt::Debug for LayerDelegates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerDelegates")
            .field("len", &self.items.len())
            .finish()
    }
}
