use std::any::Any;

use crate::animation::spec::{AnimationSpec, AnimationType};
use crate::foundation::error::LayersResult;
use crate::foundation::ids::{LayoutRes, ViewId};
use crate::host::context::HostEvent;
use crate::layer::core::LayerCx;
use crate::layer::delegate::LayerDelegates;
use crate::state::bundle::{Bundle, SparseArray};
use crate::state::value::Value;

/// Behavior of one UI unit placed on a stack.
///
/// Every hook has a no-op default. The engine owns the instance and calls hooks in lifecycle
/// order: `on_create`, then (whenever the layer is visible) `on_create_view`, `on_attach`,
/// `on_bind_view`, `on_restore_view_state`, and on the way down `on_save_view_state`,
/// `on_detach`, `on_destroy_view`, `on_save_layer_state`, `on_destroy`.
///
/// `saved` bundles passed to hooks are the ones this layer wrote in
/// [`Layer::on_save_layer_state`].
#[allow(unused_variables)]
pub trait Layer: Any {
    /// Layout inflated for the view, unless the transition overrides it.
    fn layout(&self) -> Option<LayoutRes> {
        None
    }

    /// Attach delegates. Called once, right after construction.
    fn install_delegates(&mut self, delegates: &mut LayerDelegates) {}

    /// The layer was created, fresh or from saved state.
    fn on_create(&mut self, cx: &mut LayerCx<'_>, saved: Option<&Bundle>) -> LayersResult<()> {
        Ok(())
    }

    /// New arguments were delivered through [`Layers::update`](crate::Layers::update).
    fn on_update(&mut self, cx: &mut LayerCx<'_>, arguments: &Bundle) -> LayersResult<()> {
        Ok(())
    }

    /// Build a view when neither a layout override nor [`Layer::layout`] is set.
    fn on_create_view(
        &mut self,
        cx: &mut LayerCx<'_>,
        saved: Option<&Bundle>,
    ) -> LayersResult<Option<ViewId>> {
        Ok(None)
    }

    /// The view exists and is attached.
    fn on_bind_view(
        &mut self,
        cx: &mut LayerCx<'_>,
        view: ViewId,
        saved: Option<&Bundle>,
    ) -> LayersResult<()> {
        Ok(())
    }

    /// The layer became attached to its stack's container.
    fn on_attach(&mut self, cx: &mut LayerCx<'_>) {}

    /// The layer is about to lose its view.
    fn on_detach(&mut self, cx: &mut LayerCx<'_>) {}

    /// Host lifecycle notification.
    fn on_host_event(&mut self, cx: &mut LayerCx<'_>, event: HostEvent) {}

    /// Add extra entries to the view state snapshot.
    fn on_save_view_state(&mut self, cx: &mut LayerCx<'_>, out: &mut SparseArray<Value>) {}

    /// Counterpart of [`Layer::on_save_view_state`]; `state` is `None` on first creation.
    fn on_restore_view_state(&mut self, cx: &mut LayerCx<'_>, state: Option<&SparseArray<Value>>) {
    }

    /// Persist custom fields. Only non-empty bundles are kept.
    fn on_save_layer_state(&mut self, cx: &mut LayerCx<'_>, out: &mut Bundle) {}

    /// The view was torn down.
    fn on_destroy_view(&mut self, cx: &mut LayerCx<'_>) {}

    /// The instance is going away. [`LayerCx::is_finishing`] tells removal from recreation.
    fn on_destroy(&mut self, cx: &mut LayerCx<'_>) {}

    /// Back navigation. Return true when handled.
    fn on_back_pressed(&mut self, cx: &mut LayerCx<'_>) -> bool {
        false
    }

    /// Custom animation for `kind`, taking precedence over transition resources.
    fn animation(&self, kind: AnimationType) -> Option<AnimationSpec> {
        None
    }

    /// An animation of this layer started.
    fn on_animation_start(&mut self, kind: AnimationType) {}

    /// An animation of this layer finished.
    fn on_animation_finish(&mut self, kind: AnimationType) {}
}

/// A [`Layer`] that can be created from its tag.
pub trait LayerType: Layer + Default {
    /// Stable type tag persisted with stack entries.
    const TAG: &'static str;
}

impl dyn Layer {
    /// Borrow as the concrete type.
    pub fn downcast_ref<L: Layer>(&self) -> Option<&L> {
        (self as &dyn Any).downcast_ref::<L>()
    }

    /// Mutably borrow as the concrete type.
    pub fn downcast_mut<L: Layer>(&mut self) -> Option<&mut L> {
        (self as &mut dyn Any).downcast_mut::<L>()
    }
}
