use std::rc::Rc;
use std::time::Duration;

use crate::animation::spec::{AnimationSpec, AnimationType};
use crate::backend::view::ViewBackend;
use crate::foundation::error::LayersResult;
use crate::foundation::ids::{ContainerId, EntryId, LayoutRes, ViewId};
use crate::host::context::{HostContext, HostEvent, LifecycleState};
use crate::layer::behavior::Layer;
use crate::layer::core::{LayerCore, LayerCx};
use crate::layer::delegate::{LayerDelegate, LayerDelegates};
use crate::manager::layers::Layers;
use crate::state::bundle::{Bundle, SparseArray};
use crate::state::value::Value;

const SAVED_STATE_CHILD_LAYERS: &str = "LAYER.SAVED_STATE_CHILD_LAYERS";
const SAVED_STATE_INTERNAL: &str = "LAYER.SAVED_STATE_INTERNAL";
const SAVED_STATE_CUSTOM: &str = "LAYER.SAVED_STATE_CUSTOM";

/// The custom sub-bundle of a persisted layer state.
pub(crate) fn custom_state(layer_state: Option<&Bundle>) -> Option<&Bundle> {
    layer_state.and_then(|s| s.get_bundle(SAVED_STATE_CUSTOM))
}

/// A layer instance owned by a stack entry, together with its engine bookkeeping.
#[derive(Debug)]
pub struct LiveLayer {
    core: LayerCore,
    behavior: Box<dyn Layer>,
    delegates: LayerDelegates,
}

impl std::fmt::Debug for dyn Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Layer")
    }
}

macro_rules! with_cx {
    ($self:ident, $backend:ident, |$cx:ident| $body:expr) => {{
        let mut $cx = LayerCx::new(&mut $self.core, $backend);
        $body
    }};
}

impl LiveLayer {
    pub(crate) fn new(
        id: EntryId,
        tag: &str,
        mut behavior: Box<dyn Layer>,
        host: &Rc<HostContext>,
    ) -> Self {
        let mut delegates = LayerDelegates::default();
        behavior.install_delegates(&mut delegates);
        Self {
            core: LayerCore::new(id, tag, host),
            behavior,
            delegates,
        }
    }

    /// Runtime id of the owning stack entry.
    pub fn id(&self) -> EntryId {
        self.core.id
    }

    /// Registered type tag.
    pub fn tag(&self) -> &str {
        &self.core.tag
    }

    /// Entry name.
    pub fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    /// Current arguments.
    pub fn arguments(&self) -> Option<&Bundle> {
        self.core.arguments.as_ref()
    }

    /// The view, while it exists.
    pub fn view(&self) -> Option<ViewId> {
        self.core.view
    }

    /// Whether the layer is attached to its container.
    pub fn is_attached(&self) -> bool {
        self.core.attached
    }

    /// Whether the layer was destroyed for good.
    pub fn is_finishing(&self) -> bool {
        self.core.finishing
    }

    /// Whether the layer was created from saved state.
    pub fn is_from_saved_state(&self) -> bool {
        self.core.from_saved_state
    }

    /// Lifecycle of the layer itself.
    pub fn lifecycle(&self) -> LifecycleState {
        self.core.lifecycle
    }

    /// Lifecycle of the view, while it exists.
    pub fn view_lifecycle(&self) -> Option<LifecycleState> {
        self.core.view_lifecycle
    }

    /// Whether the view goes into the stack container.
    pub fn is_view_in_layout(&self) -> bool {
        self.delegates.is_view_in_layout()
    }

    /// Value from the layer's internal state.
    pub fn saved_value(&self, key: &str) -> Option<&Value> {
        self.core.state.as_ref().and_then(|s| s.get_value(key))
    }

    /// The behavior object.
    pub fn layer(&self) -> &dyn Layer {
        self.behavior.as_ref()
    }

    /// The behavior object, mutably.
    pub fn layer_mut(&mut self) -> &mut dyn Layer {
        self.behavior.as_mut()
    }

    /// Borrow the behavior as its concrete type.
    pub fn downcast_ref<L: Layer>(&self) -> Option<&L> {
        self.behavior.downcast_ref::<L>()
    }

    /// Mutably borrow the behavior as its concrete type.
    pub fn downcast_mut<L: Layer>(&mut self) -> Option<&mut L> {
        self.behavior.downcast_mut::<L>()
    }

    /// First installed delegate of type `D`.
    pub fn delegate<D: LayerDelegate>(&self) -> Option<&D> {
        self.delegates.get::<D>()
    }

    /// The layer's own stack, if one was created.
    pub fn child_layers(&self) -> Option<&Layers> {
        self.core.child_layers.as_deref()
    }

    /// The layer's own stack, mutably.
    pub fn child_layers_mut(&mut self) -> Option<&mut Layers> {
        self.core.child_layers.as_deref_mut()
    }

    pub(crate) fn animation(&self, kind: AnimationType) -> Option<AnimationSpec> {
        self.behavior.animation(kind)
    }

    pub(crate) fn animation_started(&mut self, kind: AnimationType) {
        self.behavior.on_animation_start(kind);
    }

    pub(crate) fn animation_finished(&mut self, kind: AnimationType) {
        self.behavior.on_animation_finish(kind);
    }

    pub(crate) fn create(
        &mut self,
        backend: &mut dyn ViewBackend,
        arguments: Option<Bundle>,
        name: Option<String>,
        saved: Option<&Bundle>,
    ) -> LayersResult<()> {
        self.core.arguments = arguments;
        self.core.name = name;
        self.core.from_saved_state = saved.is_some();

        if let Some(saved) = saved {
            if let Some(child) = saved.get_bundle(SAVED_STATE_CHILD_LAYERS) {
                let layers = Layers::restore(
                    backend,
                    Rc::clone(&self.core.context),
                    ContainerId::DEFAULT,
                    Some(child),
                )?;
                self.core.child_layers = Some(Box::new(layers));
            }
            if let Some(internal) = saved.get_bundle(SAVED_STATE_INTERNAL) {
                self.core.state = Some(internal.clone());
            }
        }

        let custom = custom_state(saved);
        with_cx!(self, backend, |cx| {
            self.delegates.on_create(&mut cx, custom);
            self.behavior.on_create(&mut cx, custom)?;
        });
        self.core.lifecycle = LifecycleState::Created;
        tracing::trace!(layer = %self.core.tag, id = self.core.id.0, "layer created");
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        backend: &mut dyn ViewBackend,
        arguments: Bundle,
    ) -> LayersResult<()> {
        self.core.arguments = Some(arguments.clone());
        with_cx!(self, backend, |cx| self.behavior.on_update(&mut cx, &arguments))
    }

    /// The view comes from the layout override, then [`Layer::layout`], then
    /// [`Layer::on_create_view`].
    pub(crate) fn create_view(
        &mut self,
        backend: &mut dyn ViewBackend,
        layout: Option<LayoutRes>,
        saved: Option<&Bundle>,
    ) -> LayersResult<Option<ViewId>> {
        let view = match layout.or_else(|| self.behavior.layout()) {
            Some(layout) => Some(backend.inflate(layout)?),
            None => with_cx!(self, backend, |cx| self
                .behavior
                .on_create_view(&mut cx, custom_state(saved))?),
        };
        self.core.set_view(view);
        Ok(view)
    }

    pub(crate) fn attach(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.core.attached = true;
        with_cx!(self, backend, |cx| {
            self.delegates.on_attach(&mut cx)?;
            self.behavior.on_attach(&mut cx);
        });
        Ok(())
    }

    pub(crate) fn bind_view(
        &mut self,
        backend: &mut dyn ViewBackend,
        view: ViewId,
        saved: Option<&Bundle>,
    ) -> LayersResult<()> {
        let custom = custom_state(saved);
        with_cx!(self, backend, |cx| {
            self.delegates.on_bind_view(&mut cx, view, custom);
            self.behavior.on_bind_view(&mut cx, view, custom)
        })
    }

    /// Restores the view hierarchy, resumes the child stack and replays host lifecycle
    /// events the view missed.
    pub(crate) fn restore_view_state(
        &mut self,
        backend: &mut dyn ViewBackend,
        state: Option<&SparseArray<Value>>,
    ) -> LayersResult<()> {
        if let (Some(view), Some(state)) = (self.core.view, state) {
            backend.restore_hierarchy_state(view, state);
        }
        if let Some(child) = self.core.child_layers.as_deref_mut() {
            child.resume_view(backend)?;
        }
        with_cx!(self, backend, |cx| {
            self.delegates.restore_view_state(&mut cx, state);
            self.behavior.on_restore_view_state(&mut cx, state);
        });

        let host = self.core.context.lifecycle();
        if host >= LifecycleState::Started {
            self.on_host_event(backend, HostEvent::Start);
        }
        if host >= LifecycleState::Resumed {
            self.on_host_event(backend, HostEvent::Resume);
        }
        Ok(())
    }

    pub(crate) fn save_view_state(
        &mut self,
        backend: &mut dyn ViewBackend,
        out: &mut SparseArray<Value>,
    ) {
        if let Some(view) = self.core.view {
            backend.save_hierarchy_state(view, out);
        }
        if let Some(child) = self.core.child_layers.as_deref_mut() {
            child.pause_view();
        }
        with_cx!(self, backend, |cx| {
            self.delegates.save_view_state(&mut cx, out);
            self.behavior.on_save_view_state(&mut cx, out);
        });
    }

    pub(crate) fn detach(&mut self, backend: &mut dyn ViewBackend) {
        with_cx!(self, backend, |cx| {
            self.behavior.on_detach(&mut cx);
            self.delegates.on_detach(&mut cx);
        });
        self.core.attached = false;
    }

    /// Tears the view down and returns it so the stack can take it out of its container.
    pub(crate) fn destroy_view(
        &mut self,
        backend: &mut dyn ViewBackend,
        save: bool,
    ) -> LayersResult<Option<ViewId>> {
        self.core.view_lifecycle = Some(LifecycleState::Destroyed);
        with_cx!(self, backend, |cx| self.behavior.on_destroy_view(&mut cx));
        if let Some(child) = self.core.child_layers.as_deref_mut() {
            child.suspend_views(backend, save)?;
        }
        with_cx!(self, backend, |cx| self.delegates.on_destroy_view(&mut cx));
        let view = self.core.view;
        self.core.set_view(None);
        Ok(view)
    }

    pub(crate) fn save_layer_state(
        &mut self,
        backend: &mut dyn ViewBackend,
        out: &mut Bundle,
    ) -> LayersResult<()> {
        if let Some(child) = self.core.child_layers.as_deref_mut()
            && let Some(state) = child.save_state(backend)?
        {
            out.put_bundle(SAVED_STATE_CHILD_LAYERS, state);
        }
        if let Some(internal) = self.core.state.as_ref().filter(|s| !s.is_empty()) {
            out.put_bundle(SAVED_STATE_INTERNAL, internal.clone());
        }
        let mut custom = Bundle::new();
        with_cx!(self, backend, |cx| {
            self.behavior.on_save_layer_state(&mut cx, &mut custom);
            self.delegates.save_layer_state(&mut cx, &mut custom);
        });
        if !custom.is_empty() {
            out.put_bundle(SAVED_STATE_CUSTOM, custom);
        }
        Ok(())
    }

    pub(crate) fn destroy(
        &mut self,
        backend: &mut dyn ViewBackend,
        finishing: bool,
    ) -> LayersResult<()> {
        self.core.finishing = finishing;
        with_cx!(self, backend, |cx| self.behavior.on_destroy(&mut cx));
        if let Some(mut child) = self.core.child_layers.take() {
            child.destroy(backend)?;
        }
        if finishing {
            self.core.clear_view_models();
        }
        self.core.lifecycle = LifecycleState::Destroyed;
        tracing::trace!(layer = %self.core.tag, id = self.core.id.0, finishing, "layer destroyed");
        Ok(())
    }

    /// The child stack gets the event first.
    pub(crate) fn on_back_pressed(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<bool> {
        if let Some(child) = self.core.child_layers.as_deref_mut()
            && child.on_back_pressed(backend)?
        {
            return Ok(true);
        }
        Ok(with_cx!(self, backend, |cx| self
            .behavior
            .on_back_pressed(&mut cx)))
    }

    /// Deliver `event` to this layer only.
    pub(crate) fn on_host_event(&mut self, backend: &mut dyn ViewBackend, event: HostEvent) {
        self.core.lifecycle = self.core.lifecycle.after(event);
        if let Some(view_state) = self.core.view_lifecycle
            && view_state != LifecycleState::Destroyed
        {
            self.core.view_lifecycle = Some(view_state.after(event));
        }
        with_cx!(self, backend, |cx| self.behavior.on_host_event(&mut cx, event));
    }

    /// Deliver `event` to this layer and everything in its child stack.
    pub(crate) fn dispatch_host_event(
        &mut self,
        backend: &mut dyn ViewBackend,
        event: HostEvent,
    ) -> LayersResult<()> {
        self.on_host_event(backend, event);
        if let Some(child) = self.core.child_layers.as_deref_mut() {
            child.dispatch_host_event(backend, event)?;
        }
        Ok(())
    }

    pub(crate) fn advance(
        &mut self,
        backend: &mut dyn ViewBackend,
        dt: Duration,
    ) -> LayersResult<()> {
        with_cx!(self, backend, |cx| self.delegates.poll(&mut cx));
        if let Some(child) = self.core.child_layers.as_deref_mut() {
            child.advance(backend, dt)?;
        }
        Ok(())
    }

    pub(crate) fn take_dismiss_request(&mut self) -> bool {
        std::mem::take(&mut self.core.dismiss_requested)
    }

    /// Runs delegate dismissal hooks. Returns true when the layer should leave the stack.
    pub(crate) fn request_dismissal(&mut self, backend: &mut dyn ViewBackend) -> bool {
        if !self.core.attached {
            return false;
        }
        let kept = with_cx!(self, backend, |cx| self.delegates.on_dismiss(&mut cx));
        !kept
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/live.rs"]
mod tests;
