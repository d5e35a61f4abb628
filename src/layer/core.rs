use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::view::ViewBackend;
use crate::foundation::error::{LayersError, LayersResult};
use crate::foundation::ids::{ContainerId, EntryId, ViewId};
use crate::host::context::{HostContext, LifecycleState};
use crate::manager::layers::Layers;
use crate::state::bundle::Bundle;
use crate::state::codec::StateValue;
use crate::state::value::{Retained, Value};
use crate::state::view_model::ViewModelStore;

pub(crate) const VIEW_MODEL_STORE: &str = "_LAYER::VIEW_MODEL_STORE";

/// Engine-side bookkeeping of one live layer.
#[derive(Debug)]
pub(crate) struct LayerCore {
    pub(crate) id: EntryId,
    pub(crate) tag: String,
    pub(crate) context: Rc<HostContext>,
    pub(crate) name: Option<String>,
    pub(crate) arguments: Option<Bundle>,
    pub(crate) from_saved_state: bool,
    pub(crate) view: Option<ViewId>,
    pub(crate) attached: bool,
    pub(crate) finishing: bool,
    pub(crate) state: Option<Bundle>,
    pub(crate) child_layers: Option<Box<Layers>>,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) view_lifecycle: Option<LifecycleState>,
    pub(crate) dismiss_requested: bool,
}

impl LayerCore {
    pub(crate) fn new(id: EntryId, tag: &str, host: &Rc<HostContext>) -> Self {
        Self {
            id,
            tag: tag.to_owned(),
            context: HostContext::child(host, tag, id),
            name: None,
            arguments: None,
            from_saved_state: false,
            view: None,
            attached: false,
            finishing: false,
            state: None,
            child_layers: None,
            lifecycle: LifecycleState::Initialized,
            view_lifecycle: None,
            dismiss_requested: false,
        }
    }

    pub(crate) fn set_view(&mut self, view: Option<ViewId>) {
        self.view = view;
        self.context.set_view(view);
        self.view_lifecycle = view.map(|_| LifecycleState::Created);
    }

    pub(crate) fn view_model_store(&self) -> Option<Rc<RefCell<ViewModelStore>>> {
        match self.state.as_ref()?.get_value(VIEW_MODEL_STORE)? {
            Value::Retained(r) => r.downcast::<RefCell<ViewModelStore>>(),
            _ => None,
        }
    }

    pub(crate) fn clear_view_models(&mut self) {
        if let Some(store) = self.view_model_store() {
            store.borrow_mut().clear();
        }
        if let Some(state) = self.state.as_mut() {
            state.remove(VIEW_MODEL_STORE);
        }
    }
}

/// Hook context handed to [`Layer`](crate::Layer) and [`LayerDelegate`](crate::LayerDelegate)
/// callbacks.
pub struct LayerCx<'a> {
    pub(crate) core: &'a mut LayerCore,
    pub(crate) backend: &'a mut dyn ViewBackend,
}

impl<'a> LayerCx<'a> {
    pub(crate) fn new(core: &'a mut LayerCore, backend: &'a mut dyn ViewBackend) -> Self {
        Self { core, backend }
    }

    /// Runtime id of the stack entry holding this layer.
    pub fn id(&self) -> EntryId {
        self.core.id
    }

    /// Registered type tag.
    pub fn tag(&self) -> &str {
        &self.core.tag
    }

    /// Name given by the transition, if any.
    pub fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    /// Arguments given by the transition or the last update.
    pub fn arguments(&self) -> Option<&Bundle> {
        self.core.arguments.as_ref()
    }

    /// Typed argument lookup. Missing or mistyped arguments are an error.
    pub fn argument<T: StateValue>(&self, key: &str) -> LayersResult<T> {
        self.core
            .arguments
            .as_ref()
            .and_then(|args| args.get::<T>(key))
            .ok_or_else(|| LayersError::argument(format!("Argument {key} is not provided")))
    }

    /// Typed argument lookup that tolerates absence.
    pub fn opt_argument<T: StateValue>(&self, key: &str) -> Option<T> {
        self.core.arguments.as_ref().and_then(|args| args.get::<T>(key))
    }

    /// The layer's view, while it exists.
    pub fn view(&self) -> Option<ViewId> {
        self.core.view
    }

    /// Whether the layer is attached to its container.
    pub fn is_attached(&self) -> bool {
        self.core.attached
    }

    /// Whether the layer is being removed for good, rather than recreated.
    pub fn is_finishing(&self) -> bool {
        self.core.finishing
    }

    /// Whether the layer was created from saved state.
    pub fn is_from_saved_state(&self) -> bool {
        self.core.from_saved_state
    }

    /// The layer's own lifecycle.
    pub fn lifecycle(&self) -> LifecycleState {
        self.core.lifecycle
    }

    /// Lifecycle of the view, while it exists.
    pub fn view_lifecycle(&self) -> Option<LifecycleState> {
        self.core.view_lifecycle
    }

    /// Lifecycle of the root host.
    pub fn host_lifecycle(&self) -> LifecycleState {
        self.core.context.lifecycle()
    }

    /// The view backend.
    pub fn backend(&mut self) -> &mut dyn ViewBackend {
        &mut *self.backend
    }

    /// Read a value kept in the layer's internal state. Internal state survives view
    /// teardown and recreation.
    pub fn get_saved<T: StateValue>(&self, key: &str) -> Option<T> {
        self.core.state.as_ref().and_then(|s| s.get::<T>(key))
    }

    /// Write a value into the layer's internal state.
    pub fn set_saved<T: StateValue>(&mut self, key: &str, value: T) {
        self.core
            .state
            .get_or_insert_with(Bundle::new)
            .put(key, value);
    }

    /// The layer's own stack, hosted in its view, created on first use.
    ///
    /// While the layer has no view the stack stays paused: layers are created but views
    /// wait until the layer's view exists.
    pub fn child_layers(&mut self) -> (&mut Layers, &mut dyn ViewBackend) {
        let has_view = self.core.view.is_some();
        let context = &self.core.context;
        let layers: &mut Layers = self.core.child_layers.get_or_insert_with(|| {
            let mut layers = Layers::new(Rc::clone(context), ContainerId::DEFAULT);
            if !has_view {
                layers.pause_view();
            }
            Box::new(layers)
        });
        (layers, &mut *self.backend)
    }

    /// Store of view models kept for the lifetime of this layer.
    pub fn view_model_store(&mut self) -> Rc<RefCell<ViewModelStore>> {
        if let Some(store) = self.core.view_model_store() {
            return store;
        }
        let store = Rc::new(RefCell::new(ViewModelStore::new()));
        self.core.state.get_or_insert_with(Bundle::new).put_value(
            VIEW_MODEL_STORE,
            Value::Retained(Retained::new(Rc::clone(&store))),
        );
        store
    }

    /// Ask to be removed from the stack. Handled on the next
    /// [`Layers::advance`](crate::Layers::advance).
    pub fn dismiss(&mut self) {
        self.core.dismiss_requested = true;
    }

    /// Expose a service to the layers in this layer's child stacks.
    pub fn provide<T: Any>(&self, service: Rc<T>) {
        self.core.context.provide(service);
    }

    /// Nearest service of type `T` provided by a parent layer or the root host.
    pub fn opt_parent<T: Any>(&self) -> Option<Rc<T>> {
        self.core.context.parent().and_then(|host| host.find::<T>())
    }
}

impl std::fmt::Debug for LayerCx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerCx")
            .field("id", &self.core.id)
            .field("tag", &self.core.tag)
            .finish_non_exhaustive()
    }
}
