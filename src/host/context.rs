use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::foundation::error::LayersResult;
use crate::foundation::ids::{EntryId, ViewId};
use crate::layer::registry::LayerRegistry;
use crate::stack::entry::Visibility;

/// Lifecycle notification forwarded from the host window to every created layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    /// Host became visible.
    Start,
    /// Host gained focus.
    Resume,
    /// Host lost focus.
    Pause,
    /// Host is no longer visible.
    Stop,
}

/// Coarse lifecycle of a host or a layer. Ordered so that `state >= Started` reads naturally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Torn down for good.
    Destroyed,
    /// Constructed, not created yet.
    Initialized,
    /// Created, not visible.
    Created,
    /// Visible.
    Started,
    /// Visible and focused.
    Resumed,
}

impl LifecycleState {
    /// State reached after `event`.
    pub fn after(self, event: HostEvent) -> Self {
        if self == Self::Destroyed {
            return self;
        }
        match event {
            HostEvent::Start | HostEvent::Pause => Self::Started,
            HostEvent::Resume => Self::Resumed,
            HostEvent::Stop => Self::Created,
        }
    }
}

/// Engine-wide knobs, shared by every stack under one root host.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    /// Global switch for transition animations.
    pub animations_enabled: bool,
    /// Visibility given to new entries unless a transition says otherwise.
    pub default_visibility: Visibility,
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            animations_enabled: true,
            default_visibility: Visibility::Opaque,
        }
    }
}

impl LayersConfig {
    /// Parse a JSON config; missing fields fall back to defaults.
    pub fn from_json(text: &str) -> LayersResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum HostOwner {
    Root,
    Layer { tag: String, entry: EntryId },
}

/// One link of the host chain: the root window, or a layer hosting a child stack.
///
/// Every link shares the root's registry, config and lifecycle. Services registered with
/// [`HostContext::provide`] are visible to this link and every descendant.
pub struct HostContext {
    parent: Option<Rc<HostContext>>,
    owner: HostOwner,
    registry: Rc<LayerRegistry>,
    config: Rc<LayersConfig>,
    view: Cell<Option<ViewId>>,
    lifecycle: Cell<LifecycleState>,
    next_entry: Cell<u64>,
    services: RefCell<Vec<Rc<dyn Any>>>,
}

impl HostContext {
    /// Root of a host chain.
    pub fn root(registry: LayerRegistry, config: LayersConfig) -> Rc<Self> {
        Rc::new(Self {
            parent: None,
            owner: HostOwner::Root,
            registry: Rc::new(registry),
            config: Rc::new(config),
            view: Cell::new(None),
            lifecycle: Cell::new(LifecycleState::Initialized),
            next_entry: Cell::new(0),
            services: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn child(parent: &Rc<Self>, tag: &str, entry: EntryId) -> Rc<Self> {
        Rc::new(Self {
            parent: Some(Rc::clone(parent)),
            owner: HostOwner::Layer {
                tag: tag.to_owned(),
                entry,
            },
            registry: Rc::clone(&parent.registry),
            config: Rc::clone(&parent.config),
            view: Cell::new(None),
            lifecycle: Cell::new(LifecycleState::Initialized),
            next_entry: Cell::new(0),
            services: RefCell::new(Vec::new()),
        })
    }

    /// Whether this is the root window rather than a hosting layer.
    pub fn is_root(&self) -> bool {
        self.owner == HostOwner::Root
    }

    /// Layer factories shared by the whole chain.
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Engine config shared by the whole chain.
    pub fn config(&self) -> &LayersConfig {
        &self.config
    }

    /// Lifecycle of the root host.
    pub fn lifecycle(&self) -> LifecycleState {
        self.root_context().lifecycle.get()
    }

    pub(crate) fn set_lifecycle(&self, state: LifecycleState) {
        self.root_context().lifecycle.set(state);
    }

    /// The hosting layer's view, when this link is a layer.
    pub(crate) fn view(&self) -> Option<ViewId> {
        self.view.get()
    }

    pub(crate) fn set_view(&self, view: Option<ViewId>) {
        self.view.set(view);
    }

    pub(crate) fn next_entry_id(&self) -> EntryId {
        let root = self.root_context();
        let id = root.next_entry.get();
        root.next_entry.set(id + 1);
        EntryId(id)
    }

    /// Register a service for this link and its descendants. Replaces a previous service of
    /// the same type.
    pub fn provide<T: Any>(&self, service: Rc<T>) {
        let mut services = self.services.borrow_mut();
        services.retain(|s| !s.is::<T>());
        services.push(service);
    }

    /// Nearest service of type `T`, looking at this link first and then up to the root.
    pub fn find<T: Any>(&self) -> Option<Rc<T>> {
        let mut link = Some(self);
        while let Some(host) = link {
            let found = host
                .services
                .borrow()
                .iter()
                .find_map(|s| Rc::clone(s).downcast::<T>().ok());
            if found.is_some() {
                return found;
            }
            link = host.parent.as_deref();
        }
        None
    }

    pub(crate) fn parent(&self) -> Option<&Rc<HostContext>> {
        self.parent.as_ref()
    }

    fn root_context(&self) -> &HostContext {
        let mut host = self;
        while let Some(parent) = host.parent.as_deref() {
            host = parent;
        }
        host
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("owner", &self.owner)
            .field("view", &self.view.get())
            .field("lifecycle", &self.lifecycle.get())
            .field("services", &self.services.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/context.rs"]
mod tests;
