use std::rc::Rc;
use std::time::Duration;

use crate::backend::view::ViewBackend;
use crate::foundation::error::LayersResult;
use crate::foundation::ids::ContainerId;
use crate::host::context::{HostContext, HostEvent, LayersConfig, LifecycleState};
use crate::layer::registry::LayerRegistry;
use crate::manager::layers::Layers;
use crate::state::bundle::Bundle;

const SAVED_STATE_LAYERS: &str = "LAYERS.SAVED_STATE_LAYERS";

/// Window-level owner of the root stack. Forwards host lifecycle callbacks to it and
/// persists it across host recreation.
#[derive(Debug)]
pub struct RootHost {
    context: Rc<HostContext>,
    layers: Layers,
    restored: bool,
    in_saved_state: bool,
}

impl RootHost {
    /// Creates the host, restoring the root stack from `saved` when given. A restored stack
    /// gets its views on [`RootHost::on_start`].
    #[tracing::instrument(level = "debug", skip_all, fields(restoring = saved.is_some()))]
    pub fn create(
        backend: &mut dyn ViewBackend,
        registry: LayerRegistry,
        config: LayersConfig,
        saved: Option<&Bundle>,
    ) -> LayersResult<Self> {
        let context = HostContext::root(registry, config);
        context.set_lifecycle(LifecycleState::Created);
        let state = saved.and_then(|s| s.get_bundle(SAVED_STATE_LAYERS));
        let layers = Layers::restore(backend, Rc::clone(&context), ContainerId::DEFAULT, state)?;
        Ok(Self {
            context,
            layers,
            restored: state.is_some(),
            in_saved_state: false,
        })
    }

    /// Root link of the host chain.
    pub fn context(&self) -> &Rc<HostContext> {
        &self.context
    }

    /// The root stack.
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// The root stack, mutably.
    pub fn layers_mut(&mut self) -> &mut Layers {
        &mut self.layers
    }

    /// Whether state was saved and the host has not been started since.
    pub fn is_in_saved_state(&self) -> bool {
        self.in_saved_state
    }

    pub fn on_start(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.in_saved_state = false;
        if std::mem::take(&mut self.restored) {
            self.layers.resume_view(backend)?;
        }
        self.layers.dispatch_host_event(backend, HostEvent::Start)
    }

    pub fn on_resume(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.layers.dispatch_host_event(backend, HostEvent::Resume)
    }

    pub fn on_pause(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.layers.dispatch_host_event(backend, HostEvent::Pause)
    }

    pub fn on_stop(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.layers.dispatch_host_event(backend, HostEvent::Stop)
    }

    /// State to hand back to [`RootHost::create`]. Nothing is saved when the host is
    /// finishing.
    pub fn on_save_state(
        &mut self,
        backend: &mut dyn ViewBackend,
        finishing: bool,
    ) -> LayersResult<Bundle> {
        self.in_saved_state = true;
        let mut out = Bundle::new();
        if !finishing && let Some(state) = self.layers.save_state(backend)? {
            out.put_bundle(SAVED_STATE_LAYERS, state);
        }
        Ok(out)
    }

    /// Tears the whole stack down.
    pub fn on_destroy(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.layers.destroy(backend)?;
        self.context.set_lifecycle(LifecycleState::Destroyed);
        Ok(())
    }

    /// Layers get the first chance; otherwise the top layer is popped when more than one is
    /// stacked. Returns false when the host should handle the press itself.
    pub fn on_back_pressed(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<bool> {
        if self.layers.on_back_pressed(backend)? {
            return Ok(true);
        }
        if self.layers.stack_size() > 1 {
            self.layers.pop(backend)?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn advance(&mut self, backend: &mut dyn ViewBackend, dt: Duration) -> LayersResult<()> {
        self.layers.advance(backend, dt)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/root.rs"]
mod tests;
