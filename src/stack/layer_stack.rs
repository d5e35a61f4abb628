use std::rc::Rc;

use crate::backend::view::ViewBackend;
use crate::foundation::error::{LayersError, LayersResult};
use crate::foundation::ids::{ContainerId, EntryId, ViewId};
use crate::host::context::HostContext;
use crate::layer::live::LiveLayer;
use crate::state::bundle::{Bundle, SparseArray};
use crate::stack::entry::{LayerState, StackEntry, TargetState};

/// Ordered entries of one container plus the view machinery that keeps them in sync with
/// the backend. Index 0 is the bottom.
#[derive(Debug)]
pub(crate) struct LayerStack {
    pub(crate) host: Rc<HostContext>,
    pub(crate) container_id: ContainerId,
    pub(crate) entries: Vec<StackEntry>,
    pub(crate) paused: bool,
    container: Option<ViewId>,
}

impl LayerStack {
    pub(crate) fn new(host: Rc<HostContext>, container_id: ContainerId) -> Self {
        Self {
            host,
            container_id,
            entries: Vec::new(),
            paused: false,
            container: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Topmost entry that is opaque and not in transition, inclusive. Falls back to the
    /// bottom when nothing qualifies.
    pub(crate) fn lowest_visible(&self) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let found = self
            .entries
            .iter()
            .rposition(|e| !e.in_transition && e.is_opaque());
        Some(found.unwrap_or(0))
    }

    /// Marks entries strictly above `from` as in transition. The entry at `from` stays put so
    /// the boundary does not move while the transition runs.
    pub(crate) fn set_transition_state(&mut self, from: usize) {
        for entry in self.entries.iter_mut().skip(from + 1) {
            entry.in_transition = true;
        }
    }

    pub(crate) fn reset_transition_state(&mut self, from: usize) {
        for entry in self.entries.iter_mut().skip(from) {
            entry.in_transition = false;
        }
    }

    pub(crate) fn drop_container(&mut self) {
        self.container = None;
    }

    /// Brings every entry in line with the visibility boundary: views below it are saved
    /// and destroyed, views at or above it are created.
    pub(crate) fn ensure_views(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        if self.paused {
            return Ok(());
        }
        let Some(lowest) = self.lowest_visible() else {
            return Ok(());
        };
        for i in 0..self.entries.len() {
            if i < lowest {
                self.move_to_state(backend, i, TargetState::ViewDestroyed, true)?;
            } else {
                self.move_to_state(backend, i, TargetState::ViewCreated, false)?;
            }
        }
        Ok(())
    }

    /// Walks entry `index` one step at a time towards `target`. View creation is skipped
    /// while paused.
    pub(crate) fn move_to_state(
        &mut self,
        backend: &mut dyn ViewBackend,
        index: usize,
        target: TargetState,
        save: bool,
    ) -> LayersResult<()> {
        let goal = target.resolve();
        let current = self
            .entries
            .get(index)
            .map(|e| e.state)
            .ok_or_else(|| LayersError::out_of_bounds(index, self.entries.len()))?;

        if target.is_upward() {
            if current == LayerState::Empty {
                self.create_layer(backend, index)?;
                self.entries[index].state = LayerState::Created;
            }
            if goal == LayerState::ViewCreated
                && self.entries[index].state == LayerState::Created
                && !self.paused
            {
                self.create_view(backend, index)?;
                self.entries[index].state = LayerState::ViewCreated;
            }
        } else {
            if current == LayerState::ViewCreated && goal < LayerState::ViewCreated {
                self.destroy_view(backend, index, save)?;
                self.entries[index].state = LayerState::Created;
            }
            if self.entries[index].state == LayerState::Created && goal == LayerState::Empty {
                self.destroy_layer(backend, index, save)?;
                self.entries[index].state = LayerState::Empty;
            }
        }
        Ok(())
    }

    fn create_layer(&mut self, backend: &mut dyn ViewBackend, index: usize) -> LayersResult<()> {
        let host = Rc::clone(&self.host);
        let entry = &mut self.entries[index];
        let arguments = entry.record.arguments.clone();
        let name = entry.record.name.clone();
        let saved = entry.record.layer_state.clone();
        entry
            .instantiate(&host)?
            .create(backend, arguments, name, saved.as_ref())?;
        tracing::debug!(index, layer = %entry.record.layer_type, "layer created");
        Ok(())
    }

    fn create_view(&mut self, backend: &mut dyn ViewBackend, index: usize) -> LayersResult<()> {
        let in_layout = self.entries[index].live_mut()?.is_view_in_layout();
        let container = if in_layout {
            Some(self.container(backend)?)
        } else {
            None
        };
        let later_views = self.entries[index + 1..]
            .iter()
            .filter(|e| {
                e.has_view() && e.live.as_ref().is_some_and(LiveLayer::is_view_in_layout)
            })
            .count();

        let entry = &mut self.entries[index];
        let saved = entry.record.layer_state.as_ref();
        let live = entry
            .live
            .as_mut()
            .ok_or_else(|| LayersError::consistency("layer instance must exist"))?;
        let view = live.create_view(backend, entry.record.layout, saved)?;

        if let (Some(view), Some(container)) = (view, container) {
            let position = backend.child_count(container).saturating_sub(later_views);
            backend.add_child(container, view, position)?;
            tracing::trace!(index, ?view, position, "view added");
        }

        live.attach(backend)?;
        if let Some(view) = view {
            live.bind_view(backend, view, saved)?;
            live.restore_view_state(backend, entry.record.view_state.as_ref())?;
        }
        Ok(())
    }

    pub(crate) fn save_view_state(&mut self, backend: &mut dyn ViewBackend, index: usize) {
        let entry = &mut self.entries[index];
        let Some(live) = entry.live.as_mut() else {
            return;
        };
        let mut out = SparseArray::new();
        live.save_view_state(backend, &mut out);
        if !out.is_empty() {
            entry.record.view_state = Some(out);
        }
    }

    pub(crate) fn save_layer_state(
        &mut self,
        backend: &mut dyn ViewBackend,
        index: usize,
    ) -> LayersResult<()> {
        let entry = &mut self.entries[index];
        let Some(live) = entry.live.as_mut() else {
            return Ok(());
        };
        let mut out = Bundle::new();
        live.save_layer_state(backend, &mut out)?;
        if !out.is_empty() {
            entry.record.layer_state = Some(out);
        }
        Ok(())
    }

    fn destroy_view(
        &mut self,
        backend: &mut dyn ViewBackend,
        index: usize,
        save: bool,
    ) -> LayersResult<()> {
        if save && self.entries[index].has_view() {
            self.save_view_state(backend, index);
        }
        let live = self.entries[index].live_mut()?;
        let in_layout = live.is_view_in_layout();
        live.detach(backend);
        let view = live.destroy_view(backend, save)?;

        if let Some(view) = view {
            if in_layout {
                let container = self.container(backend)?;
                backend.remove_child(container, view)?;
            }
            backend.release_view(view);
            tracing::trace!(index, ?view, "view removed");
        }
        Ok(())
    }

    fn destroy_layer(
        &mut self,
        backend: &mut dyn ViewBackend,
        index: usize,
        save: bool,
    ) -> LayersResult<()> {
        if save {
            self.save_layer_state(backend, index)?;
        }
        let entry = &mut self.entries[index];
        if let Some(mut live) = entry.live.take() {
            live.destroy(backend, !save)?;
        }
        tracing::debug!(index, layer = %entry.record.layer_type, save, "layer destroyed");
        Ok(())
    }

    /// Inserts `entry` at `index` (the top when `None`) and reconciles views.
    pub(crate) fn add_entry(
        &mut self,
        backend: &mut dyn ViewBackend,
        entry: StackEntry,
        index: Option<usize>,
    ) -> LayersResult<usize> {
        let len = self.entries.len();
        let at = index.unwrap_or(len);
        if at > len {
            return Err(LayersError::out_of_bounds(at, len));
        }
        let id = entry.id;
        self.entries.insert(at, entry);
        if let Err(err) = self.ensure_views(backend) {
            self.discard(backend, id);
            return Err(err);
        }
        Ok(at)
    }

    /// Takes a half-built entry back out after it failed to come up.
    fn discard(&mut self, backend: &mut dyn ViewBackend, id: EntryId) {
        let Some(index) = self.position(id) else {
            return;
        };
        if let Err(err) = self.move_to_state(backend, index, TargetState::Destroyed, false) {
            tracing::warn!(id = id.0, %err, "failed entry did not tear down cleanly");
        }
        self.entries.remove(index);
        if let Err(err) = self.ensure_views(backend) {
            tracing::warn!(id = id.0, %err, "views not reconciled after dropping failed entry");
        }
    }

    /// Destroys the entry without saving, removes it and reconciles views. Out of range
    /// indices are ignored.
    pub(crate) fn remove_layer_at(
        &mut self,
        backend: &mut dyn ViewBackend,
        index: usize,
    ) -> LayersResult<Option<StackEntry>> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        self.move_to_state(backend, index, TargetState::Destroyed, false)?;
        let entry = self.entries.remove(index);
        self.ensure_views(backend)?;
        Ok(Some(entry))
    }

    /// Container for this stack's views, resolved once and cached.
    pub(crate) fn container(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<ViewId> {
        if let Some(container) = self.container {
            return Ok(container);
        }
        let id = self.container_id;
        let found = if self.host.is_root() {
            if id.is_default() {
                Some(backend.default_container()?)
            } else {
                backend.find_view(None, id)
            }
        } else {
            let host_view = self.host.view().ok_or_else(|| {
                LayersError::container_not_found(format!("host layer of {id:?} has no view"))
            })?;
            if id.is_default() {
                Some(host_view)
            } else {
                backend.find_view(Some(host_view), id)
            }
        };
        let container =
            found.ok_or_else(|| LayersError::container_not_found(format!("{id:?}")))?;
        backend.set_save_from_parent_enabled(container, false);
        self.container = Some(container);
        Ok(container)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stack/layer_stack.rs"]
mod tests;
