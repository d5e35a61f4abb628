use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::backend::view::ViewBackend;
use crate::foundation::error::{LayersError, LayersResult};
use crate::foundation::ids::{ContainerId, EntryId};
use crate::host::context::{HostContext, HostEvent, LifecycleState};
use crate::layer::behavior::LayerType;
use crate::layer::live::LiveLayer;
use crate::stack::entry::{EntryRecord, LayerState, StackEntry, TargetState};
use crate::stack::layer_stack::LayerStack;
use crate::state::bundle::{Bundle, SparseArray};
use crate::transition::base::{Phase, Transition};
use crate::transition::builder::{TransitionBuilder, TransitionKind};

const STATE_STACK: &str = "LAYERS.STATE_STACK";
const STATE_LAYERS: &str = "LAYERS.STATE_LAYERS";

/// Snapshot of an entry that left the stack or is about to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerHandle {
    /// Entry id.
    pub id: EntryId,
    /// Registry tag of the layer type.
    pub tag: String,
    /// Entry name, if any.
    pub name: Option<String>,
}

impl LayerHandle {
    fn of(entry: &StackEntry) -> Self {
        Self {
            id: entry.id,
            tag: entry.record.layer_type.clone(),
            name: entry.record.name.clone(),
        }
    }
}

/// Manager of one stack of layers in a container, plus stacks in other containers of the same
/// host.
///
/// Mutations are queued as transitions. A transition starts as soon as everything queued
/// before it has finished; animated transitions finish as [`Layers::advance`] moves time
/// forward.
#[derive(Debug)]
pub struct Layers {
    stack: LayerStack,
    transitions: VecDeque<Transition>,
    nested: BTreeMap<ContainerId, Layers>,
}

impl Layers {
    /// Empty manager for `container_id` of `host`.
    pub fn new(host: Rc<HostContext>, container_id: ContainerId) -> Self {
        Self {
            stack: LayerStack::new(host, container_id),
            transitions: VecDeque::new(),
            nested: BTreeMap::new(),
        }
    }

    /// Rebuilds a manager from [`Layers::save_state`] output.
    ///
    /// Layers are created but views are not: the manager starts paused until
    /// [`Layers::resume_view`]. Without saved state this is [`Layers::new`].
    #[tracing::instrument(level = "debug", skip_all, fields(container = container_id.0))]
    pub fn restore(
        backend: &mut dyn ViewBackend,
        host: Rc<HostContext>,
        container_id: ContainerId,
        saved: Option<&Bundle>,
    ) -> LayersResult<Self> {
        let mut layers = Self::new(Rc::clone(&host), container_id);
        let Some(saved) = saved else {
            return Ok(layers);
        };
        layers.stack.paused = true;

        let records = saved
            .get_parcelable_list::<EntryRecord>(STATE_STACK)?
            .unwrap_or_default();
        for record in records {
            let id = host.next_entry_id();
            layers.stack.entries.push(StackEntry::new(id, record));
        }
        for i in 0..layers.stack.len() {
            layers
                .stack
                .move_to_state(backend, i, TargetState::Created, false)?;
        }

        if let Some(nested) = saved.get::<SparseArray<Bundle>>(STATE_LAYERS) {
            for (key, state) in nested {
                let id = ContainerId(key);
                let child = Self::restore(backend, Rc::clone(&host), id, Some(&state))?;
                layers.nested.insert(id, child);
            }
        }
        tracing::debug!(entries = layers.stack.len(), "stack restored");
        Ok(layers)
    }

    /// Container this manager stacks views in.
    pub fn container_id(&self) -> ContainerId {
        self.stack.container_id
    }

    /// Host the layers of this manager belong to.
    pub fn host(&self) -> &Rc<HostContext> {
        &self.stack.host
    }

    //region Mutations

    /// Queue a new `L` on top of the stack, or at the builder's index.
    #[tracing::instrument(level = "debug", skip_all, fields(layer = L::TAG))]
    pub fn add<L: LayerType>(
        &mut self,
        backend: &mut dyn ViewBackend,
        configure: impl FnOnce(&mut TransitionBuilder),
    ) -> LayersResult<EntryId> {
        self.insert(backend, TransitionKind::Add, L::TAG, Some(L::TAG), configure)
    }

    /// [`Layers::add`] for a layer type known only by its registry tag.
    #[tracing::instrument(level = "debug", skip(self, backend, configure))]
    pub fn add_tagged(
        &mut self,
        backend: &mut dyn ViewBackend,
        tag: &str,
        configure: impl FnOnce(&mut TransitionBuilder),
    ) -> LayersResult<EntryId> {
        self.insert(backend, TransitionKind::Add, tag, None, configure)
    }

    /// Queue an `L` that takes the place of the top entry, or of the entry at the builder's
    /// index.
    #[tracing::instrument(level = "debug", skip_all, fields(layer = L::TAG))]
    pub fn replace<L: LayerType>(
        &mut self,
        backend: &mut dyn ViewBackend,
        configure: impl FnOnce(&mut TransitionBuilder),
    ) -> LayersResult<EntryId> {
        self.insert(backend, TransitionKind::Replace, L::TAG, Some(L::TAG), configure)
    }

    /// [`Layers::replace`] for a layer type known only by its registry tag.
    #[tracing::instrument(level = "debug", skip(self, backend, configure))]
    pub fn replace_tagged(
        &mut self,
        backend: &mut dyn ViewBackend,
        tag: &str,
        configure: impl FnOnce(&mut TransitionBuilder),
    ) -> LayersResult<EntryId> {
        self.insert(backend, TransitionKind::Replace, tag, None, configure)
    }

    fn insert(
        &mut self,
        backend: &mut dyn ViewBackend,
        kind: TransitionKind,
        tag: &str,
        expected: Option<&'static str>,
        configure: impl FnOnce(&mut TransitionBuilder),
    ) -> LayersResult<EntryId> {
        let mut builder = TransitionBuilder::new(kind);
        if let Some(expected) = expected {
            builder = builder.with_expected_tag(expected);
        }
        configure(&mut builder);
        check_builder(&builder, tag)?;
        if !self.stack.host.registry().contains(tag) {
            return Err(LayersError::instantiation(tag));
        }

        let len = self.stack.len();
        match (kind, builder.index) {
            (TransitionKind::Add, Some(index)) if index > len => {
                return Err(LayersError::out_of_bounds(index, len));
            }
            (TransitionKind::Replace, Some(index)) if index >= len => {
                return Err(LayersError::out_of_bounds(index, len));
            }
            _ => {}
        }

        let record = builder.record(tag, self.stack.host.config().default_visibility);
        let id = self.stack.host.next_entry_id();
        let transition = Transition::insert(&mut builder, StackEntry::new(id, record));
        self.enqueue(backend, transition)?;
        Ok(id)
    }

    /// Queue removal of the entry at `index`.
    ///
    /// The entry is bound when queued, so earlier transitions moving it around do not change
    /// which layer goes.
    #[tracing::instrument(level = "debug", skip(self, backend, configure))]
    pub fn remove(
        &mut self,
        backend: &mut dyn ViewBackend,
        index: usize,
        configure: impl FnOnce(&mut TransitionBuilder),
    ) -> LayersResult<()> {
        let len = self.stack.len();
        let entry = self
            .stack
            .entries
            .get(index)
            .ok_or_else(|| LayersError::out_of_bounds(index, len))?;
        let id = entry.id;
        let tag = entry.record.layer_type.clone();

        let mut builder = TransitionBuilder::new(TransitionKind::Remove);
        configure(&mut builder);
        check_builder(&builder, &tag)?;
        builder.apply_to(&mut self.stack.entries[index].record);
        let transition = Transition::remove(&mut builder, id);
        self.enqueue(backend, transition)
    }

    /// Queue removal of the entry `id`.
    pub fn remove_layer(
        &mut self,
        backend: &mut dyn ViewBackend,
        id: EntryId,
        configure: impl FnOnce(&mut TransitionBuilder),
    ) -> LayersResult<()> {
        let index = self
            .index_of_id(id)
            .ok_or_else(|| LayersError::argument(format!("Layer not found: {id:?}")))?;
        self.remove(backend, index, configure)
    }

    /// Queue removal of the topmost entry that is not already leaving.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn pop(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<Option<LayerHandle>> {
        let Some(index) = self
            .stack
            .entries
            .iter()
            .rposition(|e| e.valid && !self.is_pending_removal(e.id))
        else {
            return Ok(None);
        };
        let handle = LayerHandle::of(&self.stack.entries[index]);
        let mut builder = TransitionBuilder::new(TransitionKind::Remove);
        self.enqueue(backend, Transition::remove(&mut builder, handle.id))?;
        Ok(Some(handle))
    }

    /// Pops entries off the top until one named `name` is found, taking it too when
    /// `inclusive`. Returns the deepest popped entry.
    ///
    /// A `name` of `None` matches any entry: the stack is popped down to its bottom entry,
    /// or cleared entirely when `inclusive`. An unknown name leaves the stack untouched. The
    /// pops are not animated and views are reconciled once at the end.
    #[tracing::instrument(level = "debug", skip(self, backend))]
    pub fn pop_layers_to(
        &mut self,
        backend: &mut dyn ViewBackend,
        name: Option<&str>,
        inclusive: bool,
    ) -> LayersResult<Option<LayerHandle>> {
        self.fast_forward(backend)?;
        let size = self.stack.len();
        if size == 0 {
            return Ok(None);
        }
        match name {
            None if inclusive => {
                let bottom = LayerHandle::of(&self.stack.entries[0]);
                self.clear(backend)?;
                return Ok(Some(bottom));
            }
            Some(name) if self.index_of(Some(name)).is_none() => return Ok(None),
            _ => {}
        }

        let was_paused = self.stack.paused;
        self.pause_view();
        let mut last = None;
        for i in (0..size).rev() {
            let matches = name.is_some() && self.stack.entries[i].record.name.as_deref() == name;
            let pop = match name {
                None => i > 0,
                Some(_) => !matches || inclusive,
            };
            if !pop {
                break;
            }
            self.stack
                .move_to_state(backend, i, TargetState::Destroyed, false)?;
            let entry = self.stack.entries.remove(i);
            last = Some(LayerHandle::of(&entry));
            if matches {
                break;
            }
        }
        if !was_paused {
            self.resume_view(backend)?;
        }
        Ok(last)
    }

    /// Tears every entry down, top first, without animation. Returns how many were removed.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn clear(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<usize> {
        self.fast_forward(backend)?;
        let size = self.stack.len();
        if size == 0 {
            return Ok(0);
        }
        let was_paused = self.stack.paused;
        self.pause_view();
        for i in (0..size).rev() {
            self.stack
                .move_to_state(backend, i, TargetState::Destroyed, false)?;
        }
        self.stack.entries.clear();
        if !was_paused {
            self.resume_view(backend)?;
        }
        Ok(size)
    }

    /// Replace the arguments of the entry at `index` and let a live layer know.
    pub fn update(
        &mut self,
        backend: &mut dyn ViewBackend,
        index: usize,
        arguments: Bundle,
    ) -> LayersResult<()> {
        let len = self.stack.len();
        let entry = self
            .stack
            .entries
            .get_mut(index)
            .ok_or_else(|| LayersError::out_of_bounds(index, len))?;
        entry.record.arguments = Some(arguments.clone());
        if entry.state >= LayerState::Created
            && let Some(live) = entry.live.as_mut()
        {
            live.update(backend, arguments)?;
        }
        Ok(())
    }

    //endregion

    //region Queries

    /// Live layer at the top of the stack.
    pub fn peek(&self) -> Option<&LiveLayer> {
        self.stack.entries.last().and_then(|e| e.live.as_ref())
    }

    /// Live layer at `index`.
    pub fn get(&self, index: usize) -> Option<&LiveLayer> {
        self.stack.entries.get(index).and_then(|e| e.live.as_ref())
    }

    /// Live layer at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut LiveLayer> {
        self.stack
            .entries
            .get_mut(index)
            .and_then(|e| e.live.as_mut())
    }

    /// Live layer of entry `id`.
    pub fn layer(&self, id: EntryId) -> Option<&LiveLayer> {
        self.index_of_id(id).and_then(|i| self.get(i))
    }

    /// Live layer of entry `id`, mutably.
    pub fn layer_mut(&mut self, id: EntryId) -> Option<&mut LiveLayer> {
        self.index_of_id(id).and_then(|i| self.get_mut(i))
    }

    /// Topmost live layer named `name`.
    pub fn find(&self, name: &str) -> Option<&LiveLayer> {
        self.index_of(Some(name)).and_then(|i| self.get(i))
    }

    /// Index of the topmost entry whose name equals `name`.
    pub fn index_of(&self, name: Option<&str>) -> Option<usize> {
        self.stack
            .entries
            .iter()
            .rposition(|e| e.record.name.as_deref() == name)
    }

    /// Index of entry `id`.
    pub fn index_of_id(&self, id: EntryId) -> Option<usize> {
        self.stack.position(id)
    }

    /// Snapshots of all entries, bottom first.
    pub fn handles(&self) -> Vec<LayerHandle> {
        self.stack.entries.iter().map(LayerHandle::of).collect()
    }

    /// Number of entries, including ones that are leaving.
    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    /// Whether transitions are running or waiting.
    pub fn has_pending_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Whether view creation is held back.
    pub fn is_view_paused(&self) -> bool {
        self.stack.paused
    }

    fn is_pending_removal(&self, id: EntryId) -> bool {
        self.transitions
            .iter()
            .any(|t| t.kind == TransitionKind::Remove && !t.is_finished() && t.target == id)
    }

    //endregion

    /// Manager for `container_id`: this one for its own container, otherwise a nested one,
    /// created on first use.
    pub fn at(&mut self, container_id: ContainerId) -> &mut Layers {
        if container_id == self.stack.container_id {
            return self;
        }
        let host = Rc::clone(&self.stack.host);
        let paused = self.stack.paused;
        self.nested.entry(container_id).or_insert_with(|| {
            let mut layers = Layers::new(host, container_id);
            layers.stack.paused = paused;
            layers
        })
    }

    /// Reconcile views with the visibility boundary.
    pub fn ensure_views(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.stack.ensure_views(backend)
    }

    /// Let views be created again and reconcile, here and in nested managers.
    #[tracing::instrument(level = "debug", skip_all, fields(container = self.stack.container_id.0))]
    pub fn resume_view(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        if !self.stack.paused {
            return Ok(());
        }
        self.stack.paused = false;
        self.stack.ensure_views(backend)?;
        for layers in self.nested.values_mut() {
            layers.resume_view(backend)?;
        }
        Ok(())
    }

    /// Hold back view creation until [`Layers::resume_view`].
    pub fn pause_view(&mut self) {
        self.stack.paused = true;
    }

    /// Takes every view down, saving state when `save`, and pauses. Used when the view
    /// hosting this manager goes away.
    pub(crate) fn suspend_views(
        &mut self,
        backend: &mut dyn ViewBackend,
        save: bool,
    ) -> LayersResult<()> {
        self.fast_forward(backend)?;
        for i in (0..self.stack.len()).rev() {
            self.stack
                .move_to_state(backend, i, TargetState::ViewDestroyed, save)?;
        }
        self.pause_view();
        self.stack.drop_container();
        for layers in self.nested.values_mut() {
            layers.suspend_views(backend, save)?;
        }
        Ok(())
    }

    /// Persist the stack and nested stacks. Pending transitions are completed first.
    /// Returns `None` when there is nothing to save.
    #[tracing::instrument(level = "debug", skip_all, fields(container = self.stack.container_id.0))]
    pub fn save_state(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<Option<Bundle>> {
        self.fast_forward(backend)?;
        let mut out = Bundle::new();

        let valid: Vec<usize> = (0..self.stack.len())
            .filter(|&i| self.stack.entries[i].valid)
            .collect();
        for &i in valid.iter().rev() {
            if self.stack.entries[i].has_view() {
                self.stack.save_view_state(backend, i);
            }
            if self.stack.entries[i].state >= LayerState::Created {
                self.stack.save_layer_state(backend, i)?;
            }
        }
        if !valid.is_empty() {
            let entries = &self.stack.entries;
            out.put_parcelable_list(STATE_STACK, valid.iter().map(|&i| &entries[i].record));
        }

        let mut nested = SparseArray::new();
        for (id, layers) in &mut self.nested {
            if let Some(state) = layers.save_state(backend)? {
                nested.put(id.0, state);
            }
        }
        if !nested.is_empty() {
            out.put(STATE_LAYERS, nested);
        }
        tracing::debug!(entries = valid.len(), "stack saved");
        Ok((!out.is_empty()).then_some(out))
    }

    /// Permanent teardown of every entry, here and in nested managers. Queued transitions
    /// that never started are dropped.
    #[tracing::instrument(level = "debug", skip_all, fields(container = self.stack.container_id.0))]
    pub fn destroy(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        if let Some(mut running) = self.transitions.pop_front() {
            if running.phase != Phase::Building {
                running.fast_forward(&mut self.stack, backend)?;
            } else {
                self.transitions.push_front(running);
            }
        }
        if !self.transitions.is_empty() {
            tracing::warn!(dropped = self.transitions.len(), "queued transitions dropped");
            self.transitions.clear();
        }
        for i in (0..self.stack.len()).rev() {
            self.stack
                .move_to_state(backend, i, TargetState::Destroyed, false)?;
        }
        for layers in self.nested.values_mut() {
            layers.destroy(backend)?;
        }
        self.stack.drop_container();
        Ok(())
    }

    /// Offer a back press to valid entries, top first. Returns whether one took it.
    pub fn on_back_pressed(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<bool> {
        for entry in self.stack.entries.iter_mut().rev() {
            if !entry.valid || entry.state < LayerState::Created {
                continue;
            }
            if let Some(live) = entry.live.as_mut()
                && live.on_back_pressed(backend)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Moves time forward: animations, deferred dismissals, nested managers and child
    /// stacks.
    pub fn advance(&mut self, backend: &mut dyn ViewBackend, dt: Duration) -> LayersResult<()> {
        if let Some(front) = self.transitions.front_mut() {
            front.tick(&mut self.stack, backend, dt)?;
        }
        self.pump(backend)?;

        for entry in &mut self.stack.entries {
            if entry.state >= LayerState::Created
                && let Some(live) = entry.live.as_mut()
            {
                live.advance(backend, dt)?;
            }
        }
        self.process_dismissals(backend)?;

        for layers in self.nested.values_mut() {
            layers.advance(backend, dt)?;
        }
        Ok(())
    }

    /// Forward a host lifecycle event to every created layer and every child stack.
    #[tracing::instrument(level = "debug", skip(self, backend))]
    pub fn dispatch_host_event(
        &mut self,
        backend: &mut dyn ViewBackend,
        event: HostEvent,
    ) -> LayersResult<()> {
        let host = &self.stack.host;
        if host.is_root() {
            host.set_lifecycle(host.lifecycle().after(event));
        }
        for entry in &mut self.stack.entries {
            if let Some(live) = entry.live.as_mut()
                && live.lifecycle() >= LifecycleState::Created
            {
                live.dispatch_host_event(backend, event)?;
            }
        }
        for layers in self.nested.values_mut() {
            layers.dispatch_host_event(backend, event)?;
        }
        Ok(())
    }

    /// Completes every pending transition right away.
    pub fn fast_forward(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        while let Some(mut transition) = self.transitions.pop_front() {
            transition.fast_forward(&mut self.stack, backend)?;
        }
        Ok(())
    }

    fn enqueue(&mut self, backend: &mut dyn ViewBackend, transition: Transition) -> LayersResult<()> {
        tracing::debug!(
            kind = ?transition.kind,
            id = transition.target.0,
            queued = self.transitions.len(),
            "transition queued"
        );
        self.transitions.push_back(transition);
        if self.transitions.len() == 1 {
            self.pump(backend)?;
        }
        Ok(())
    }

    /// Drops finished transitions and starts the next one until one is left running.
    fn pump(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        loop {
            let Some(front) = self.transitions.front_mut() else {
                return Ok(());
            };
            match front.phase {
                Phase::Finished => {
                    self.transitions.pop_front();
                }
                Phase::Building => {
                    if let Err(err) = front.start(&mut self.stack, backend) {
                        self.transitions.pop_front();
                        return Err(err);
                    }
                }
                Phase::Started | Phase::Animating => return Ok(()),
            }
        }
    }

    fn process_dismissals(&mut self, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        let mut requested = Vec::new();
        for entry in &mut self.stack.entries {
            if let Some(live) = entry.live.as_mut()
                && live.take_dismiss_request()
                && entry.valid
                && live.request_dismissal(backend)
            {
                requested.push(entry.id);
            }
        }
        for id in requested {
            if self.is_pending_removal(id) {
                continue;
            }
            tracing::debug!(id = id.0, "layer dismissed itself");
            let mut builder = TransitionBuilder::new(TransitionKind::Remove);
            self.enqueue(backend, Transition::remove(&mut builder, id))?;
        }
        Ok(())
    }
}

fn check_builder(builder: &TransitionBuilder, tag: &str) -> LayersResult<()> {
    if !builder.errors.is_empty() {
        return Err(LayersError::illegal_state(builder.errors.join("; ")));
    }
    if let Some(expected) = builder.expected_tag
        && expected != tag
    {
        return Err(LayersError::argument(format!(
            "transition targets '{tag}', not '{expected}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/manager/layers.rs"]
mod tests;
