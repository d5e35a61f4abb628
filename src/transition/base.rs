use std::rc::Rc;
use std::time::Duration;

use crate::animation::animator::{AnimationSink, Animator, AnimatorSet};
use crate::animation::spec::{AnimFrame, AnimationSet, AnimationType};
use crate::backend::view::ViewBackend;
use crate::foundation::error::{LayersError, LayersResult};
use crate::foundation::ids::{EntryId, ViewId};
use crate::stack::entry::StackEntry;
use crate::stack::layer_stack::LayerStack;
use crate::transition::builder::{Configurator, TransitionBuilder, TransitionKind};
use crate::transition::{add, remove, replace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Building,
    Started,
    Animating,
    Finished,
}

/// One queued stack mutation and the animations it drives.
pub(crate) struct Transition {
    pub(crate) kind: TransitionKind,
    pub(crate) phase: Phase,
    /// New entry for adds and replaces, moved into the stack on start.
    pub(super) entry: Option<StackEntry>,
    /// Entry the transition is about: the new one, or the one being removed.
    pub(crate) target: EntryId,
    pub(super) index: Option<usize>,
    pub(super) animation_enabled: bool,
    pub(super) animations: Option<AnimationSet>,
    configure: Option<Configurator>,
    pending: Vec<Animator>,
    animators: AnimatorSet,
    pub(super) lowest_visible: Option<usize>,
    pub(super) replaced: Option<EntryId>,
    pub(super) animated: bool,
}

impl Transition {
    pub(crate) fn insert(builder: &mut TransitionBuilder, entry: StackEntry) -> Self {
        let mut t = Self::bare(builder.kind(), entry.id, builder);
        t.animations = entry.record.animations;
        t.entry = Some(entry);
        t
    }

    pub(crate) fn remove(builder: &mut TransitionBuilder, target: EntryId) -> Self {
        Self::bare(TransitionKind::Remove, target, builder)
    }

    fn bare(kind: TransitionKind, target: EntryId, builder: &mut TransitionBuilder) -> Self {
        Self {
            kind,
            phase: Phase::Building,
            entry: None,
            target,
            index: builder.index,
            animation_enabled: builder.animation_enabled,
            animations: None,
            configure: builder.configure.take(),
            pending: Vec::new(),
            animators: AnimatorSet::default(),
            lowest_visible: None,
            replaced: None,
            animated: false,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Instantiates the layer, mutates the stack and starts the collected animations. Without
    /// animations the transition finishes right away.
    pub(crate) fn start(
        &mut self,
        stack: &mut LayerStack,
        backend: &mut dyn ViewBackend,
    ) -> LayersResult<()> {
        if self.phase != Phase::Building {
            return Err(LayersError::illegal_state(format!(
                "{:?} transition already started",
                self.kind
            )));
        }

        match self.kind {
            TransitionKind::Add | TransitionKind::Replace => {
                let host = Rc::clone(&stack.host);
                let entry = self
                    .entry
                    .as_mut()
                    .ok_or_else(|| LayersError::consistency("transition entry is missing"))?;
                let live = entry.instantiate(&host)?;
                if let Some(configure) = self.configure.take() {
                    configure(live.layer_mut())?;
                }
            }
            TransitionKind::Remove => {
                if let Some(i) = stack.position(self.target)
                    && let Some(live) = stack.entries[i].live.as_mut()
                    && let Some(configure) = self.configure.take()
                {
                    configure(live.layer_mut())?;
                }
            }
        }

        self.phase = Phase::Started;
        tracing::debug!(kind = ?self.kind, id = self.target.0, "transition started");
        match self.kind {
            TransitionKind::Add => add::on_transition(self, stack, backend)?,
            TransitionKind::Remove => remove::on_transition(self, stack, backend)?,
            TransitionKind::Replace => replace::on_transition(self, stack, backend)?,
        }

        if self.pending.is_empty() {
            return self.finish(stack, backend);
        }
        self.phase = Phase::Animating;
        self.animators = AnimatorSet::new(std::mem::take(&mut self.pending));
        tracing::trace!(count = self.animators.len(), "animations started");
        let mut sink = StackSink::new(&mut stack.entries, backend);
        self.animators.start(&mut sink);
        Ok(())
    }

    /// Advances running animations by `dt`, finishing the transition once they are done.
    pub(crate) fn tick(
        &mut self,
        stack: &mut LayerStack,
        backend: &mut dyn ViewBackend,
        dt: Duration,
    ) -> LayersResult<()> {
        if self.phase != Phase::Animating {
            return Ok(());
        }
        let done = {
            let mut sink = StackSink::new(&mut stack.entries, backend);
            self.animators.advance(dt, &mut sink)
        };
        if done {
            self.finish(stack, backend)?;
        }
        Ok(())
    }

    /// Runs the transition to completion: starts it if needed and ends animations at their
    /// final state.
    pub(crate) fn fast_forward(
        &mut self,
        stack: &mut LayerStack,
        backend: &mut dyn ViewBackend,
    ) -> LayersResult<()> {
        if self.phase == Phase::Building {
            self.start(stack, backend)?;
        }
        if self.phase == Phase::Animating {
            {
                let mut sink = StackSink::new(&mut stack.entries, backend);
                self.animators.end(&mut sink);
            }
            self.finish(stack, backend)?;
        }
        Ok(())
    }

    fn finish(&mut self, stack: &mut LayerStack, backend: &mut dyn ViewBackend) -> LayersResult<()> {
        self.phase = Phase::Finished;
        match self.kind {
            TransitionKind::Add => add::on_after_transition(self, stack, backend)?,
            TransitionKind::Remove => remove::on_after_transition(self, stack, backend)?,
            TransitionKind::Replace => replace::on_after_transition(self, stack, backend)?,
        }
        tracing::debug!(kind = ?self.kind, id = self.target.0, "transition finished");
        Ok(())
    }

    /// Queues an animation of `kind` for the entry at `index`. Nothing is queued when
    /// animations are off, the stack is paused, or the layer has no view in the container.
    pub(super) fn animate_layer(
        &mut self,
        stack: &LayerStack,
        backend: &dyn ViewBackend,
        index: usize,
        kind: AnimationType,
    ) -> LayersResult<()> {
        let entry = stack
            .entries
            .get(index)
            .ok_or_else(|| LayersError::out_of_bounds(index, stack.len()))?;
        let live = entry
            .live
            .as_ref()
            .ok_or_else(|| LayersError::consistency("layer instance must exist"))?;

        let enabled = self.animation_enabled && stack.host.config().animations_enabled;
        if !enabled || stack.paused || !live.is_view_in_layout() {
            return Ok(());
        }
        let Some(view) = live.view() else {
            return Ok(());
        };

        let spec = live.animation(kind).or_else(|| {
            self.animations
                .and_then(|set| set.get(kind))
                .and_then(|res| backend.load_animation(res))
        });
        if let Some(spec) = spec {
            tracing::trace!(index, ?kind, "animation queued");
            self.pending.push(Animator::new(entry.id, view, kind, spec));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .field("target", &self.target)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Routes animator output to the backend and to the layers being animated.
struct StackSink<'a> {
    entries: &'a mut [StackEntry],
    backend: &'a mut dyn ViewBackend,
}

impl<'a> StackSink<'a> {
    fn new(entries: &'a mut [StackEntry], backend: &'a mut dyn ViewBackend) -> Self {
        Self { entries, backend }
    }

    fn live(&mut self, id: EntryId) -> Option<&mut crate::layer::live::LiveLayer> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .and_then(|e| e.live.as_mut())
    }
}

impl AnimationSink for StackSink<'_> {
    fn apply(&mut self, view: ViewId, frame: &AnimFrame) {
        self.backend.apply_frame(view, frame);
    }

    fn started(&mut self, entry: EntryId, kind: AnimationType) {
        if let Some(live) = self.live(entry) {
            live.animation_started(kind);
        }
    }

    fn finished(&mut self, entry: EntryId, kind: AnimationType) {
        if let Some(live) = self.live(entry) {
            live.animation_finished(kind);
        }
    }
}
