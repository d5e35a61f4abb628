use std::time::Duration;

use crate::animation::spec::{AnimFrame, AnimationSpec, AnimationType};
use crate::foundation::ids::{EntryId, ViewId};

/// Receiver for animator output: frames for views and lifecycle callbacks for layers.
pub(crate) trait AnimationSink {
    fn apply(&mut self, view: ViewId, frame: &AnimFrame);
    fn started(&mut self, entry: EntryId, kind: AnimationType);
    fn finished(&mut self, entry: EntryId, kind: AnimationType);
}

#[derive(Debug)]
pub(crate) struct Animator {
    entry: EntryId,
    view: ViewId,
    kind: AnimationType,
    spec: AnimationSpec,
    elapsed: Duration,
    done: bool,
}

impl Animator {
    pub(crate) fn new(entry: EntryId, view: ViewId, kind: AnimationType, spec: AnimationSpec) -> Self {
        Self {
            entry,
            view,
            kind,
            spec,
            elapsed: Duration::ZERO,
            done: false,
        }
    }

    fn finish(&mut self, sink: &mut dyn AnimationSink) {
        self.done = true;
        sink.apply(self.view, &AnimFrame::IDENTITY);
        sink.finished(self.entry, self.kind);
    }
}

/// Animations that play together and complete as one group.
#[derive(Debug, Default)]
pub(crate) struct AnimatorSet {
    animators: Vec<Animator>,
    started: bool,
}

impl AnimatorSet {
    pub(crate) fn new(animators: Vec<Animator>) -> Self {
        Self {
            animators,
            started: false,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.animators.len()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.started && self.animators.iter().all(|a| a.done)
    }

    /// Fire start callbacks and apply the first frame of every animator.
    pub(crate) fn start(&mut self, sink: &mut dyn AnimationSink) {
        if self.started {
            return;
        }
        self.started = true;
        for a in &mut self.animators {
            sink.started(a.entry, a.kind);
            sink.apply(a.view, &a.spec.sample(Duration::ZERO));
        }
    }

    /// Step every running animator by `dt`. Returns true once the whole group is done.
    pub(crate) fn advance(&mut self, dt: Duration, sink: &mut dyn AnimationSink) -> bool {
        self.start(sink);
        for a in self.animators.iter_mut().filter(|a| !a.done) {
            a.elapsed = a.elapsed.saturating_add(dt);
            if a.spec.progress(a.elapsed) >= 1.0 {
                a.finish(sink);
            } else {
                sink.apply(a.view, &a.spec.sample(a.elapsed));
            }
        }
        self.is_finished()
    }

    /// Jump every running animator to its end, firing finish callbacks synchronously.
    pub(crate) fn end(&mut self, sink: &mut dyn AnimationSink) {
        self.start(sink);
        for a in self.animators.iter_mut().filter(|a| !a.done) {
            a.finish(sink);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
