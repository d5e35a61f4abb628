use std::rc::Rc;
use std::time::Duration;

use crate::animation::spec::{AnimFrame, AnimationSpec, AnimationType};
use crate::backend::headless::HeadlessBackend;
use crate::foundation::error::LayersError;
use crate::foundation::ids::{AnimRes, ContainerId, LayoutRes};
use crate::host::context::{HostContext, LayersConfig};
use crate::layer::behavior::{Layer, LayerType};
use crate::layer::registry::LayerRegistry;
use crate::stack::entry::{LayerState, StackEntry};
use crate::stack::layer_stack::LayerStack;
use crate::transition::base::{Phase, Transition};
use crate::transition::builder::{TransitionBuilder, TransitionKind};

const FADE_IN: AnimRes = AnimRes(1);
const FADE_OUT: AnimRes = AnimRes(2);

#[derive(Default)]
struct Card;

impl Layer for Card {
    fn layout(&self) -> Option<LayoutRes> {
        Some(LayoutRes(1))
    }
}

impl LayerType for Card {
    const TAG: &'static str = "card";
}

#[derive(Default)]
struct Spinner {
    events: Vec<String>,
}

impl Layer for Spinner {
    fn layout(&self) -> Option<LayoutRes> {
        Some(LayoutRes(2))
    }

    fn animation(&self, kind: AnimationType) -> Option<AnimationSpec> {
        (kind == AnimationType::UpperIn).then(|| AnimationSpec::fade_in(ms(50)))
    }

    fn on_animation_start(&mut self, kind: AnimationType) {
        self.events.push(format!("start {kind:?}"));
    }

    fn on_animation_finish(&mut self, kind: AnimationType) {
        self.events.push(format!("finish {kind:?}"));
    }
}

impl LayerType for Spinner {
    const TAG: &'static str = "spinner";
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn setup(config: LayersConfig) -> (LayerStack, HeadlessBackend) {
    let registry = LayerRegistry::new().with::<Card>().with::<Spinner>();
    let host = HostContext::root(registry, config);
    let mut backend = HeadlessBackend::new();
    backend.register_animation(FADE_IN, AnimationSpec::fade_in(ms(100)));
    backend.register_animation(FADE_OUT, AnimationSpec::fade_out(ms(100)));
    (LayerStack::new(host, ContainerId::DEFAULT), backend)
}

fn insert(
    stack: &LayerStack,
    kind: TransitionKind,
    tag: &str,
    configure: impl FnOnce(&mut TransitionBuilder),
) -> Transition {
    let mut b = TransitionBuilder::new(kind);
    configure(&mut b);
    let record = b.record(tag, stack.host.config().default_visibility);
    let entry = StackEntry::new(stack.host.next_entry_id(), record);
    Transition::insert(&mut b, entry)
}

fn removal(stack: &LayerStack, index: usize) -> Transition {
    let mut b = TransitionBuilder::new(TransitionKind::Remove);
    Transition::remove(&mut b, stack.entries[index].id)
}

fn settle(t: &mut Transition, stack: &mut LayerStack, backend: &mut HeadlessBackend) {
    for _ in 0..100 {
        if t.is_finished() {
            return;
        }
        t.tick(stack, backend, ms(16)).unwrap();
    }
    panic!("transition never finished");
}

fn seeded(count: usize) -> (LayerStack, HeadlessBackend) {
    let (mut stack, mut backend) = setup(LayersConfig::default());
    for _ in 0..count {
        let mut t = insert(&stack, TransitionKind::Add, "card", |b| {
            b.animation_enabled(false);
        });
        t.start(&mut stack, &mut backend).unwrap();
        assert!(t.is_finished());
    }
    backend.clear_ops();
    (stack, backend)
}

#[test]
fn animated_add_keeps_the_lower_view_until_done() {
    let (mut stack, mut backend) = seeded(1);
    let mut t = insert(&stack, TransitionKind::Add, "card", |b| {
        b.in_animation(FADE_OUT, FADE_IN);
    });
    t.start(&mut stack, &mut backend).unwrap();

    assert_eq!(t.phase, Phase::Animating);
    assert_eq!(stack.len(), 2);
    assert!(stack.entries[1].in_transition);
    assert!(stack.entries[0].has_view());
    let upper = stack.entries[1].live.as_ref().and_then(|l| l.view()).unwrap();
    assert_eq!(backend.frame(upper).unwrap().alpha, 0.0);

    settle(&mut t, &mut stack, &mut backend);
    assert!(!stack.entries[1].in_transition);
    assert!(!stack.entries[0].has_view());
    assert_eq!(stack.entries[0].state, LayerState::Created);
    assert_eq!(backend.frame(upper), Some(AnimFrame::IDENTITY));
}

#[test]
fn starting_twice_is_illegal() {
    let (mut stack, mut backend) = seeded(0);
    let mut t = insert(&stack, TransitionKind::Add, "card", |_| {});
    t.start(&mut stack, &mut backend).unwrap();
    assert!(matches!(
        t.start(&mut stack, &mut backend),
        Err(LayersError::IllegalState(_))
    ));
}

#[test]
fn global_switch_disables_animations() {
    let (mut stack, mut backend) = setup(LayersConfig {
        animations_enabled: false,
        ..LayersConfig::default()
    });
    let mut t = insert(&stack, TransitionKind::Add, "card", |b| {
        b.in_animation(FADE_OUT, FADE_IN);
    });
    t.start(&mut stack, &mut backend).unwrap();
    assert!(t.is_finished());
    assert!(stack.entries[0].has_view());
}

#[test]
fn layer_override_wins_and_gets_callbacks() {
    let (mut stack, mut backend) = seeded(1);
    let mut t = insert(&stack, TransitionKind::Add, "spinner", |b| {
        b.opaque(false);
    });
    t.start(&mut stack, &mut backend).unwrap();
    assert_eq!(t.phase, Phase::Animating);
    settle(&mut t, &mut stack, &mut backend);

    let spinner = stack.entries[1]
        .live
        .as_ref()
        .and_then(|l| l.downcast_ref::<Spinner>())
        .unwrap();
    assert_eq!(spinner.events, vec!["start UpperIn", "finish UpperIn"]);
    assert!(stack.entries[0].has_view());
}

#[test]
fn removal_reveals_the_layer_below_first() {
    let (mut stack, mut backend) = seeded(2);
    assert!(!stack.entries[0].has_view());

    let mut t = removal(&stack, 1);
    stack.entries[1].record.animations = {
        let mut set = crate::animation::spec::AnimationSet::default();
        set.set(AnimationType::UpperOut, Some(FADE_OUT));
        Some(set)
    };
    t.start(&mut stack, &mut backend).unwrap();
    assert_eq!(t.phase, Phase::Animating);
    assert!(!stack.entries[1].valid);
    assert!(stack.entries[0].has_view());
    assert_eq!(stack.len(), 2);

    settle(&mut t, &mut stack, &mut backend);
    assert_eq!(stack.len(), 1);
    assert!(stack.entries[0].has_view());
    assert!(!stack.entries[0].in_transition);
}

#[test]
fn removal_of_a_vanished_entry_is_a_no_op() {
    let (mut stack, mut backend) = seeded(1);
    let mut t = removal(&stack, 0);
    stack.remove_layer_at(&mut backend, 0).unwrap();
    t.start(&mut stack, &mut backend).unwrap();
    assert!(t.is_finished());
    assert_eq!(stack.len(), 0);
}

#[test]
fn replace_swaps_the_top_entry() {
    let (mut stack, mut backend) = seeded(2);
    let bottom = stack.entries[0].id;
    let mut t = insert(&stack, TransitionKind::Replace, "spinner", |_| {});
    let new_id = t.target;
    t.start(&mut stack, &mut backend).unwrap();
    assert_eq!(stack.len(), 3);
    assert!(!stack.entries[1].valid);

    settle(&mut t, &mut stack, &mut backend);
    let ids: Vec<_> = stack.entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![bottom, new_id]);
    assert!(stack.entries[1].has_view());
    assert!(!stack.entries[0].has_view());
}

#[test]
fn replace_at_index_checks_bounds_on_start() {
    let (mut stack, mut backend) = seeded(1);
    let mut t = insert(&stack, TransitionKind::Replace, "card", |b| {
        b.index(3);
    });
    assert!(matches!(
        t.start(&mut stack, &mut backend),
        Err(LayersError::IndexOutOfBounds { index: 3, len: 1 })
    ));
}

#[test]
fn fast_forward_lands_on_the_final_shape() {
    let (mut stack, mut backend) = seeded(1);
    let mut t = insert(&stack, TransitionKind::Replace, "card", |b| {
        b.in_animation(FADE_OUT, FADE_IN);
    });
    t.fast_forward(&mut stack, &mut backend).unwrap();
    assert!(t.is_finished());
    assert_eq!(stack.len(), 1);
    assert!(stack.entries.iter().all(|e| e.valid && !e.in_transition));
    assert_eq!(Rc::strong_count(&stack.host), 1 + stack.len());
}
