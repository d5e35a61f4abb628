use super::*;

#[derive(Default)]
struct Recorder {
    frames: Vec<(ViewId, AnimFrame)>,
    events: Vec<String>,
}

impl AnimationSink for Recorder {
    fn apply(&mut self, view: ViewId, frame: &AnimFrame) {
        self.frames.push((view, *frame));
    }

    fn started(&mut self, entry: EntryId, kind: AnimationType) {
        self.events.push(format!("start {} {kind:?}", entry.0));
    }

    fn finished(&mut self, entry: EntryId, kind: AnimationType) {
        self.events.push(format!("finish {} {kind:?}", entry.0));
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn two_animators() -> AnimatorSet {
    AnimatorSet::new(vec![
        Animator::new(
            EntryId(1),
            ViewId(10),
            AnimationType::UpperIn,
            AnimationSpec::fade_in(ms(100)),
        ),
        Animator::new(
            EntryId(0),
            ViewId(11),
            AnimationType::LowerOut,
            AnimationSpec::fade_out(ms(200)),
        ),
    ])
}

#[test]
fn group_completes_when_longest_animator_ends() {
    let mut set = two_animators();
    let mut rec = Recorder::default();

    set.start(&mut rec);
    assert_eq!(rec.events, vec!["start 1 UpperIn", "start 0 LowerOut"]);

    assert!(!set.advance(ms(100), &mut rec));
    assert!(rec.events.contains(&"finish 1 UpperIn".to_string()));
    assert!(!set.is_finished());

    assert!(set.advance(ms(100), &mut rec));
    assert_eq!(rec.events.last().map(String::as_str), Some("finish 0 LowerOut"));
}

#[test]
fn finish_callbacks_fire_exactly_once() {
    let mut set = two_animators();
    let mut rec = Recorder::default();
    set.advance(ms(500), &mut rec);
    set.advance(ms(500), &mut rec);
    set.end(&mut rec);
    let finishes = rec.events.iter().filter(|e| e.starts_with("finish")).count();
    assert_eq!(finishes, 2);
}

#[test]
fn end_jumps_to_completion_and_resets_views() {
    let mut set = two_animators();
    let mut rec = Recorder::default();
    set.advance(ms(10), &mut rec);
    set.end(&mut rec);
    assert!(set.is_finished());
    let last_for_view_10 = rec
        .frames
        .iter()
        .rev()
        .find(|(v, _)| *v == ViewId(10))
        .map(|(_, f)| *f);
    assert_eq!(last_for_view_10, Some(AnimFrame::IDENTITY));
}

#[test]
fn intermediate_frames_follow_the_spec() {
    let mut set = AnimatorSet::new(vec![Animator::new(
        EntryId(3),
        ViewId(1),
        AnimationType::UpperOut,
        AnimationSpec::fade_out(ms(100)).with_ease(crate::animation::ease::Ease::Linear),
    )]);
    let mut rec = Recorder::default();
    set.advance(ms(25), &mut rec);
    let (_, frame) = rec.frames.last().copied().unwrap();
    assert!((frame.alpha - 0.75).abs() < 1e-9);
}
