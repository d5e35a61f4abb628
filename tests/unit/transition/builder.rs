use super::*;
use crate::layer::behavior::Layer;

#[derive(Default)]
struct Note {
    text: String,
}

impl Layer for Note {}

impl LayerType for Note {
    const TAG: &'static str = "note";
}

#[derive(Default)]
struct Other;

impl Layer for Other {}

impl LayerType for Other {
    const TAG: &'static str = "other";
}

#[test]
fn add_options_end_up_in_the_record() {
    let mut b = TransitionBuilder::new(TransitionKind::Add);
    b.name("n")
        .opaque(false)
        .layout(LayoutRes(4))
        .in_animation(AnimRes(1), AnimRes(2))
        .out_animation(AnimRes(3), AnimRes(4))
        .index(0);
    assert!(b.errors.is_empty());
    assert_eq!(b.index, Some(0));

    let record = b.record("note", Visibility::Opaque);
    assert_eq!(record.name.as_deref(), Some("n"));
    assert_eq!(record.visibility, Visibility::Transparent);
    assert_eq!(record.layout, Some(LayoutRes(4)));
    let set = record.animations.unwrap();
    assert_eq!(set.get(AnimationType::LowerOut), Some(AnimRes(1)));
    assert_eq!(set.get(AnimationType::UpperIn), Some(AnimRes(2)));
    assert_eq!(set.get(AnimationType::UpperOut), Some(AnimRes(3)));
    assert_eq!(set.get(AnimationType::LowerIn), Some(AnimRes(4)));
}

#[test]
fn default_visibility_applies_without_override() {
    let mut b = TransitionBuilder::new(TransitionKind::Add);
    assert_eq!(
        b.record("note", Visibility::Transparent).visibility,
        Visibility::Transparent
    );
}

#[test]
fn removal_rejects_immutable_options() {
    let mut b = TransitionBuilder::new(TransitionKind::Remove);
    b.name("x")
        .arguments(Bundle::new())
        .in_animation(AnimRes(1), AnimRes(1))
        .index(2);
    assert_eq!(b.errors.len(), 4);
    assert!(b.errors[0].contains("name"));
    assert_eq!(b.name, None);
    assert_eq!(b.index, None);
}

#[test]
fn removal_merges_overrides_into_the_entry() {
    let mut record = EntryRecord::new("note", Visibility::Opaque);
    let mut set = AnimationSet::default();
    set.set(AnimationType::UpperIn, Some(AnimRes(7)));
    record.animations = Some(set);

    let mut b = TransitionBuilder::new(TransitionKind::Remove);
    b.opaque(false).out_animation(AnimRes(8), AnimRes(9));
    assert!(b.errors.is_empty());
    b.apply_to(&mut record);

    assert_eq!(record.visibility, Visibility::Transparent);
    let set = record.animations.unwrap();
    assert_eq!(set.get(AnimationType::UpperIn), Some(AnimRes(7)));
    assert_eq!(set.get(AnimationType::UpperOut), Some(AnimRes(8)));
    assert_eq!(set.get(AnimationType::LowerIn), Some(AnimRes(9)));
}

#[test]
fn with_layer_configures_the_matching_type() {
    let mut b = TransitionBuilder::new(TransitionKind::Add).with_expected_tag(Note::TAG);
    b.with_layer::<Note>(|n| n.text = "hello".into());
    let configure = b.configure.take().unwrap();

    let mut layer: Box<dyn Layer> = Box::new(Note::default());
    configure(layer.as_mut()).unwrap();
    assert_eq!(layer.downcast_ref::<Note>().unwrap().text, "hello");
}

#[test]
fn with_layer_for_another_type_is_misuse() {
    let mut b = TransitionBuilder::new(TransitionKind::Add).with_expected_tag(Note::TAG);
    b.with_layer::<Other>(|_| {});
    assert_eq!(b.errors.len(), 1);
    assert!(b.configure.is_none());
}
