use super::*;

#[test]
fn sample_interpolates_between_frames() {
    let spec = AnimationSpec::slide_in(SlideDir::Right, Duration::from_millis(200))
        .with_ease(Ease::Linear);
    let start = spec.sample(Duration::ZERO);
    let mid = spec.sample(Duration::from_millis(100));
    let end = spec.sample(Duration::from_millis(400));
    assert_eq!(start.offset, Vec2::new(1.0, 0.0));
    assert!((mid.offset.x - 0.5).abs() < 1e-9);
    assert_eq!(end, AnimFrame::IDENTITY);
}

#[test]
fn zero_duration_is_complete_immediately() {
    let spec = AnimationSpec::fade_in(Duration::ZERO);
    assert_eq!(spec.progress(Duration::ZERO), 1.0);
    assert_eq!(spec.sample(Duration::ZERO).alpha, 1.0);
}

#[test]
fn animation_set_raw_round_trip() {
    let mut set = AnimationSet::default();
    set.set(AnimationType::UpperIn, Some(AnimRes(7)));
    set.set(AnimationType::LowerIn, Some(AnimRes(9)));
    let raw = set.to_raw();
    assert_eq!(raw, [0, 7, 0, 9]);
    assert_eq!(AnimationSet::from_raw(&raw).unwrap(), set);
    assert!(AnimationSet::from_raw(&[1, 2]).is_err());
}

#[test]
fn parse_builds_presets() {
    let spec = AnimationSpec::parse(
        "slide_in",
        &serde_json::json!({ "dir": "left", "duration_ms": 120, "ease": "decelerate" }),
    )
    .unwrap();
    assert_eq!(spec.duration, Duration::from_millis(120));
    assert_eq!(spec.ease, Ease::Decelerate);
    assert_eq!(spec.from.offset, Vec2::new(-1.0, 0.0));

    let fade = AnimationSpec::parse("fade_out", &serde_json::Value::Null).unwrap();
    assert_eq!(fade.duration, Duration::from_millis(300));
    assert_eq!(fade.to.alpha, 0.0);
}

#[test]
fn parse_rejects_unknown_input() {
    assert!(AnimationSpec::parse("", &serde_json::Value::Null).is_err());
    assert!(AnimationSpec::parse("spin", &serde_json::Value::Null).is_err());
    assert!(AnimationSpec::parse("slide_in", &serde_json::json!({ "dir": "diagonal" })).is_err());
    assert!(AnimationSpec::parse("fade_in", &serde_json::json!([1, 2])).is_err());
}
