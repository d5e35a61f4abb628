use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LayersError::illegal_state("x")
            .to_string()
            .contains("illegal state:")
    );
    assert!(
        LayersError::consistency("x")
            .to_string()
            .contains("internal consistency error:")
    );
    assert!(
        LayersError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        LayersError::instantiation("card")
            .to_string()
            .contains("unable to instantiate layer 'card'")
    );
}

#[test]
fn out_of_bounds_reports_index_and_len() {
    let msg = LayersError::out_of_bounds(7, 3).to_string();
    assert!(msg.contains('7'));
    assert!(msg.contains('3'));
}

#[test]
fn json_errors_map_to_serde() {
    let err: LayersError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, LayersError::Serde(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LayersError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
