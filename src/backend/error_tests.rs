use super::RegistryError;

#[test]
fn test_unknown_adapter_message_names_both_sides() {
    let err = RegistryError::UnknownAdapter {
        name: "rustdoc".into(),
        referenced_by: "domain 'rust'".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("rustdoc"));
    assert!(msg.contains("domain 'rust'"));
}

#[test]
fn test_invalid_pattern_carries_source() {
    let source = regex::Regex::new("(").unwrap_err();
    let err = RegistryError::InvalidPattern {
        adapter: "man".into(),
        pattern: "(".into(),
        source,
    };
    assert!(err.to_string().contains("man"));
}
