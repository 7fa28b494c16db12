use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ConvertError::unsupported("x")
            .to_string()
            .contains("unsupported construct:")
    );
    assert!(
        ConvertError::structural("x")
            .to_string()
            .contains("structural invariant violated:")
    );
    assert!(
        ConvertError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        ConvertError::UnknownFunction("cos".to_owned())
            .to_string()
            .contains("unknown function \"cos\"")
    );
}

#[test]
fn attribute_type_names_plug_and_kind() {
    let err = ConvertError::AttributeType {
        plug: Plug::new("ctrl", "label"),
        kind: AttrKind::String,
        expected: "double or doubleLinear",
    };
    let s = err.to_string();
    assert!(s.contains("ctrl.label"));
    assert!(s.contains("is string, expected double or doubleLinear"));
}

#[test]
fn conversion_names_construct_and_keeps_root() {
    let err = ConvertError::conversion("expression3", ConvertError::unsupported("if"));
    assert!(err.to_string().contains("\"expression3\""));
    assert!(matches!(err.root(), ConvertError::UnsupportedConstruct(_)));
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("unsupported construct"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ConvertError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
