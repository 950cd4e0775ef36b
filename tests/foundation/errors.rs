//! Tests for Error construction and context

use formlogic_foundation::{Error, ErrorContext, ErrorKind, VarType};

#[test]
fn kinds_render_their_subject() {
    let err = Error::unknown_variable("nickname");
    assert!(err.is_unknown_variable());
    assert_eq!(err.to_string(), "unknown variable: nickname");

    let err = Error::type_mismatch("age", VarType::Number, "string");
    assert_eq!(
        err.to_string(),
        "type mismatch for age: expected number, got string"
    );
}

#[test]
fn context_lists_frames() {
    let err = Error::invalid_expression("unknown operator `regex`").with_context(
        ErrorContext::new()
            .with_source("rule minor")
            .with_frame("trigger"),
    );
    let context = err.context.as_ref().unwrap().to_string();
    assert!(context.starts_with("at rule minor"));
    assert!(context.contains("  in trigger"));
}

#[test]
fn converts_library_errors() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(Error::from(json_err).kind, ErrorKind::Serialization(_)));

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "form.json");
    assert!(matches!(Error::from(io_err).kind, ErrorKind::Io(_)));
}
