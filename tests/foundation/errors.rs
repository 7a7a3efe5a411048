//! Integration tests for Error types

use sluice_foundation::{Error, ErrorContext, ErrorKind, Type};

#[test]
fn error_messages() {
    assert_eq!(
        Error::type_mismatch(Type::Float, Type::String).to_string(),
        "type mismatch: expected float, got string"
    );
    assert_eq!(
        Error::undefined_variable("score").to_string(),
        "undefined variable: score"
    );
    assert_eq!(
        Error::new(ErrorKind::IndexOutOfBounds { index: 4, length: 2 }).to_string(),
        "index out of bounds: 4 (length 2)"
    );
    assert_eq!(
        Error::new(ErrorKind::DivisionByZero).to_string(),
        "division by zero"
    );
}

#[test]
fn frames_accumulate_innermost_first() {
    let err = Error::new(ErrorKind::NullAccess)
        .in_frame("pipe stage 'map'")
        .in_frame("pipe stage 'pipe'");
    let context = err.context.expect("context");
    assert_eq!(
        context.stack,
        vec!["pipe stage 'map'".to_string(), "pipe stage 'pipe'".to_string()]
    );
    assert!(context.to_string().contains("in pipe stage 'map'"));
}

#[test]
fn context_display_with_position() {
    let context = ErrorContext::new()
        .with_source("price * qty")
        .with_position(1, 7);
    assert_eq!(context.to_string(), "at price * qty:1:7");
}

#[test]
fn compile_phase_classification() {
    assert!(Error::new(ErrorKind::LimitExceeded("constants".into())).is_compile_error());
    assert!(Error::new(ErrorKind::Unsupported("x".into())).is_compile_error());
    assert!(!Error::new(ErrorKind::DivisionByZero).is_compile_error());
    assert!(!Error::unknown_function("f").is_compile_error());
}

#[test]
fn errors_are_std_errors() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&Error::internal("boom"));
}
