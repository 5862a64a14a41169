use evsyn_core::errors::{ErrorInfo, EvsynError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("n_studies", 1)
        .with_context("reason", "example")
}

#[test]
fn validation_error_surface() {
    let err = EvsynError::Validation(sample_info("too-few-studies", "at least 2 studies required"));
    assert_eq!(err.info().code, "too-few-studies");
    assert_eq!(err.info().context["n_studies"], "1");
    assert!(err.is_validation());
}

#[test]
fn computation_error_surface() {
    let err = EvsynError::computation("ill-conditioned", "matrix is ill-conditioned");
    assert_eq!(err.info().code, "ill-conditioned");
    assert!(!err.is_validation());
}

#[test]
fn display_includes_context_and_hint() {
    let err = EvsynError::Config(sample_info("empty-plan", "no analyses").with_hint("add `pool`"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("config error: no analyses (code: empty-plan)"));
    assert!(rendered.contains("n_studies=1, reason=example"));
    assert!(rendered.ends_with("hint: add `pool`"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = EvsynError::Serde(ErrorInfo::new("json_deserialize", "bad input"));
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["family"], "Serde");
    assert_eq!(value["detail"]["code"], "json_deserialize");
    let back: EvsynError = serde_json::from_value(value).unwrap();
    assert_eq!(back, err);
}
