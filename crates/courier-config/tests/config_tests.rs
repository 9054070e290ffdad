// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Courier configuration system.

use courier_config::diagnostic::{suggest_key, ConfigError};
use courier_config::model::CourierConfig;
use courier_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_courier_config() {
    let toml = r#"
[api]
base_url = "https://chat.example.com/v1"
timeout_secs = 30

[shell]
log_level = "debug"
prompt = "hermes"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.api.base_url, "https://chat.example.com/v1");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.shell.log_level, "debug");
    assert_eq!(config.shell.prompt, "hermes");
}

/// Missing sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.api.base_url, "http://localhost:8000/v1");
    assert_eq!(config.api.timeout_secs, 60);
    assert_eq!(config.shell.log_level, "info");
    assert_eq!(config.shell.prompt, "courier");
}

/// Partial section keeps defaults for the untouched keys.
#[test]
fn partial_section_keeps_other_defaults() {
    let toml = r#"
[api]
base_url = "https://staging.example.com/v1"
"#;
    let config = load_config_from_str(toml).expect("partial section should parse");
    assert_eq!(config.api.base_url, "https://staging.example.com/v1");
    assert_eq!(config.api.timeout_secs, 60);
}

/// Unknown field in [api] produces an error mentioning the bad key.
#[test]
fn unknown_field_in_api_produces_error() {
    let toml = r#"
[api]
base_uri = "http://example.com"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("base_uri"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[backend]
url = "http://example.com"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("backend"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Env-style dotted override wins over TOML (simulated via figment merge,
/// which is how the `COURIER_*` provider feeds in).
#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[api]
base_url = "http://from-toml/v1"
"#;

    let config: CourierConfig = Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("api.base_url", "http://from-env/v1"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.api.base_url, "http://from-env/v1");
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: CourierConfig = Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file("/nonexistent/path/courier.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.api.base_url, "http://localhost:8000/v1");
}

// ============================================================================
// Diagnostic tests
// ============================================================================

/// Unknown key "base_uri" in [api] produces suggestion "did you mean `base_url`?"
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[api]
base_uri = "http://example.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(!errors.is_empty(), "should have at least one error");

    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys } if {
            key == "base_uri"
                && suggestion.as_deref() == Some("base_url")
                && valid_keys.contains("timeout_secs")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'base_uri' with suggestion 'base_url', got: {errors:?}"
    );
}

/// No suggestion for a typo too distant from any valid key.
#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    assert!(suggest_key("zzzzzz", &["base_url", "timeout_secs"]).is_none());
}

/// Invalid type (string where number expected) produces a clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[api]
timeout_secs = "sixty"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("timeout_secs"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic and renders.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "base_uri".to_string(),
        suggestion: Some("base_url".to_string()),
        valid_keys: "base_url, timeout_secs".to_string(),
    };

    assert!(error.code().is_some(), "should have diagnostic code");
    let help = error.help().expect("should have help text").to_string();
    assert!(
        help.contains("did you mean `base_url`"),
        "help should contain suggestion, got: {help}"
    );

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("base_uri"), "rendered report should mention the key");
}

// ============================================================================
// Validation tests
// ============================================================================

/// load_and_validate_str with valid TOML returns Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[api]
base_url = "https://chat.example.com/v1"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.api.base_url, "https://chat.example.com/v1");
}

/// Validation catches a zero timeout.
#[test]
fn validation_catches_zero_timeout() {
    let toml = r#"
[api]
timeout_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero timeout should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("timeout_secs"))
    });
    assert!(has_validation_error, "should have validation error for zero timeout");
}

/// Validation catches a base URL without an HTTP scheme.
#[test]
fn validation_catches_bad_scheme() {
    let toml = r#"
[api]
base_url = "chat.example.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("schemeless URL should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("base_url"))
    });
    assert!(has_validation_error, "should have validation error for bad scheme");
}
