// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Switchyard configuration system.

use switchyard_config::diagnostic::ConfigError;
use switchyard_config::model::SwitchyardConfig;
use switchyard_config::{load_and_validate_str, load_config_from_str};
use switchyard_core::TaskCategory;

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_switchyard_config() {
    let toml = r#"
[logging]
level = "debug"
format = "compact"

[budget]
soft_limit = 10000
hard_limit = 20000
critical_limit = 30000
ceiling = 40000

[guard]
max_hops = 3
chain_ttl_secs = 60

[classifier]
min_confidence = 0.5
category_priority = ["security_review", "debugging"]

[classifier.signals.debugging]
debug_terms = ["segfault", "panic"]

[[profiles]]
category = "debugging"
provider = "anthropic"
model = "claude-sonnet-4-20250514"
specialist_agent_id = "debug_agent"
priority = 5

[default_profile]
provider = "ollama"
model = "llama3"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "compact");
    assert_eq!(config.budget.soft_limit, 10_000);
    assert_eq!(config.budget.ceiling, 40_000);
    assert_eq!(config.guard.max_hops, 3);
    assert_eq!(config.guard.chain_ttl_secs, 60);
    assert!((config.classifier.min_confidence - 0.5).abs() < f64::EPSILON);
    assert_eq!(
        config.classifier.category_priority,
        vec![TaskCategory::SecurityReview, TaskCategory::Debugging]
    );
    assert_eq!(
        config.classifier.signals["debugging"]["debug_terms"],
        vec!["segfault", "panic"]
    );
    assert_eq!(config.profiles.len(), 1);
    assert_eq!(config.profiles[0].category, TaskCategory::Debugging);
    assert_eq!(
        config.profiles[0].specialist_agent_id.as_deref(),
        Some("debug_agent")
    );
    assert_eq!(config.profiles[0].priority, 5);
    assert_eq!(config.default_profile.provider, "ollama");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.budget.soft_limit, 50_000);
    assert_eq!(config.budget.hard_limit, 100_000);
    assert_eq!(config.budget.critical_limit, 150_000);
    assert_eq!(config.budget.ceiling, 200_000);
    assert_eq!(config.guard.max_hops, 5);
    assert!((config.classifier.min_confidence - 0.4).abs() < f64::EPSILON);
    assert!(config.classifier.signals.is_empty());
    assert_eq!(config.profiles.len(), TaskCategory::ALL.len());
    assert_eq!(config.default_profile.model, "gpt-4o");
}

/// Unknown field in [guard] produces an error naming the bad key.
#[test]
fn unknown_field_in_guard_produces_error() {
    let err = load_config_from_str("[guard]\nmax_hop = 3\n").expect_err("should reject");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_hop"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown keys surface as UnknownKey diagnostics with a suggestion.
#[test]
fn unknown_key_diagnostic_has_suggestion() {
    let errors = load_and_validate_str("[budget]\nsoft_limt = 10\n").unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion, .. }
            if key == "soft_limt" && suggestion.as_deref() == Some("soft_limit")
    )));
}

/// Wrong value types surface as InvalidType diagnostics.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[guard]\nmax_hops = \"many\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got {errors:?}"
    );
}

/// A profile without a provider is a missing-key error.
#[test]
fn profile_missing_provider_is_reported() {
    let toml = r#"
[[profiles]]
category = "testing"
model = "x"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key } if key.contains("provider"))),
        "got {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn semantic_validation_after_parse() {
    let toml = r#"
[budget]
soft_limit = 200000
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("soft_limit"))
    ));
}

/// Dotted keys (what the env provider produces) override the TOML layer.
#[test]
fn dotted_override_beats_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: SwitchyardConfig = Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::string("[guard]\nmax_hops = 2\n"))
        .merge(("guard.max_hops", 7))
        .extract()
        .expect("should merge override");

    assert_eq!(config.guard.max_hops, 7);
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    let path = std::path::Path::new("/nonexistent/path/switchyard.toml");
    let config = switchyard_config::load_and_validate_path(path).expect("defaults apply");
    assert_eq!(config.guard.max_hops, 5);
}
