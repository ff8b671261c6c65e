// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ordering, confidence ranges, and category names in maps.

use std::collections::HashSet;
use std::str::FromStr;

use switchyard_core::TaskCategory;

use crate::diagnostic::{ConfigError, suggest_category};
use crate::model::SwitchyardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SwitchyardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }
    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        fail(format!(
            "logging.format `{}` must be one of {}",
            config.logging.format,
            LOG_FORMATS.join(", ")
        ));
    }

    // Thresholds: 0 < soft < hard < critical <= ceiling
    let b = &config.budget;
    if b.soft_limit == 0 {
        fail("budget.soft_limit must be greater than zero".to_string());
    }
    if b.soft_limit >= b.hard_limit {
        fail(format!(
            "budget.soft_limit ({}) must be less than budget.hard_limit ({})",
            b.soft_limit, b.hard_limit
        ));
    }
    if b.hard_limit >= b.critical_limit {
        fail(format!(
            "budget.hard_limit ({}) must be less than budget.critical_limit ({})",
            b.hard_limit, b.critical_limit
        ));
    }
    if b.critical_limit > b.ceiling {
        fail(format!(
            "budget.critical_limit ({}) must not exceed budget.ceiling ({})",
            b.critical_limit, b.ceiling
        ));
    }

    if config.guard.max_hops < 1 {
        fail("guard.max_hops must be at least 1".to_string());
    }
    if config.guard.chain_ttl_secs == 0 {
        fail("guard.chain_ttl_secs must be at least 1".to_string());
    }

    let min_confidence = config.classifier.min_confidence;
    if !(0.0..=1.0).contains(&min_confidence) {
        fail(format!(
            "classifier.min_confidence must be within [0, 1], got {min_confidence}"
        ));
    }

    let mut seen = HashSet::new();
    for category in &config.classifier.category_priority {
        if *category == TaskCategory::Unclassified {
            fail("classifier.category_priority must not list `unclassified`".to_string());
        } else if !seen.insert(*category) {
            fail(format!(
                "duplicate category `{category}` in classifier.category_priority"
            ));
        }
    }

    for (name, signals) in &config.classifier.signals {
        match TaskCategory::from_str(name) {
            Ok(TaskCategory::Unclassified) => {
                fail("classifier.signals cannot define signals for `unclassified`".to_string())
            }
            Ok(_) => {}
            Err(_) => fail(match suggest_category(name) {
                Some(s) => format!(
                    "unknown category `{name}` in classifier.signals, did you mean `{s}`?"
                ),
                None => format!("unknown category `{name}` in classifier.signals"),
            }),
        }
        for (signal, keywords) in signals {
            if signal.trim().is_empty() {
                fail(format!("classifier.signals.{name} has an empty signal name"));
            }
            if keywords.iter().all(|k| k.trim().is_empty()) {
                fail(format!(
                    "classifier.signals.{name}.{signal} must list at least one keyword"
                ));
            }
        }
    }

    for (i, profile) in config.profiles.iter().enumerate() {
        if profile.provider.trim().is_empty() {
            fail(format!("profiles[{i}].provider must not be empty"));
        }
        if profile.model.trim().is_empty() {
            fail(format!("profiles[{i}].model must not be empty"));
        }
        if let Some(agent) = &profile.specialist_agent_id
            && agent.trim().is_empty()
        {
            fail(format!(
                "profiles[{i}].specialist_agent_id must not be empty when set"
            ));
        }
    }

    if config.default_profile.provider.trim().is_empty() {
        fail("default_profile.provider must not be empty".to_string());
    }
    if config.default_profile.model.trim().is_empty() {
        fail("default_profile.model must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
