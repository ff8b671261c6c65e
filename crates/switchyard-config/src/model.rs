// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Switchyard routing core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use switchyard_core::TaskCategory;

/// Top-level Switchyard configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Log level and output format for the binary.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-session token thresholds.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Routing loop guard limits.
    #[serde(default)]
    pub guard: GuardConfig,

    /// Task classifier tuning.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Category to provider/model/specialist mapping.
    /// Specifying `[[profiles]]` replaces the built-in table entirely.
    #[serde(default = "default_profiles")]
    pub profiles: Vec<ProfileConfig>,

    /// Profile used when a category has no registered profile.
    #[serde(default)]
    pub default_profile: DefaultProfileConfig,
}

impl Default for SwitchyardConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            budget: BudgetConfig::default(),
            guard: GuardConfig::default(),
            classifier: ClassifierConfig::default(),
            profiles: default_profiles(),
            default_profile: DefaultProfileConfig::default(),
        }
    }
}

/// Logging configuration (consumed by the binary, not the libraries).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "pretty" or "compact".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Per-session token thresholds.
///
/// Levels are inclusive lower bounds: a session at exactly `hard_limit`
/// tokens is at the hard warning level.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    /// Total tokens at which the soft warning starts.
    #[serde(default = "default_soft_limit")]
    pub soft_limit: u64,

    /// Total tokens at which the hard warning starts.
    #[serde(default = "default_hard_limit")]
    pub hard_limit: u64,

    /// Total tokens at which the session is critical.
    #[serde(default = "default_critical_limit")]
    pub critical_limit: u64,

    /// Absolute ceiling. Sessions at or above it must be forked.
    #[serde(default = "default_ceiling")]
    pub ceiling: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            soft_limit: default_soft_limit(),
            hard_limit: default_hard_limit(),
            critical_limit: default_critical_limit(),
            ceiling: default_ceiling(),
        }
    }
}

fn default_soft_limit() -> u64 {
    50_000
}

fn default_hard_limit() -> u64 {
    100_000
}

fn default_critical_limit() -> u64 {
    150_000
}

fn default_ceiling() -> u64 {
    200_000
}

/// Routing loop guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    /// Maximum specialist hand-offs within a single request chain.
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,

    /// Seconds after which a chain that was never closed may be swept.
    #[serde(default = "default_chain_ttl_secs")]
    pub chain_ttl_secs: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            chain_ttl_secs: default_chain_ttl_secs(),
        }
    }
}

fn default_max_hops() -> u32 {
    5
}

fn default_chain_ttl_secs() -> u64 {
    300 // 5 minutes
}

/// Task classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Top scores below this return `unclassified` with confidence 0.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Tie-break order, highest precedence first. Categories left out rank
    /// after the listed ones in their declaration order.
    #[serde(default = "default_category_priority")]
    pub category_priority: Vec<TaskCategory>,

    /// Keyword signal overrides: category name -> signal name -> keywords.
    ///
    /// An existing signal name has its keywords replaced; a new name adds
    /// a keyword signal to the category.
    #[serde(default)]
    pub signals: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            category_priority: default_category_priority(),
            signals: BTreeMap::new(),
        }
    }
}

fn default_min_confidence() -> f64 {
    0.4
}

fn default_category_priority() -> Vec<TaskCategory> {
    vec![
        TaskCategory::Debugging,
        TaskCategory::SecurityReview,
        TaskCategory::PerformanceReview,
        TaskCategory::Testing,
        TaskCategory::CodeAnalysis,
        TaskCategory::RepositoryOperation,
        TaskCategory::TechnicalDocumentation,
        TaskCategory::SystemAnalysis,
        TaskCategory::ResearchWeb,
        TaskCategory::ComplexReasoning,
        TaskCategory::CreativeWriting,
        TaskCategory::GeneralConversation,
    ]
}

/// One `[[profiles]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Category this profile serves.
    pub category: TaskCategory,

    /// Provider name (e.g. "anthropic").
    pub provider: String,

    /// Model identifier passed to the provider.
    pub model: String,

    /// Specialist agent to delegate to, if any.
    #[serde(default)]
    pub specialist_agent_id: Option<String>,

    /// Higher wins when several profiles serve the same category.
    #[serde(default)]
    pub priority: i32,
}

/// Fallback provider/model for categories with no profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultProfileConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_chat_model")]
    pub model: String,
}

impl Default for DefaultProfileConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_chat_model(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

const CODE_PROVIDER: &str = "anthropic";
const CODE_MODEL: &str = "claude-sonnet-4-20250514";
const REASONING_PROVIDER: &str = "deepseek";
const REASONING_MODEL: &str = "deepseek-reasoner";
const RESEARCH_PROVIDER: &str = "perplexity";
const RESEARCH_MODEL: &str = "sonar-pro";

fn profile(
    category: TaskCategory,
    provider: &str,
    model: &str,
    specialist: Option<&str>,
) -> ProfileConfig {
    ProfileConfig {
        category,
        provider: provider.to_string(),
        model: model.to_string(),
        specialist_agent_id: specialist.map(str::to_string),
        priority: 10,
    }
}

/// Built-in profile table covering every category, `unclassified` included.
pub fn default_profiles() -> Vec<ProfileConfig> {
    let chat = default_provider();
    let chat_model = default_chat_model();
    vec![
        profile(TaskCategory::GeneralConversation, &chat, &chat_model, None),
        profile(
            TaskCategory::CodeAnalysis,
            CODE_PROVIDER,
            CODE_MODEL,
            Some("code_review_agent"),
        ),
        profile(
            TaskCategory::ComplexReasoning,
            REASONING_PROVIDER,
            REASONING_MODEL,
            None,
        ),
        profile(
            TaskCategory::ResearchWeb,
            RESEARCH_PROVIDER,
            RESEARCH_MODEL,
            Some("research_agent"),
        ),
        profile(TaskCategory::CreativeWriting, &chat, &chat_model, None),
        profile(
            TaskCategory::TechnicalDocumentation,
            CODE_PROVIDER,
            CODE_MODEL,
            None,
        ),
        profile(
            TaskCategory::Debugging,
            CODE_PROVIDER,
            CODE_MODEL,
            Some("debug_agent"),
        ),
        profile(
            TaskCategory::SystemAnalysis,
            REASONING_PROVIDER,
            REASONING_MODEL,
            None,
        ),
        profile(
            TaskCategory::SecurityReview,
            CODE_PROVIDER,
            CODE_MODEL,
            Some("security_agent"),
        ),
        profile(
            TaskCategory::PerformanceReview,
            CODE_PROVIDER,
            CODE_MODEL,
            Some("performance_agent"),
        ),
        profile(
            TaskCategory::Testing,
            CODE_PROVIDER,
            CODE_MODEL,
            Some("test_agent"),
        ),
        profile(
            TaskCategory::RepositoryOperation,
            CODE_PROVIDER,
            CODE_MODEL,
            Some("repo_agent"),
        ),
        profile(TaskCategory::Unclassified, &chat, &chat_model, None),
    ]
}
