// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Switchyard crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SwitchyardError;

/// Coarse classification of what kind of help a request needs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    GeneralConversation,
    CodeAnalysis,
    ComplexReasoning,
    ResearchWeb,
    CreativeWriting,
    TechnicalDocumentation,
    Debugging,
    SystemAnalysis,
    SecurityReview,
    PerformanceReview,
    Testing,
    RepositoryOperation,
    Unclassified,
}

impl TaskCategory {
    /// Every category, `Unclassified` last.
    pub const ALL: [TaskCategory; 13] = [
        TaskCategory::GeneralConversation,
        TaskCategory::CodeAnalysis,
        TaskCategory::ComplexReasoning,
        TaskCategory::ResearchWeb,
        TaskCategory::CreativeWriting,
        TaskCategory::TechnicalDocumentation,
        TaskCategory::Debugging,
        TaskCategory::SystemAnalysis,
        TaskCategory::SecurityReview,
        TaskCategory::PerformanceReview,
        TaskCategory::Testing,
        TaskCategory::RepositoryOperation,
        TaskCategory::Unclassified,
    ];

    /// Categories the classifier can actually score (everything but `Unclassified`).
    pub fn scorable() -> impl Iterator<Item = TaskCategory> {
        Self::ALL
            .into_iter()
            .filter(|c| *c != TaskCategory::Unclassified)
    }
}

/// How much of a session's token allowance has been consumed.
///
/// Variants are ordered, so `level >= BudgetLevel::HardWarning` reads naturally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
pub enum BudgetLevel {
    #[strum(serialize = "ok")]
    #[serde(rename = "ok")]
    Ok,
    #[strum(serialize = "soft")]
    #[serde(rename = "soft")]
    SoftWarning,
    #[strum(serialize = "hard")]
    #[serde(rename = "hard")]
    HardWarning,
    #[strum(serialize = "critical")]
    #[serde(rename = "critical")]
    Critical,
}

fn non_empty(field: &'static str, raw: &str) -> Result<String, SwitchyardError> {
    if raw.trim().is_empty() {
        return Err(SwitchyardError::validation(field, "must not be empty"));
    }
    Ok(raw.to_string())
}

/// Opaque identifier for one ongoing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a raw session id. Empty or whitespace-only ids are rejected.
    pub fn parse(raw: &str) -> Result<Self, SwitchyardError> {
        non_empty("session_id", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier for one inbound request and the hand-off chain it spawns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Validate and wrap a raw request id. Empty or whitespace-only ids are rejected.
    pub fn parse(raw: &str) -> Result<Self, SwitchyardError> {
        non_empty("request_id", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn category_display_and_parse_round_trip() {
        for category in TaskCategory::ALL {
            let s = category.to_string();
            assert_eq!(TaskCategory::from_str(&s).unwrap(), category);
        }
        assert_eq!(TaskCategory::Debugging.to_string(), "debugging");
        assert_eq!(
            TaskCategory::RepositoryOperation.to_string(),
            "repository_operation"
        );
    }

    #[test]
    fn category_serde_uses_snake_case() {
        let json = serde_json::to_string(&TaskCategory::SecurityReview).unwrap();
        assert_eq!(json, "\"security_review\"");
    }

    #[test]
    fn scorable_excludes_unclassified() {
        assert_eq!(TaskCategory::scorable().count(), 12);
        assert!(TaskCategory::scorable().all(|c| c != TaskCategory::Unclassified));
    }

    #[test]
    fn budget_levels_are_ordered() {
        assert!(BudgetLevel::Ok < BudgetLevel::SoftWarning);
        assert!(BudgetLevel::SoftWarning < BudgetLevel::HardWarning);
        assert!(BudgetLevel::HardWarning < BudgetLevel::Critical);
        assert_eq!(BudgetLevel::HardWarning.to_string(), "hard");
        assert_eq!(
            serde_json::to_string(&BudgetLevel::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn empty_ids_are_rejected() {
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("   ").is_err());
        assert!(RequestId::parse("\t").is_err());
        assert_eq!(SessionId::parse("s-1").unwrap().as_str(), "s-1");
        assert_eq!(RequestId::parse("r1").unwrap().to_string(), "r1");
    }
}
