// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget thresholds and the derived per-session budget status.

use serde::Serialize;
use strum::{Display, EnumString};
use switchyard_config::model::BudgetConfig;
use switchyard_core::{BudgetLevel, SwitchyardError};

/// What the caller should do about a session's token usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Soft warning: mention that a fresh conversation would help.
    SuggestFork,
    /// Hard warning: actively recommend forking.
    RecommendFork,
    /// Critical: fork soon, context quality is degrading.
    UrgentFork,
    /// At or beyond the absolute ceiling.
    ForkRequired,
}

/// Four ordered thresholds: `soft < hard < critical <= ceiling`.
///
/// Each threshold is the inclusive lower bound of its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetThresholds {
    soft: u64,
    hard: u64,
    critical: u64,
    ceiling: u64,
}

impl BudgetThresholds {
    /// Build thresholds, rejecting any ordering violation.
    pub fn new(soft: u64, hard: u64, critical: u64, ceiling: u64) -> Result<Self, SwitchyardError> {
        if soft == 0 || soft >= hard || hard >= critical || critical > ceiling {
            return Err(SwitchyardError::Config(format!(
                "budget thresholds must satisfy 0 < soft < hard < critical <= ceiling \
                 (got {soft}/{hard}/{critical}/{ceiling})"
            )));
        }
        Ok(Self {
            soft,
            hard,
            critical,
            ceiling,
        })
    }

    /// Build thresholds from the `[budget]` config section.
    pub fn from_config(config: &BudgetConfig) -> Result<Self, SwitchyardError> {
        Self::new(
            config.soft_limit,
            config.hard_limit,
            config.critical_limit,
            config.ceiling,
        )
    }

    pub fn soft(&self) -> u64 {
        self.soft
    }

    pub fn hard(&self) -> u64 {
        self.hard
    }

    pub fn critical(&self) -> u64 {
        self.critical
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Level for a running total, evaluated in ascending order.
    pub fn level_for(&self, total_tokens: u64) -> BudgetLevel {
        if total_tokens >= self.critical {
            BudgetLevel::Critical
        } else if total_tokens >= self.hard {
            BudgetLevel::HardWarning
        } else if total_tokens >= self.soft {
            BudgetLevel::SoftWarning
        } else {
            BudgetLevel::Ok
        }
    }

    /// Full status for a running total.
    pub fn status_for(&self, total_tokens: u64) -> BudgetStatus {
        let level = self.level_for(total_tokens);
        let ceiling_reached = total_tokens >= self.ceiling;
        let recommendation = if ceiling_reached {
            Some(Recommendation::ForkRequired)
        } else {
            match level {
                BudgetLevel::Ok => None,
                BudgetLevel::SoftWarning => Some(Recommendation::SuggestFork),
                BudgetLevel::HardWarning => Some(Recommendation::RecommendFork),
                BudgetLevel::Critical => Some(Recommendation::UrgentFork),
            }
        };

        BudgetStatus {
            level,
            recommendation,
            total_tokens,
            ceiling_reached,
            remaining_to_ceiling: self.ceiling.saturating_sub(total_tokens),
            utilization: total_tokens as f64 / self.ceiling as f64,
        }
    }
}

impl Default for BudgetThresholds {
    fn default() -> Self {
        Self {
            soft: 50_000,
            hard: 100_000,
            critical: 150_000,
            ceiling: 200_000,
        }
    }
}

/// Derived budget status for one session. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub level: BudgetLevel,
    pub recommendation: Option<Recommendation>,
    pub total_tokens: u64,
    /// True once the absolute ceiling is reached (level stays `Critical`).
    pub ceiling_reached: bool,
    pub remaining_to_ceiling: u64,
    /// `total_tokens / ceiling`; exceeds 1.0 past the ceiling.
    pub utilization: f64,
}

impl BudgetStatus {
    /// Whether the caller should surface anything to the user.
    pub fn needs_attention(&self) -> bool {
        self.level > BudgetLevel::Ok
    }
}
