// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic task classification.
//!
//! Maps free text plus optional context flags to a [`TaskCategory`] using
//! the signal tables in [`crate::signals`]. No model call, no network, and
//! the same input always yields the same classification.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use switchyard_config::model::ClassifierConfig;
use switchyard_core::{SwitchyardError, TaskCategory};
use tracing::debug;

use crate::signals::{CategorySignals, SignalInput, default_tables};

/// Caller-supplied booleans such as `has_code_attachment`. Unknown names are ignored.
pub type ContextFlags = HashMap<String, bool>;

/// Result of classifying one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskClassification {
    pub category: TaskCategory,
    /// Adjusted score of the winning category, in `[0, 1]`.
    pub confidence: f64,
    /// Names of the winning category's matched signals, in table order.
    pub signals: Vec<String>,
}

impl TaskClassification {
    /// The fallback result: `Unclassified`, zero confidence, no signals.
    pub fn unclassified() -> Self {
        Self {
            category: TaskCategory::Unclassified,
            confidence: 0.0,
            signals: Vec::new(),
        }
    }
}

/// Score of one category for one input, before threshold selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: TaskCategory,
    pub score: f64,
    pub signals: Vec<String>,
}

/// Signal-table classifier with a minimum-confidence floor.
#[derive(Debug, Clone)]
pub struct TaskClassifier {
    /// Tables sorted by tie-break rank, highest precedence first.
    tables: Vec<CategorySignals>,
    min_confidence: f64,
}

impl TaskClassifier {
    /// Classifier with built-in tables and the default configuration.
    pub fn new() -> Self {
        Self::build(default_tables(), &ClassifierConfig::default())
    }

    /// Build from the `[classifier]` config section, applying keyword overrides.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, SwitchyardError> {
        if !(0.0..=1.0).contains(&config.min_confidence) {
            return Err(SwitchyardError::Config(format!(
                "classifier.min_confidence must be within [0, 1], got {}",
                config.min_confidence
            )));
        }

        let mut tables = default_tables();
        for (category_name, overrides) in &config.signals {
            let category = TaskCategory::from_str(category_name).map_err(|_| {
                SwitchyardError::Config(format!(
                    "unknown category `{category_name}` in classifier.signals"
                ))
            })?;
            let table = tables
                .iter_mut()
                .find(|t| t.category == category)
                .ok_or_else(|| {
                    SwitchyardError::Config(format!(
                        "category `{category_name}` cannot carry signals"
                    ))
                })?;
            for (signal_name, words) in overrides {
                table.override_keywords(signal_name, words);
            }
        }

        Ok(Self::build(tables, config))
    }

    fn build(mut tables: Vec<CategorySignals>, config: &ClassifierConfig) -> Self {
        let rank = |category: TaskCategory| {
            config
                .category_priority
                .iter()
                .position(|c| *c == category)
                .unwrap_or(config.category_priority.len() + category as usize)
        };
        tables.sort_by_key(|t| rank(t.category));
        Self {
            tables,
            min_confidence: config.min_confidence,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Categories in tie-break order, highest precedence first.
    pub fn priority_order(&self) -> Vec<TaskCategory> {
        self.tables.iter().map(|t| t.category).collect()
    }

    /// Score every category without applying the confidence floor.
    pub fn scores(&self, text: &str, flags: &ContextFlags) -> Vec<CategoryScore> {
        let input = SignalInput::new(text, flags);
        self.tables
            .iter()
            .map(|t| {
                let (score, signals) = t.score(&input);
                CategoryScore {
                    category: t.category,
                    score,
                    signals,
                }
            })
            .collect()
    }

    /// Classify a request. Total: never fails, never panics.
    pub fn classify(&self, text: &str, flags: &ContextFlags) -> TaskClassification {
        if text.trim().is_empty() {
            debug!(category = %TaskCategory::Unclassified, "empty request text");
            return TaskClassification::unclassified();
        }

        // Strictly greater wins, so earlier (higher precedence) categories keep ties.
        let mut best: Option<CategoryScore> = None;
        for candidate in self.scores(text, flags) {
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        let classification = match best {
            Some(top) if top.score > 0.0 && top.score >= self.min_confidence => {
                TaskClassification {
                    category: top.category,
                    confidence: top.score,
                    signals: top.signals,
                }
            }
            _ => TaskClassification::unclassified(),
        };

        debug!(
            category = %classification.category,
            confidence = classification.confidence,
            signals = ?classification.signals,
            "request classified"
        );
        classification
    }
}

impl Default for TaskClassifier {
    fn default() -> Self {
        Self::new()
    }
}
