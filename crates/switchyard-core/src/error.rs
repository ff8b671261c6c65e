// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Switchyard routing core.

use thiserror::Error;

use crate::types::TaskCategory;

/// The primary error type shared by the accountant, registry, guard, and orchestrator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwitchyardError {
    /// A caller passed a structurally invalid argument (empty id, malformed input).
    #[error("validation error: {field}: {message}")]
    Validation {
        /// Name of the offending argument.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Token counts were negative or would overflow the session counters.
    #[error("invalid token count: {message}")]
    InvalidTokenCount { message: String },

    /// The agent registry has no profile for the requested category.
    #[error("no agent profile registered for category `{category}`")]
    NoProfileForCategory { category: TaskCategory },

    /// The caller's cancellation token or deadline fired mid-routing.
    #[error("routing cancelled during {stage}")]
    Cancelled { stage: &'static str },

    /// Configuration could not be turned into runtime components.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SwitchyardError {
    /// Shorthand for a [`SwitchyardError::Validation`] error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether this error is one the caller must see (as opposed to a
    /// condition the orchestrator degrades around).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidTokenCount { .. } | Self::Cancelled { .. }
        )
    }
}
