// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token accounting and context budget levels for Switchyard.
//!
//! Tracks cumulative input/output tokens per session and derives a
//! [`BudgetLevel`](switchyard_core::BudgetLevel) plus a fork recommendation
//! from configurable thresholds.

pub mod accountant;
pub mod estimate;
pub mod session;
pub mod status;

pub use accountant::TokenAccountant;
pub use estimate::{TokenEstimator, heuristic_tokens};
pub use session::{Session, TokenUsage};
pub use status::{BudgetStatus, BudgetThresholds, Recommendation};
