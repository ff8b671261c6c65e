// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the Switchyard task routing and context budget orchestrator.
//!
//! This crate provides the error type and the small value types shared by
//! the accountant, classifier, registry, guard, and orchestrator.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SwitchyardError;
pub use types::{BudgetLevel, RequestId, SessionId, TaskCategory};
