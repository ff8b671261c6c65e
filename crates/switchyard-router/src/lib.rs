// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task routing for Switchyard.
//!
//! Classifies requests into task categories, resolves the agent profile that
//! serves each category, guards specialist hand-off chains against loops, and
//! composes all of it with the token accountant in the [`Orchestrator`].

pub mod classifier;
pub mod guard;
pub mod orchestrator;
pub mod registry;
pub mod signals;

pub use classifier::{CategoryScore, ContextFlags, TaskClassification, TaskClassifier};
pub use guard::{ChainSnapshot, ChainStatus, RoutingLoopGuard, VisitDecision};
pub use orchestrator::{Orchestrator, RouteRequest, RouteSummary, RoutingDecision};
pub use registry::{AgentProfile, AgentRegistry};
