// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Switchyard integration tests.
//!
//! # Components
//!
//! - [`TestHarness`] - Orchestrator wired from an in-memory config
//! - [`MockProvider`] - Stand-in for the LLM call that follows routing

pub mod harness;
pub mod mock_provider;

pub use harness::{Exchange, TestHarness};
pub use mock_provider::MockProvider;
