// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider for deterministic testing.
//!
//! Plays the part of the external provider call that happens after routing:
//! returns a queued response and reports token usage estimated with the
//! character heuristic.

use std::collections::VecDeque;
use std::sync::Arc;

use switchyard_budget::{TokenUsage, heuristic_tokens};
use switchyard_router::AgentProfile;
use tokio::sync::Mutex;

/// A mock provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<AgentProfile>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// "Call" the provider described by `profile`.
    pub async fn complete(&self, profile: &AgentProfile, prompt: &str) -> (String, TokenUsage) {
        self.calls.lock().await.push(profile.clone());
        let response = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string());
        let usage = TokenUsage::new(heuristic_tokens(prompt), heuristic_tokens(&response));
        (response, usage)
    }

    /// Every profile the provider was called with, in call order.
    pub async fn calls(&self) -> Vec<AgentProfile> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}
