// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles an orchestrator from an in-memory configuration
//! plus a [`MockProvider`], and `send_message()` drives the whole caller-side
//! loop: route, call the provider, record usage, close the chain.

use std::sync::Arc;

use switchyard_budget::Session;
use switchyard_config::load_and_validate_str;
use switchyard_config::model::SwitchyardConfig;
use switchyard_core::SwitchyardError;
use switchyard_router::{Orchestrator, RouteRequest, RoutingDecision};
use tokio_util::sync::CancellationToken;

use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config_toml: Option<String>,
    thresholds: Option<(u64, u64, u64, u64)>,
    max_hops: Option<u32>,
    responses: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config_toml: None,
            thresholds: None,
            max_hops: None,
            responses: Vec::new(),
        }
    }

    /// Start from a TOML document instead of the compiled defaults.
    pub fn with_config_str(mut self, toml: impl Into<String>) -> Self {
        self.config_toml = Some(toml.into());
        self
    }

    /// Override soft/hard/critical/ceiling budget thresholds.
    pub fn with_thresholds(mut self, soft: u64, hard: u64, critical: u64, ceiling: u64) -> Self {
        self.thresholds = Some((soft, hard, critical, ceiling));
        self
    }

    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = Some(max_hops);
        self
    }

    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn build(self) -> Result<TestHarness, SwitchyardError> {
        let mut config = match &self.config_toml {
            Some(toml) => load_and_validate_str(toml).map_err(|errors| {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                SwitchyardError::Config(messages.join("; "))
            })?,
            None => SwitchyardConfig::default(),
        };

        if let Some((soft, hard, critical, ceiling)) = self.thresholds {
            config.budget.soft_limit = soft;
            config.budget.hard_limit = hard;
            config.budget.critical_limit = critical;
            config.budget.ceiling = ceiling;
        }
        if let Some(max_hops) = self.max_hops {
            config.guard.max_hops = max_hops;
        }

        let orchestrator = Arc::new(Orchestrator::from_config(&config)?);
        let mock_provider = Arc::new(MockProvider::with_responses(self.responses));

        Ok(TestHarness {
            orchestrator,
            mock_provider,
            config,
        })
    }
}

/// One completed caller-side exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub decision: RoutingDecision,
    pub response: String,
    /// Session totals after the exchange was recorded.
    pub session: Session,
}

/// An orchestrator plus mock provider, ready for assertions.
pub struct TestHarness {
    pub orchestrator: Arc<Orchestrator>,
    pub mock_provider: Arc<MockProvider>,
    /// Effective configuration the orchestrator was built from.
    pub config: SwitchyardConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Route only. The chain stays open until [`TestHarness::complete`].
    pub fn route(
        &self,
        session_id: &str,
        request_id: &str,
        text: &str,
    ) -> Result<RoutingDecision, SwitchyardError> {
        self.orchestrator.route(
            &RouteRequest::new(session_id, request_id, text),
            &CancellationToken::new(),
        )
    }

    /// Route, call the mock provider, record usage, and close the chain.
    pub async fn send_message(
        &self,
        session_id: &str,
        request_id: &str,
        text: &str,
    ) -> Result<Exchange, SwitchyardError> {
        let decision = self.route(session_id, request_id, text)?;
        let (response, usage) = self.mock_provider.complete(&decision.profile, text).await;
        let session = self.orchestrator.record(session_id, usage)?;
        self.orchestrator.complete(request_id);

        Ok(Exchange {
            decision,
            response,
            session,
        })
    }

    pub fn complete(&self, request_id: &str) {
        self.orchestrator.complete(request_id);
    }
}
