// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing orchestrator.
//!
//! Single entry point for one inbound request: classify, resolve a profile,
//! consult the loop guard, and attach the session's budget status. The
//! provider call and the follow-up [`Orchestrator::record`] belong to the
//! caller. Everything here is in-memory and synchronous.
//!
//! Only malformed ids, bad token counts, and cancellation reach the caller
//! as errors. Classification misses, missing profiles, and loop-guard
//! denials degrade to a usable decision with explanatory flags set.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;
use switchyard_budget::{BudgetStatus, Recommendation, Session, TokenAccountant, TokenUsage};
use switchyard_config::model::{DefaultProfileConfig, SwitchyardConfig};
use switchyard_core::{BudgetLevel, RequestId, SessionId, SwitchyardError, TaskCategory};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::classifier::{ContextFlags, TaskClassification, TaskClassifier};
use crate::guard::{RoutingLoopGuard, VisitDecision};
use crate::registry::{AgentProfile, AgentRegistry};

/// One inbound request to route.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub session_id: String,
    pub request_id: String,
    pub text: String,
    pub context_flags: ContextFlags,
    /// Estimated input tokens of this request, for the projected budget status.
    pub input_tokens_hint: Option<u64>,
    /// Routing aborts with `Cancelled` once this instant has passed.
    pub deadline: Option<Instant>,
}

impl RouteRequest {
    pub fn new(
        session_id: impl Into<String>,
        request_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            request_id: request_id.into(),
            text: text.into(),
            context_flags: ContextFlags::new(),
            input_tokens_hint: None,
            deadline: None,
        }
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.context_flags.insert(name.into(), value);
        self
    }

    pub fn with_input_tokens_hint(mut self, tokens: u64) -> Self {
        self.input_tokens_hint = Some(tokens);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Full routing outcome for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub session_id: SessionId,
    pub request_id: RequestId,
    pub classification: TaskClassification,
    /// Profile to dispatch to. Its specialist is already stripped when the
    /// loop guard denied the visit.
    pub profile: AgentProfile,
    /// Session status before this exchange is costed.
    pub budget_status_before: BudgetStatus,
    /// Status after `input_tokens_hint` more tokens, when a hint was given.
    pub budget_status_projected: Option<BudgetStatus>,
    pub loop_guard_triggered: bool,
    /// Guard outcome, when the resolved profile named a specialist. A chain
    /// already blocked by a repeat visit reports `DenyHopLimit` for every
    /// new agent, even with hops left.
    pub guard_decision: Option<VisitDecision>,
    /// True when no profile served the category and the default was used.
    pub profile_fallback: bool,
}

impl RoutingDecision {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            session_id: self.session_id.to_string(),
            request_id: self.request_id.to_string(),
            category: self.classification.category,
            confidence: self.classification.confidence,
            provider: self.profile.provider.clone(),
            model: self.profile.model.clone(),
            specialist_agent_id: self.profile.specialist_agent_id.clone(),
            budget_level: self.budget_status_before.level,
            budget_recommendation: self.budget_status_before.recommendation,
            loop_guard_triggered: self.loop_guard_triggered,
            profile_fallback: self.profile_fallback,
        }
    }
}

/// Flat, serializable view of a [`RoutingDecision`] for the calling service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub session_id: String,
    pub request_id: String,
    pub category: TaskCategory,
    pub confidence: f64,
    pub provider: String,
    pub model: String,
    pub specialist_agent_id: Option<String>,
    pub budget_level: BudgetLevel,
    pub budget_recommendation: Option<Recommendation>,
    pub loop_guard_triggered: bool,
    pub profile_fallback: bool,
}

/// Routed requests between two sweeps of expired guard chains.
const SWEEP_EVERY: u64 = 256;

/// Composes classifier, registry, loop guard, and accountant.
#[derive(Debug)]
pub struct Orchestrator {
    classifier: TaskClassifier,
    registry: Arc<AgentRegistry>,
    guard: RoutingLoopGuard,
    accountant: TokenAccountant,
    default_profile: DefaultProfileConfig,
    routes: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        classifier: TaskClassifier,
        registry: Arc<AgentRegistry>,
        guard: RoutingLoopGuard,
        accountant: TokenAccountant,
        default_profile: DefaultProfileConfig,
    ) -> Self {
        Self {
            classifier,
            registry,
            guard,
            accountant,
            default_profile,
            routes: AtomicU64::new(0),
        }
    }

    /// Wire every component from a validated configuration.
    pub fn from_config(config: &SwitchyardConfig) -> Result<Self, SwitchyardError> {
        Ok(Self::new(
            TaskClassifier::from_config(&config.classifier)?,
            Arc::new(AgentRegistry::from_profiles(&config.profiles)),
            RoutingLoopGuard::from_config(&config.guard)?,
            TokenAccountant::from_config(&config.budget)?,
            config.default_profile.clone(),
        ))
    }

    /// Route one request.
    ///
    /// `cancel` and `request.deadline` are checked between stages. On
    /// cancellation no decision is returned and the loop guard is not
    /// consulted, so the request's chain is unchanged.
    pub fn route(
        &self,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<RoutingDecision, SwitchyardError> {
        let deadline = request.deadline;
        self.route_with(request, |_| {
            cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)
        })
    }

    fn route_with(
        &self,
        request: &RouteRequest,
        mut cancelled: impl FnMut(&'static str) -> bool,
    ) -> Result<RoutingDecision, SwitchyardError> {
        let session_id = SessionId::parse(&request.session_id)?;
        let request_id = RequestId::parse(&request.request_id)?;

        let mut checkpoint = |stage: &'static str| {
            if cancelled(stage) {
                Err(SwitchyardError::Cancelled { stage })
            } else {
                Ok(())
            }
        };

        checkpoint("classify")?;
        let classification = self
            .classifier
            .classify(&request.text, &request.context_flags);

        checkpoint("resolve")?;
        let (mut profile, profile_fallback) = match self.registry.resolve(classification.category)
        {
            Ok(profile) => (profile, false),
            Err(e) => {
                warn!(
                    category = %classification.category,
                    error = %e,
                    "no agent profile for category, using default profile"
                );
                (
                    AgentProfile::from_default(classification.category, &self.default_profile),
                    true,
                )
            }
        };

        checkpoint("budget")?;
        let budget_status_before = self.accountant.status(session_id.as_str())?;
        let budget_status_projected = request
            .input_tokens_hint
            .map(|hint| self.accountant.project(session_id.as_str(), hint))
            .transpose()?;

        // The visit is the last step: a cancelled call leaves the chain untouched.
        checkpoint("guard")?;
        let mut guard_decision = None;
        let mut loop_guard_triggered = false;
        if let Some(agent_id) = profile.specialist_agent_id.clone() {
            if agent_id.trim().is_empty() {
                profile = profile.without_specialist();
            } else {
                let decision = self.guard.try_visit(request_id.as_str(), &agent_id)?;
                guard_decision = Some(decision);
                if !decision.is_allowed() {
                    warn!(
                        request_id = request_id.as_str(),
                        agent_id = agent_id.as_str(),
                        decision = %decision,
                        "loop guard triggered, dropping specialist"
                    );
                    loop_guard_triggered = true;
                    profile = profile.without_specialist();
                }
            }
        }

        if self.routes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.guard.sweep_expired();
        }

        debug!(
            session_id = session_id.as_str(),
            request_id = request_id.as_str(),
            category = %classification.category,
            provider = profile.provider.as_str(),
            model = profile.model.as_str(),
            budget_level = %budget_status_before.level,
            loop_guard_triggered = loop_guard_triggered,
            "request routed"
        );

        Ok(RoutingDecision {
            session_id,
            request_id,
            classification,
            profile,
            budget_status_before,
            budget_status_projected,
            loop_guard_triggered,
            guard_decision,
            profile_fallback,
        })
    }

    /// Record realized token usage after the provider call.
    pub fn record(&self, session_id: &str, usage: TokenUsage) -> Result<Session, SwitchyardError> {
        self.accountant.record(session_id, usage)
    }

    /// Zero a session's counters, e.g. after the caller forks the conversation.
    pub fn reset(&self, session_id: &str) -> Result<(), SwitchyardError> {
        self.accountant.reset(session_id)
    }

    pub fn status(&self, session_id: &str) -> Result<BudgetStatus, SwitchyardError> {
        self.accountant.status(session_id)
    }

    /// Give back the specialist hop of a decision whose dispatch never
    /// happened, so a retry of the same request can use that agent again.
    /// Returns whether a hop was released.
    pub fn abandon(&self, decision: &RoutingDecision) -> bool {
        match (&decision.guard_decision, &decision.profile.specialist_agent_id) {
            (Some(VisitDecision::Allow), Some(agent_id)) => {
                self.guard.release(decision.request_id.as_str(), agent_id)
            }
            _ => false,
        }
    }

    /// Release the loop-guard state of a finished request.
    pub fn complete(&self, request_id: &str) {
        self.guard.close(request_id);
    }

    /// Evict guard chains older than the configured TTL. `route` also does
    /// this every few hundred calls.
    pub fn sweep_stale_chains(&self) -> usize {
        self.guard.sweep_expired()
    }

    pub fn classifier(&self) -> &TaskClassifier {
        &self.classifier
    }

    /// Shared handle for administrative `register`/`replace_all` calls.
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn guard(&self) -> &RoutingLoopGuard {
        &self.guard
    }

    pub fn accountant(&self) -> &TokenAccountant {
        &self.accountant
    }
}
