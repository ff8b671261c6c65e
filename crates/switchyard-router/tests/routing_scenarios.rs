// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing scenarios exercised through the public API only.

use std::sync::Arc;
use std::time::Duration;

use switchyard_budget::{BudgetThresholds, TokenAccountant, TokenUsage};
use switchyard_config::load_and_validate_str;
use switchyard_config::model::{DefaultProfileConfig, SwitchyardConfig};
use switchyard_core::{BudgetLevel, SwitchyardError, TaskCategory};
use switchyard_router::{
    AgentProfile, AgentRegistry, ContextFlags, Orchestrator, RouteRequest, RoutingDecision,
    RoutingLoopGuard, TaskClassifier, VisitDecision,
};
use tokio_util::sync::CancellationToken;

fn orchestrator() -> Orchestrator {
    Orchestrator::from_config(&SwitchyardConfig::default()).unwrap()
}

fn route(o: &Orchestrator, session: &str, request: &str, text: &str) -> RoutingDecision {
    o.route(&RouteRequest::new(session, request, text), &CancellationToken::new())
        .unwrap()
}

// ---- Scenario 1: error text classifies as debugging ----

#[test]
fn type_error_routes_to_debugging() {
    let o = orchestrator();
    let d = route(
        &o,
        "s1",
        "r1",
        "I got a TypeError: cannot read property 'x' of undefined",
    );
    assert_eq!(d.classification.category, TaskCategory::Debugging);
    assert!(d.classification.confidence > 0.4);
}

// ---- Scenario 2: small talk is never code analysis ----

#[test]
fn greeting_routes_to_general_conversation() {
    let o = orchestrator();
    let d = route(&o, "s1", "r1", "hi, how are you?");
    assert_eq!(
        d.classification.category,
        TaskCategory::GeneralConversation
    );
    assert_ne!(d.classification.category, TaskCategory::CodeAnalysis);
    assert_eq!(d.profile.specialist_agent_id, None);
}

// ---- Scenario 3: hard warning at 120k tokens ----

#[test]
fn hard_warning_after_120k_tokens() {
    let config = load_and_validate_str(
        "[budget]\nsoft_limit = 50000\nhard_limit = 100000\ncritical_limit = 150000\n",
    )
    .unwrap();
    let o = Orchestrator::from_config(&config).unwrap();

    o.record("s1", TokenUsage::new(70_000, 20_000)).unwrap();
    o.record("s1", TokenUsage::new(25_000, 5_000)).unwrap();

    let status = o.status("s1").unwrap();
    assert_eq!(status.total_tokens, 120_000);
    assert_eq!(status.level, BudgetLevel::HardWarning);
    assert!(status.recommendation.is_some());

    let d = route(&o, "s1", "r1", "hello");
    assert_eq!(d.budget_status_before.level, BudgetLevel::HardWarning);
}

// ---- Scenario 4: re-selecting a specialist in one chain trips the guard ----

#[test]
fn repeat_specialist_in_same_request_falls_back() {
    let o = orchestrator();
    let text = "I got a TypeError: cannot read property 'x' of undefined";

    let first = route(&o, "s1", "r1", text);
    assert_eq!(first.profile.specialist_agent_id.as_deref(), Some("debug_agent"));
    assert!(!first.loop_guard_triggered);

    let second = route(&o, "s1", "r1", text);
    assert!(second.loop_guard_triggered);
    assert_eq!(second.guard_decision, Some(VisitDecision::DenyRepeat));
    assert_eq!(second.profile.specialist_agent_id, None);
    assert_eq!(second.profile.provider, first.profile.provider);
    assert_eq!(second.profile.model, first.profile.model);

    let other_request = route(&o, "s1", "r2", text);
    assert!(!other_request.loop_guard_triggered);
}

// ---- Accountant properties ----

#[test]
fn negative_counts_fail_and_leave_totals() {
    let o = orchestrator();
    o.record("s", TokenUsage::new(10, 10)).unwrap();
    let err = TokenUsage::try_from_signed(-5, 3).unwrap_err();
    assert!(matches!(err, SwitchyardError::InvalidTokenCount { .. }));
    assert_eq!(o.status("s").unwrap().total_tokens, 20);
}

#[test]
fn reset_returns_to_ok() {
    let o = orchestrator();
    o.record("s", TokenUsage::new(190_000, 20_000)).unwrap();
    let status = o.status("s").unwrap();
    assert!(status.ceiling_reached);

    o.reset("s").unwrap();
    let status = o.status("s").unwrap();
    assert_eq!(status.level, BudgetLevel::Ok);
    assert_eq!(status.total_tokens, 0);
}

// ---- Guard properties ----

#[test]
fn max_hops_distinct_visits_then_hop_limit() {
    let guard = RoutingLoopGuard::new(5).unwrap();
    for agent in ["a", "b", "c", "d", "e"] {
        assert_eq!(guard.try_visit("r", agent).unwrap(), VisitDecision::Allow);
    }
    assert_eq!(
        guard.try_visit("r", "f").unwrap(),
        VisitDecision::DenyHopLimit
    );
}

#[test]
fn hop_limit_from_config_applies_to_routing() {
    let config = load_and_validate_str("[guard]\nmax_hops = 1\n").unwrap();
    let o = Orchestrator::from_config(&config).unwrap();

    let debug = route(&o, "s", "r", "there is a bug, it crashes");
    assert_eq!(debug.guard_decision, Some(VisitDecision::Allow));

    let security = route(&o, "s", "r", "audit this endpoint for sql injection");
    assert_eq!(security.classification.category, TaskCategory::SecurityReview);
    assert_eq!(security.guard_decision, Some(VisitDecision::DenyHopLimit));
    assert!(security.loop_guard_triggered);
    assert_eq!(security.profile.specialist_agent_id, None);
}

#[test]
fn chain_ttl_from_config_evicts_unclosed_chains() {
    let config = load_and_validate_str("[guard]\nchain_ttl_secs = 1\n").unwrap();
    let o = Orchestrator::from_config(&config).unwrap();
    assert_eq!(o.guard().chain_ttl(), Duration::from_secs(1));

    route(&o, "s", "never-closed", "there is a bug, it crashes");
    assert_eq!(o.sweep_stale_chains(), 0);

    std::thread::sleep(Duration::from_millis(1_100));
    assert_eq!(o.sweep_stale_chains(), 1);
    assert_eq!(o.guard().active_chains(), 0);
}

// ---- Configuration-driven classification ----

#[test]
fn configured_signals_and_priority_change_outcome() {
    let config = load_and_validate_str(
        r#"
[classifier]
category_priority = ["research_web", "debugging"]

[classifier.signals.research_web]
research_terms = ["investigate"]
"#,
    )
    .unwrap();
    let classifier = TaskClassifier::from_config(&config.classifier).unwrap();
    let c = classifier.classify("investigate this bug", &ContextFlags::new());
    assert_eq!(c.category, TaskCategory::ResearchWeb);
}

#[test]
fn context_flags_feed_structural_signals() {
    let o = orchestrator();
    let request = RouteRequest::new("s", "r", "what happened with the outage")
        .with_flag("web_search", true)
        .with_flag("some_unknown_flag", true);
    let d = o.route(&request, &CancellationToken::new()).unwrap();
    assert_eq!(d.classification.category, TaskCategory::ResearchWeb);
    assert_eq!(d.profile.specialist_agent_id.as_deref(), Some("research_agent"));
}

// ---- Concurrency ----

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_records_across_and_within_sessions() {
    let accountant = Arc::new(TokenAccountant::new(BudgetThresholds::default()));

    let mut handles = Vec::new();
    for task in 0..16 {
        let accountant = Arc::clone(&accountant);
        handles.push(tokio::spawn(async move {
            let own = format!("session-{task}");
            for _ in 0..100 {
                accountant.record(&own, TokenUsage::new(3, 2)).unwrap();
                accountant.record("shared", TokenUsage::new(1, 1)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for task in 0..16 {
        let session = accountant.session(&format!("session-{task}")).unwrap();
        assert_eq!(session.total_tokens(), 500);
        assert_eq!(session.message_count, 100);
    }
    let shared = accountant.session("shared").unwrap();
    assert_eq!(shared.total_input_tokens, 1_600);
    assert_eq!(shared.total_output_tokens, 1_600);
    assert_eq!(shared.message_count, 1_600);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_routes_in_one_chain_allow_specialist_once() {
    let o = Arc::new(orchestrator());
    let text = "I got a TypeError: cannot read property 'x' of undefined";

    let mut handles = Vec::new();
    for _ in 0..12 {
        let o = Arc::clone(&o);
        handles.push(tokio::spawn(async move {
            o.route(&RouteRequest::new("s", "r1", text), &CancellationToken::new())
                .unwrap()
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap().guard_decision == Some(VisitDecision::Allow) {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn registry_reload_is_visible_to_routing() {
    let registry = Arc::new(AgentRegistry::new());
    let o = Orchestrator::new(
        TaskClassifier::new(),
        Arc::clone(&registry),
        RoutingLoopGuard::new(5).unwrap(),
        TokenAccountant::default(),
        DefaultProfileConfig::default(),
    );

    let d = route(&o, "s", "r1", "hi there");
    assert!(d.profile_fallback);

    let writer = Arc::clone(&registry);
    tokio::spawn(async move {
        writer.replace_all(vec![AgentProfile::new(
            TaskCategory::GeneralConversation,
            "ollama",
            "llama3",
        )]);
    })
    .await
    .unwrap();

    let d = route(&o, "s", "r2", "hi there");
    assert!(!d.profile_fallback);
    assert_eq!(d.profile.provider, "ollama");
    assert_eq!(registry.version(), 1);
}
