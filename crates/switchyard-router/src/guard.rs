// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing loop guard.
//!
//! Tracks which specialist agents have handled each request chain and
//! refuses a second visit to the same agent or a visit past the hop limit.
//! State is keyed by request id and released explicitly with [`RoutingLoopGuard::close`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use strum::Display;
use switchyard_config::model::GuardConfig;
use switchyard_core::{RequestId, SwitchyardError};
use tracing::debug;

/// Outcome of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VisitDecision {
    Allow,
    /// The agent already ran in this chain.
    DenyRepeat,
    /// The chain used up its hops, or was already blocked.
    DenyHopLimit,
}

impl VisitDecision {
    pub fn is_allowed(self) -> bool {
        self == VisitDecision::Allow
    }
}

/// Lifecycle of a chain while it is tracked. Closed chains are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    Open,
    /// Terminal: every further visit is denied.
    Blocked,
}

/// Per-request mutable state. Never shared across requests.
#[derive(Debug)]
pub struct RoutingChainState {
    request_id: RequestId,
    visited_agents: HashSet<String>,
    hop_count: u32,
    max_hops: u32,
    status: ChainStatus,
    created_at: Instant,
}

impl RoutingChainState {
    fn new(request_id: RequestId, max_hops: u32) -> Self {
        Self {
            request_id,
            visited_agents: HashSet::new(),
            hop_count: 0,
            max_hops,
            status: ChainStatus::Open,
            created_at: Instant::now(),
        }
    }

    fn visit(&mut self, agent_id: &str) -> VisitDecision {
        if self.visited_agents.contains(agent_id) {
            self.status = ChainStatus::Blocked;
            return VisitDecision::DenyRepeat;
        }
        if self.status == ChainStatus::Blocked || self.hop_count >= self.max_hops {
            self.status = ChainStatus::Blocked;
            return VisitDecision::DenyHopLimit;
        }
        self.visited_agents.insert(agent_id.to_string());
        self.hop_count += 1;
        VisitDecision::Allow
    }

    fn snapshot(&self) -> ChainSnapshot {
        let mut visited_agents: Vec<String> = self.visited_agents.iter().cloned().collect();
        visited_agents.sort();
        ChainSnapshot {
            request_id: self.request_id.clone(),
            status: self.status,
            visited_agents,
            hop_count: self.hop_count,
            max_hops: self.max_hops,
        }
    }
}

/// Read-only copy of a chain for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSnapshot {
    pub request_id: RequestId,
    pub status: ChainStatus,
    /// Sorted; visit order is not tracked.
    pub visited_agents: Vec<String>,
    pub hop_count: u32,
    pub max_hops: u32,
}

/// Concurrent loop guard keyed by request id.
#[derive(Debug)]
pub struct RoutingLoopGuard {
    chains: DashMap<RequestId, RoutingChainState>,
    max_hops: u32,
    chain_ttl: Duration,
}

impl RoutingLoopGuard {
    /// Guard with the given hop limit and a five minute stale-chain TTL.
    pub fn new(max_hops: u32) -> Result<Self, SwitchyardError> {
        Self::with_ttl(max_hops, Duration::from_secs(300))
    }

    pub fn with_ttl(max_hops: u32, chain_ttl: Duration) -> Result<Self, SwitchyardError> {
        if max_hops == 0 {
            return Err(SwitchyardError::Config(
                "guard.max_hops must be at least 1".to_string(),
            ));
        }
        if chain_ttl.is_zero() {
            return Err(SwitchyardError::Config(
                "guard.chain_ttl_secs must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            chains: DashMap::new(),
            max_hops,
            chain_ttl,
        })
    }

    pub fn from_config(config: &GuardConfig) -> Result<Self, SwitchyardError> {
        Self::with_ttl(config.max_hops, Duration::from_secs(config.chain_ttl_secs))
    }

    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    pub fn chain_ttl(&self) -> Duration {
        self.chain_ttl
    }

    /// Record a dispatch attempt of `agent_id` within `request_id`'s chain.
    ///
    /// A repeat visit is checked before the hop limit and leaves the visited
    /// set and hop count untouched. Any denial blocks the chain.
    pub fn try_visit(
        &self,
        request_id: &str,
        agent_id: &str,
    ) -> Result<VisitDecision, SwitchyardError> {
        let id = RequestId::parse(request_id)?;
        if agent_id.trim().is_empty() {
            return Err(SwitchyardError::validation("agent_id", "must not be empty"));
        }

        let max_hops = self.max_hops;
        let mut chain = self
            .chains
            .entry(id.clone())
            .or_insert_with(|| RoutingChainState::new(id.clone(), max_hops));
        if chain.created_at.elapsed() >= self.chain_ttl {
            debug!(request_id = request_id, "expired routing chain restarted");
            *chain = RoutingChainState::new(id, max_hops);
        }
        let decision = chain.visit(agent_id);

        debug!(
            request_id = request_id,
            agent_id = agent_id,
            hop_count = chain.hop_count,
            decision = %decision,
            "loop guard visit"
        );
        Ok(decision)
    }

    /// Undo an allowed visit. Used when routing is abandoned after the
    /// guard already counted the hop. Returns whether anything was undone.
    pub fn release(&self, request_id: &str, agent_id: &str) -> bool {
        let Ok(id) = RequestId::parse(request_id) else {
            return false;
        };

        let (released, now_empty) = match self.chains.get_mut(&id) {
            Some(mut chain) => {
                let released = chain.visited_agents.remove(agent_id);
                if released {
                    chain.hop_count = chain.hop_count.saturating_sub(1);
                }
                let empty = chain.hop_count == 0 && chain.status == ChainStatus::Open;
                (released, empty)
            }
            None => (false, false),
        };

        if now_empty {
            self.chains
                .remove_if(&id, |_, c| c.hop_count == 0 && c.status == ChainStatus::Open);
        }
        released
    }

    /// Mark the chain complete and drop its state. Idempotent.
    pub fn close(&self, request_id: &str) {
        if let Ok(id) = RequestId::parse(request_id)
            && self.chains.remove(&id).is_some()
        {
            debug!(request_id = request_id, "routing chain closed");
        }
    }

    pub fn chain(&self, request_id: &str) -> Option<ChainSnapshot> {
        let id = RequestId::parse(request_id).ok()?;
        self.chains.get(&id).map(|c| c.snapshot())
    }

    pub fn active_chains(&self) -> usize {
        self.chains.len()
    }

    /// Drop chains older than `ttl` that were never closed. Returns how many.
    pub fn sweep_stale(&self, ttl: Duration) -> usize {
        let before = self.chains.len();
        self.chains.retain(|_, c| c.created_at.elapsed() < ttl);
        let swept = before.saturating_sub(self.chains.len());
        if swept > 0 {
            debug!(swept = swept, "stale routing chains swept");
        }
        swept
    }

    /// [`sweep_stale`](Self::sweep_stale) with the configured TTL.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_stale(self.chain_ttl)
    }
}
