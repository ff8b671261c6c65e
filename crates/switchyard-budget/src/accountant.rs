// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session token accounting.
//!
//! The accountant is the single source of truth for how many tokens each
//! conversation has consumed. Counts are supplied by the caller (provider
//! usage or a local estimate) and are never recomputed here.
//!
//! Sessions live in a sharded [`DashMap`]: a `record` for one session holds
//! that session's shard lock for the whole read-modify-write, while records
//! for sessions in other shards proceed in parallel.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use switchyard_config::model::BudgetConfig;
use switchyard_core::{SessionId, SwitchyardError};
use tracing::{debug, warn};

use crate::session::{Session, TokenUsage};
use crate::status::{BudgetStatus, BudgetThresholds};

/// In-memory token accountant keyed by session id.
#[derive(Debug)]
pub struct TokenAccountant {
    sessions: DashMap<SessionId, Session>,
    thresholds: BudgetThresholds,
}

impl TokenAccountant {
    pub fn new(thresholds: BudgetThresholds) -> Self {
        Self {
            sessions: DashMap::new(),
            thresholds,
        }
    }

    /// Create an accountant from the `[budget]` config section.
    pub fn from_config(config: &BudgetConfig) -> Result<Self, SwitchyardError> {
        BudgetThresholds::from_config(config).map(Self::new)
    }

    pub fn thresholds(&self) -> BudgetThresholds {
        self.thresholds
    }

    /// Add one exchange's tokens to a session, creating the session if absent.
    ///
    /// Returns a snapshot of the session after the update. On failure the
    /// session's totals are untouched and no session is created.
    pub fn record(&self, session_id: &str, usage: TokenUsage) -> Result<Session, SwitchyardError> {
        let id = SessionId::parse(session_id)?;

        let (before, session) = match self.sessions.entry(id.clone()) {
            Entry::Occupied(mut occupied) => {
                let session = occupied.get_mut();
                let before = session.total_tokens();
                session.apply(usage)?;
                (before, session.clone())
            }
            Entry::Vacant(vacant) => {
                let mut session = Session::new(id);
                session.apply(usage)?;
                (0, vacant.insert(session).clone())
            }
        };

        let total = session.total_tokens();
        debug!(
            session_id = session_id,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            total_tokens = total,
            "recorded token usage"
        );

        let level_before = self.thresholds.level_for(before);
        let level_after = self.thresholds.level_for(total);
        if level_after > level_before {
            warn!(
                session_id = session_id,
                total_tokens = total,
                level = %level_after,
                "session crossed budget threshold"
            );
        }

        Ok(session)
    }

    /// Current budget status of a session. Pure: never mutates state.
    ///
    /// Unknown sessions report zero usage.
    pub fn status(&self, session_id: &str) -> Result<BudgetStatus, SwitchyardError> {
        self.project(session_id, 0)
    }

    /// Budget status the session would have after `extra_tokens` more.
    pub fn project(
        &self,
        session_id: &str,
        extra_tokens: u64,
    ) -> Result<BudgetStatus, SwitchyardError> {
        let id = SessionId::parse(session_id)?;
        let total = self
            .sessions
            .get(&id)
            .map(|s| s.total_tokens())
            .unwrap_or(0);
        Ok(self.thresholds.status_for(total.saturating_add(extra_tokens)))
    }

    /// Zero all counters for a session. Idempotent; unknown sessions are
    /// created zeroed.
    pub fn reset(&self, session_id: &str) -> Result<(), SwitchyardError> {
        let id = SessionId::parse(session_id)?;
        self.sessions
            .entry(id.clone())
            .and_modify(Session::clear)
            .or_insert_with(|| Session::new(id));
        debug!(session_id = session_id, "session token counters reset");
        Ok(())
    }

    /// Snapshot of one session, if it exists.
    pub fn session(&self, session_id: &str) -> Option<Session> {
        let id = SessionId::parse(session_id).ok()?;
        self.sessions.get(&id).map(|s| s.clone())
    }

    /// Snapshots of every session, ordered by id.
    pub fn sessions(&self) -> Vec<Session> {
        let mut all: Vec<Session> = self.sessions.iter().map(|s| s.value().clone()).collect();
        all.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        all
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for TokenAccountant {
    fn default() -> Self {
        Self::new(BudgetThresholds::default())
    }
}
