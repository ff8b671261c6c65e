// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent registry: task category to provider/model/specialist.
//!
//! Reads are lock-free loads of an immutable snapshot. Writers build a new
//! snapshot and swap it in atomically, so a concurrent `resolve` sees either
//! the old table or the new one, never a partial update.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use switchyard_config::model::{DefaultProfileConfig, ProfileConfig};
use switchyard_core::{SwitchyardError, TaskCategory};
use tracing::info;

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    pub category: TaskCategory,
    pub provider: String,
    pub model: String,
    pub specialist_agent_id: Option<String>,
    /// Higher wins when several profiles serve the same category.
    pub priority: i32,
}

impl AgentProfile {
    pub fn new(
        category: TaskCategory,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            category,
            provider: provider.into(),
            model: model.into(),
            specialist_agent_id: None,
            priority: 0,
        }
    }

    pub fn with_specialist(mut self, agent_id: impl Into<String>) -> Self {
        self.specialist_agent_id = Some(agent_id.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Same provider and model with the specialist removed.
    pub fn without_specialist(&self) -> Self {
        Self {
            specialist_agent_id: None,
            ..self.clone()
        }
    }

    /// The configured fallback profile, stamped with the requested category.
    pub fn from_default(category: TaskCategory, config: &DefaultProfileConfig) -> Self {
        Self::new(category, config.provider.clone(), config.model.clone())
    }

    fn same_identity(&self, other: &AgentProfile) -> bool {
        self.category == other.category
            && self.provider == other.provider
            && self.model == other.model
            && self.specialist_agent_id == other.specialist_agent_id
    }
}

impl From<&ProfileConfig> for AgentProfile {
    fn from(config: &ProfileConfig) -> Self {
        Self {
            category: config.category,
            provider: config.provider.clone(),
            model: config.model.clone(),
            specialist_agent_id: config.specialist_agent_id.clone(),
            priority: config.priority,
        }
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    version: u64,
    profiles: Vec<AgentProfile>,
}

/// Read-mostly registry of agent profiles.
pub struct AgentRegistry {
    inner: ArcSwap<Snapshot>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Registry populated from `[[profiles]]`.
    pub fn from_profiles(profiles: &[ProfileConfig]) -> Self {
        let registry = Self::new();
        registry.replace_all(profiles.iter().map(AgentProfile::from).collect());
        registry
    }

    /// Highest-priority profile for `category`. Equal priorities resolve to
    /// the one registered first.
    pub fn resolve(&self, category: TaskCategory) -> Result<AgentProfile, SwitchyardError> {
        let snapshot = self.inner.load();
        let mut best: Option<&AgentProfile> = None;
        for profile in snapshot.profiles.iter().filter(|p| p.category == category) {
            if best.is_none_or(|b| profile.priority > b.priority) {
                best = Some(profile);
            }
        }
        best.cloned()
            .ok_or(SwitchyardError::NoProfileForCategory { category })
    }

    /// Add a profile, replacing any entry with the same category, provider,
    /// model, and specialist.
    pub fn register(&self, profile: AgentProfile) {
        let previous = self.inner.rcu(|current| {
            let mut profiles = current.profiles.clone();
            match profiles.iter_mut().find(|p| p.same_identity(&profile)) {
                Some(existing) => *existing = profile.clone(),
                None => profiles.push(profile.clone()),
            }
            Arc::new(Snapshot {
                version: current.version + 1,
                profiles,
            })
        });
        info!(
            category = %profile.category,
            provider = profile.provider.as_str(),
            model = profile.model.as_str(),
            specialist = profile.specialist_agent_id.as_deref().unwrap_or("-"),
            version = previous.version + 1,
            "agent profile registered"
        );
    }

    /// Atomically swap in a whole new table.
    pub fn replace_all(&self, profiles: Vec<AgentProfile>) {
        let count = profiles.len();
        let previous = self.inner.rcu(|current| {
            Arc::new(Snapshot {
                version: current.version + 1,
                profiles: profiles.clone(),
            })
        });
        info!(
            profiles = count,
            version = previous.version + 1,
            "agent registry replaced"
        );
    }

    /// Every profile, in registration order.
    pub fn all(&self) -> Vec<AgentProfile> {
        self.inner.load().profiles.clone()
    }

    /// Bumped on every `register` and `replace_all`.
    pub fn version(&self) -> u64 {
        self.inner.load().version
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.inner.load();
        f.debug_struct("AgentRegistry")
            .field("version", &snapshot.version)
            .field("profiles", &snapshot.profiles.len())
            .finish()
    }
}
