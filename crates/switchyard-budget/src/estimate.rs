// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local token estimates for text the provider has not yet counted.
//!
//! Used to project budget status before a request is sent. Recorded usage
//! should always come from the provider when available.

use std::sync::{Arc, OnceLock};

use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Rough estimate: one token per four characters, rounded up.
pub fn heuristic_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

fn shared_bpe() -> Option<Arc<CoreBPE>> {
    static BPE: OnceLock<Option<Arc<CoreBPE>>> = OnceLock::new();
    BPE.get_or_init(|| match tiktoken_rs::cl100k_base() {
        Ok(bpe) => Some(Arc::new(bpe)),
        Err(e) => {
            warn!(error = %e, "cl100k_base tokenizer unavailable, falling back to heuristic");
            None
        }
    })
    .clone()
}

/// Token estimator backed by the `cl100k_base` BPE, with a character
/// heuristic fallback when the tokenizer cannot be loaded.
#[derive(Clone)]
pub struct TokenEstimator {
    bpe: Option<Arc<CoreBPE>>,
}

impl TokenEstimator {
    /// Estimator using the shared `cl100k_base` encoding.
    pub fn new() -> Self {
        Self { bpe: shared_bpe() }
    }

    /// Estimator that only uses [`heuristic_tokens`].
    pub fn heuristic() -> Self {
        Self { bpe: None }
    }

    pub fn is_exact(&self) -> bool {
        self.bpe.is_some()
    }

    pub fn estimate(&self, text: &str) -> u64 {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len() as u64,
            None => heuristic_tokens(text),
        }
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEstimator")
            .field("exact", &self.is_exact())
            .finish()
    }
}
