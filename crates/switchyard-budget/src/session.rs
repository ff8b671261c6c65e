// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session token counters and the usage value recorded against them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use switchyard_core::{SessionId, SwitchyardError};

/// Token counts for one completed exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Convert caller-supplied signed counts, rejecting negatives.
    pub fn try_from_signed(input_tokens: i64, output_tokens: i64) -> Result<Self, SwitchyardError> {
        let convert = |name: &str, value: i64| {
            u64::try_from(value).map_err(|_| SwitchyardError::InvalidTokenCount {
                message: format!("{name} must be non-negative, got {value}"),
            })
        };
        Ok(Self {
            input_tokens: convert("input_tokens", input_tokens)?,
            output_tokens: convert("output_tokens", output_tokens)?,
        })
    }

    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Running token totals for one conversation.
///
/// `total_tokens() == total_input_tokens + total_output_tokens` holds by
/// construction: the accountant only ever applies both counters together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub message_count: u64,
}

impl Session {
    pub(crate) fn new(session_id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            created_at: now,
            updated_at: now,
            total_input_tokens: 0,
            total_output_tokens: 0,
            message_count: 0,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }

    /// Add one exchange. All-or-nothing: on overflow nothing changes.
    pub(crate) fn apply(&mut self, usage: TokenUsage) -> Result<(), SwitchyardError> {
        let overflow = || SwitchyardError::InvalidTokenCount {
            message: format!(
                "recording {}+{} tokens would overflow session `{}`",
                usage.input_tokens, usage.output_tokens, self.session_id
            ),
        };

        let input = self
            .total_input_tokens
            .checked_add(usage.input_tokens)
            .ok_or_else(overflow)?;
        let output = self
            .total_output_tokens
            .checked_add(usage.output_tokens)
            .ok_or_else(overflow)?;
        input.checked_add(output).ok_or_else(overflow)?;

        self.total_input_tokens = input;
        self.total_output_tokens = output;
        self.message_count = self.message_count.saturating_add(1);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Zero every counter, keeping identity and creation time.
    pub(crate) fn clear(&mut self) {
        self.total_input_tokens = 0;
        self.total_output_tokens = 0;
        self.message_count = 0;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionId::parse("s").unwrap())
    }

    #[test]
    fn negative_signed_counts_are_rejected() {
        let err = TokenUsage::try_from_signed(-1, 10).unwrap_err();
        assert!(matches!(err, SwitchyardError::InvalidTokenCount { .. }));
        assert!(err.to_string().contains("input_tokens"));
        assert!(TokenUsage::try_from_signed(5, -3).is_err());
        assert_eq!(
            TokenUsage::try_from_signed(5, 3).unwrap(),
            TokenUsage::new(5, 3)
        );
    }

    #[test]
    fn apply_updates_both_counters() {
        let mut s = session();
        s.apply(TokenUsage::new(100, 40)).unwrap();
        s.apply(TokenUsage::new(10, 5)).unwrap();
        assert_eq!(s.total_input_tokens, 110);
        assert_eq!(s.total_output_tokens, 45);
        assert_eq!(s.total_tokens(), 155);
        assert_eq!(s.message_count, 2);
    }

    #[test]
    fn overflow_leaves_totals_unchanged() {
        let mut s = session();
        s.apply(TokenUsage::new(u64::MAX - 10, 0)).unwrap();
        let err = s.apply(TokenUsage::new(0, 20)).unwrap_err();
        assert!(matches!(err, SwitchyardError::InvalidTokenCount { .. }));
        assert_eq!(s.total_input_tokens, u64::MAX - 10);
        assert_eq!(s.total_output_tokens, 0);
        assert_eq!(s.message_count, 1);
    }

    #[test]
    fn clear_zeroes_counters() {
        let mut s = session();
        s.apply(TokenUsage::new(7, 7)).unwrap();
        let created = s.created_at;
        s.clear();
        assert_eq!(s.total_tokens(), 0);
        assert_eq!(s.message_count, 0);
        assert_eq!(s.created_at, created);
    }
}
