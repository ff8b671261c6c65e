// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand handlers. Each returns the JSON value to print.

use serde_json::{Value, json};
use switchyard_budget::{TokenEstimator, TokenUsage};
use switchyard_config::model::SwitchyardConfig;
use switchyard_core::SwitchyardError;
use switchyard_router::{ContextFlags, Orchestrator, RouteRequest, TaskClassifier};
use tokio_util::sync::CancellationToken;

/// Parse `--flag name` or `--flag name=false` values into context flags.
pub fn parse_flags(raw: &[String]) -> Result<ContextFlags, SwitchyardError> {
    let mut flags = ContextFlags::new();
    for entry in raw {
        let (name, value) = match entry.split_once('=') {
            Some((name, value)) => {
                let value = value.parse::<bool>().map_err(|_| {
                    SwitchyardError::validation(
                        "flag",
                        format!("`{entry}` must be name or name=true|false"),
                    )
                })?;
                (name, value)
            }
            None => (entry.as_str(), true),
        };
        if name.trim().is_empty() {
            return Err(SwitchyardError::validation("flag", "flag name must not be empty"));
        }
        flags.insert(name.to_string(), value);
    }
    Ok(flags)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, SwitchyardError> {
    serde_json::to_value(value).map_err(|e| SwitchyardError::Internal(e.to_string()))
}

pub fn classify(
    config: &SwitchyardConfig,
    text: &str,
    flags: &[String],
) -> Result<Value, SwitchyardError> {
    let classifier = TaskClassifier::from_config(&config.classifier)?;
    let classification = classifier.classify(text, &parse_flags(flags)?);
    to_json(&classification)
}

pub struct RouteArgs<'a> {
    pub session: &'a str,
    pub request: &'a str,
    pub text: &'a str,
    pub flags: &'a [String],
    pub input_tokens: Option<u64>,
    pub estimate: bool,
}

pub fn route(config: &SwitchyardConfig, args: RouteArgs<'_>) -> Result<Value, SwitchyardError> {
    let orchestrator = Orchestrator::from_config(config)?;

    let hint = match (args.input_tokens, args.estimate) {
        (Some(tokens), _) => Some(tokens),
        (None, true) => Some(TokenEstimator::new().estimate(args.text)),
        (None, false) => None,
    };

    let mut request = RouteRequest::new(args.session, args.request, args.text);
    request.context_flags = parse_flags(args.flags)?;
    request.input_tokens_hint = hint;

    let decision = orchestrator.route(&request, &CancellationToken::new())?;
    let mut value = to_json(&decision.summary())?;
    if let Some(projected) = &decision.budget_status_projected {
        value["budget_status_projected"] = to_json(projected)?;
    }
    Ok(value)
}

pub fn simulate(
    config: &SwitchyardConfig,
    session: &str,
    input: i64,
    output: i64,
    repeat: u32,
) -> Result<Value, SwitchyardError> {
    let orchestrator = Orchestrator::from_config(config)?;
    let usage = TokenUsage::try_from_signed(input, output)?;

    let mut levels = Vec::with_capacity(repeat as usize);
    for _ in 0..repeat {
        orchestrator.record(session, usage)?;
        levels.push(orchestrator.status(session)?.level);
    }

    Ok(json!({
        "session": to_json(&orchestrator.accountant().session(session))?,
        "status": to_json(&orchestrator.status(session)?)?,
        "levels": to_json(&levels)?,
    }))
}

pub fn show_config(config: &SwitchyardConfig) -> Result<String, SwitchyardError> {
    toml::to_string_pretty(config).map_err(|e| SwitchyardError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_true() {
        let flags = parse_flags(&["has_code_attachment".to_string()]).unwrap();
        assert_eq!(flags.get("has_code_attachment"), Some(&true));
    }

    #[test]
    fn flags_accept_explicit_values() {
        let flags = parse_flags(&["web_search=false".to_string()]).unwrap();
        assert_eq!(flags.get("web_search"), Some(&false));
        assert!(parse_flags(&["web_search=maybe".to_string()]).is_err());
        assert!(parse_flags(&["=true".to_string()]).is_err());
    }

    #[test]
    fn classify_outputs_category() {
        let value = classify(&SwitchyardConfig::default(), "hi, how are you?", &[]).unwrap();
        assert_eq!(value["category"], "general_conversation");
    }

    #[test]
    fn route_outputs_summary_with_projection() {
        let value = route(
            &SwitchyardConfig::default(),
            RouteArgs {
                session: "s",
                request: "r",
                text: "I got a TypeError: cannot read property 'x' of undefined",
                flags: &[],
                input_tokens: Some(60_000),
                estimate: false,
            },
        )
        .unwrap();
        assert_eq!(value["category"], "debugging");
        assert_eq!(value["specialist_agent_id"], "debug_agent");
        assert_eq!(value["budget_level"], "ok");
        assert_eq!(value["budget_status_projected"]["level"], "soft");
    }

    #[test]
    fn simulate_accumulates() {
        let value = simulate(&SwitchyardConfig::default(), "s", 20_000, 10_000, 4).unwrap();
        assert_eq!(value["status"]["total_tokens"], 120_000);
        assert_eq!(value["status"]["level"], "hard");
        assert_eq!(value["levels"], json!(["ok", "soft", "soft", "hard"]));
        assert_eq!(value["session"]["message_count"], 4);
    }

    #[test]
    fn simulate_rejects_negative_counts() {
        let err = simulate(&SwitchyardConfig::default(), "s", -1, 0, 1).unwrap_err();
        assert!(matches!(err, SwitchyardError::InvalidTokenCount { .. }));
    }

    #[test]
    fn show_config_round_trips_through_toml() {
        let rendered = show_config(&SwitchyardConfig::default()).unwrap();
        assert!(rendered.contains("[budget]"));
        assert!(switchyard_config::load_config_from_str(&rendered).is_ok());
    }
}
