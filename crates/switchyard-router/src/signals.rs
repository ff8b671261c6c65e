// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative signal tables for the task classifier.
//!
//! Each category owns a small set of named signals. A signal matches when
//! any of its matchers fires: a keyword phrase, a structural regex over the
//! raw text, or a caller-supplied context flag. Gating and boosting rules
//! sit next to the table as data, not as per-category code.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use switchyard_core::TaskCategory;

/// Fenced code block.
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```").unwrap());

/// Source-code-looking lines: definitions, imports, calls with bodies, arrows.
static CODE_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(^\s*(def|fn|pub fn|func|class|import|#include|package|public class)\s+\S)|(\b(function|const|let|var)\s+\w+\s*[=(])|(\w+\([^)]*\)\s*\{)|(\)\s*=>)",
    )
    .unwrap()
});

/// Runtime error messages (`TypeError: ...`, `cannot read property`, panics).
static ERROR_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\b\w*(error|exception)\b:)|(\b(cannot|can't) read propert(y|ies)\b)|(\bis not (a function|defined)\b)|(\bsegmentation fault\b)|(\bnull ?pointer\b)|(\bundefined is not\b)",
    )
    .unwrap()
});

/// Stack traces from common runtimes.
static STACK_TRACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(^\s*at\s+\S+.*:\d+)|(Traceback \(most recent call last\))|(File "[^"]+", line \d+)|(thread '[^']*' panicked at)"#,
    )
    .unwrap()
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(https?://\S+)|(\bwww\.\S+)").unwrap());

/// Links to hosted repositories or SSH remotes.
static REPO_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)((github\.com|gitlab\.com|bitbucket\.org)/[\w.-]+/[\w.-]+)|(git@[\w.-]+:[\w.-]+/[\w.-]+)",
    )
    .unwrap()
});

/// Context flag: the request carries a code attachment.
pub const FLAG_CODE_ATTACHMENT: &str = "has_code_attachment";
/// Context flag: the request carries an error log.
pub const FLAG_ERROR_LOG: &str = "has_error_log";
/// Context flag: the caller enabled web search for this request.
pub const FLAG_WEB_SEARCH: &str = "web_search";

/// Request text after normalization plus the caller's context flags.
pub struct SignalInput<'a> {
    raw: &'a str,
    tokens: Vec<String>,
    flags: &'a HashMap<String, bool>,
}

impl<'a> SignalInput<'a> {
    pub fn new(raw: &'a str, flags: &'a HashMap<String, bool>) -> Self {
        Self {
            raw,
            tokens: tokenize(raw),
            flags,
        }
    }

    fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    fn has_phrase(&self, phrase: &[String]) -> bool {
        !phrase.is_empty()
            && self
                .tokens
                .windows(phrase.len())
                .any(|window| window == phrase)
    }
}

/// Lowercase and split on anything that is not alphanumeric. No stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
enum Matcher {
    Phrase(Vec<String>),
    Pattern(&'static LazyLock<Regex>),
    Flag(&'static str),
}

impl Matcher {
    fn matches(&self, input: &SignalInput<'_>) -> bool {
        match self {
            Matcher::Phrase(phrase) => input.has_phrase(phrase),
            Matcher::Pattern(re) => re.is_match(input.raw),
            Matcher::Flag(name) => input.flag(name),
        }
    }
}

/// One named signal. Matches when any matcher fires.
#[derive(Debug, Clone)]
pub struct Signal {
    name: String,
    matchers: Vec<Matcher>,
}

impl Signal {
    fn keywords(name: &str, words: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            matchers: words.iter().map(|w| Matcher::Phrase(tokenize(w))).collect(),
        }
    }

    fn structural(
        name: &str,
        patterns: &[&'static LazyLock<Regex>],
        flags: &[&'static str],
    ) -> Self {
        let mut matchers: Vec<Matcher> = patterns.iter().copied().map(Matcher::Pattern).collect();
        matchers.extend(flags.iter().copied().map(Matcher::Flag));
        Self {
            name: name.to_string(),
            matchers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, input: &SignalInput<'_>) -> bool {
        self.matchers.iter().any(|m| m.matches(input))
    }

    /// Replace the keyword matchers, keeping any structural ones.
    fn replace_keywords(&mut self, words: &[String]) {
        self.matchers.retain(|m| !matches!(m, Matcher::Phrase(_)));
        self.matchers
            .extend(words.iter().map(|w| Matcher::Phrase(tokenize(w))));
    }
}

/// Additive boost applied to a category when its trigger signal matched.
#[derive(Debug, Clone)]
pub struct Boost {
    pub trigger: &'static str,
    pub amount: f64,
}

/// Signal table for one category.
#[derive(Debug, Clone)]
pub struct CategorySignals {
    pub category: TaskCategory,
    pub signals: Vec<Signal>,
    /// The category scores zero unless this signal matched.
    pub gate: Option<&'static str>,
    pub boost: Option<Boost>,
}

impl CategorySignals {
    fn new(category: TaskCategory, signals: Vec<Signal>) -> Self {
        Self {
            category,
            signals,
            gate: None,
            boost: None,
        }
    }

    fn gated_on(mut self, signal: &'static str) -> Self {
        self.gate = Some(signal);
        self
    }

    fn boosted_by(mut self, trigger: &'static str, amount: f64) -> Self {
        self.boost = Some(Boost { trigger, amount });
        self
    }

    /// Replace the keywords of `name`, or append a new keyword signal.
    pub fn override_keywords(&mut self, name: &str, words: &[String]) {
        match self.signals.iter_mut().find(|s| s.name == name) {
            Some(signal) => signal.replace_keywords(words),
            None => {
                let words: Vec<&str> = words.iter().map(String::as_str).collect();
                self.signals.push(Signal::keywords(name, &words));
            }
        }
    }

    /// Score this category: matched/total, gated, then boosted, capped at 1.0.
    pub fn score(&self, input: &SignalInput<'_>) -> (f64, Vec<String>) {
        if self.signals.is_empty() {
            return (0.0, Vec::new());
        }

        let matched: Vec<String> = self
            .signals
            .iter()
            .filter(|s| s.matches(input))
            .map(|s| s.name.clone())
            .collect();

        if let Some(gate) = self.gate
            && !matched.iter().any(|m| m == gate)
        {
            return (0.0, Vec::new());
        }

        let mut score = matched.len() as f64 / self.signals.len() as f64;
        if let Some(boost) = &self.boost
            && matched.iter().any(|m| m == boost.trigger)
        {
            score += boost.amount;
        }

        (score.min(1.0), matched)
    }
}

const REVIEW_TERMS: &[&str] = &[
    "review", "audit", "check", "scan", "assess", "analyze", "analyse", "inspect", "evaluate",
];

/// Built-in signal tables, one per scorable category.
pub fn default_tables() -> Vec<CategorySignals> {
    use TaskCategory::*;

    vec![
        CategorySignals::new(
            GeneralConversation,
            vec![
                Signal::keywords(
                    "greeting",
                    &[
                        "hi", "hello", "hey", "good morning", "good evening", "thanks",
                        "thank you", "bye", "goodbye",
                    ],
                ),
                Signal::keywords(
                    "small_talk",
                    &[
                        "how are you", "what's up", "who are you", "how is it going",
                        "how's it going", "nice to meet you", "what can you do",
                    ],
                ),
            ],
        ),
        CategorySignals::new(
            CodeAnalysis,
            vec![
                Signal::keywords(
                    "code_terms",
                    &[
                        "code", "function", "method", "class", "snippet", "refactor",
                        "explain this", "what does this do", "module", "implementation",
                        "review",
                    ],
                ),
                Signal::structural(
                    "code_structure",
                    &[&FENCED_CODE, &CODE_SYNTAX],
                    &[FLAG_CODE_ATTACHMENT],
                ),
            ],
        )
        .gated_on("code_structure"),
        CategorySignals::new(
            ComplexReasoning,
            vec![
                Signal::keywords(
                    "reasoning_terms",
                    &[
                        "step by step", "reason", "reasoning", "logic", "logical",
                        "trade off", "tradeoff", "tradeoffs", "pros and cons", "compare",
                        "derive", "think through", "implications", "why does",
                    ],
                ),
                Signal::keywords(
                    "math_terms",
                    &[
                        "prove", "proof", "theorem", "equation", "probability", "calculate",
                        "integral", "derivative", "puzzle", "riddle",
                    ],
                ),
            ],
        ),
        CategorySignals::new(
            ResearchWeb,
            vec![
                Signal::keywords(
                    "research_terms",
                    &[
                        "research", "latest", "news", "current", "recent", "sources",
                        "citations", "look up", "search for", "search the web",
                        "find information", "what happened",
                    ],
                ),
                Signal::structural("web_reference", &[&URL], &[FLAG_WEB_SEARCH]),
            ],
        ),
        CategorySignals::new(
            CreativeWriting,
            vec![
                Signal::keywords(
                    "creative_verbs",
                    &["write", "compose", "draft", "imagine", "create", "invent"],
                ),
                Signal::keywords(
                    "creative_forms",
                    &[
                        "story", "poem", "haiku", "song", "lyrics", "novel", "fiction",
                        "screenplay", "limerick", "fairy tale", "short story", "character",
                    ],
                ),
            ],
        )
        .gated_on("creative_forms"),
        CategorySignals::new(
            TechnicalDocumentation,
            vec![
                Signal::keywords(
                    "doc_terms",
                    &[
                        "documentation", "docs", "readme", "docstring", "docstrings",
                        "api reference", "user guide", "tutorial", "changelog", "jsdoc",
                        "rustdoc", "javadoc",
                    ],
                ),
                Signal::keywords(
                    "doc_verbs",
                    &["document", "write", "generate", "update", "explain", "describe"],
                ),
            ],
        )
        .gated_on("doc_terms"),
        CategorySignals::new(
            Debugging,
            vec![
                Signal::keywords(
                    "debug_terms",
                    &[
                        "bug", "bugs", "error", "errors", "exception", "crash", "crashes",
                        "crashing", "broken", "debug", "debugging", "fix", "fails", "failing",
                        "failure", "not working", "doesn't work", "undefined", "segfault",
                        "panic", "traceback", "stack trace",
                    ],
                ),
                Signal::structural(
                    "error_trace",
                    &[&ERROR_MESSAGE, &STACK_TRACE],
                    &[FLAG_ERROR_LOG],
                ),
            ],
        )
        .boosted_by("error_trace", 0.3),
        CategorySignals::new(
            SystemAnalysis,
            vec![
                Signal::keywords(
                    "system_terms",
                    &[
                        "system", "architecture", "infrastructure", "deployment",
                        "microservices", "scalability", "distributed", "kubernetes",
                        "cluster", "topology", "load balancer",
                    ],
                ),
                Signal::keywords(
                    "analysis_terms",
                    &[
                        "analyze", "analyse", "analysis", "assess", "overview", "evaluate",
                        "design", "diagram",
                    ],
                ),
            ],
        ),
        CategorySignals::new(
            SecurityReview,
            vec![
                Signal::keywords(
                    "security_terms",
                    &[
                        "security", "secure", "vulnerability", "vulnerabilities", "exploit",
                        "xss", "csrf", "sql injection", "injection", "owasp", "cve",
                        "authentication", "authorization", "sanitize", "secrets",
                    ],
                ),
                Signal::keywords("review_terms", REVIEW_TERMS),
            ],
        )
        .gated_on("security_terms"),
        CategorySignals::new(
            PerformanceReview,
            vec![
                Signal::keywords(
                    "performance_terms",
                    &[
                        "performance", "slow", "latency", "throughput", "bottleneck",
                        "optimize", "optimise", "memory leak", "cpu usage", "profiling",
                        "benchmark", "speed up", "faster",
                    ],
                ),
                Signal::keywords("review_terms", REVIEW_TERMS),
            ],
        )
        .gated_on("performance_terms"),
        CategorySignals::new(
            Testing,
            vec![
                Signal::keywords(
                    "test_terms",
                    &[
                        "test", "tests", "unit test", "unit tests", "integration test",
                        "test case", "test cases", "coverage", "mock", "mocks", "assertion",
                        "tdd", "pytest", "jest",
                    ],
                ),
                Signal::keywords(
                    "test_verbs",
                    &["write", "add", "generate", "create", "run", "increase", "improve"],
                ),
            ],
        )
        .gated_on("test_terms"),
        CategorySignals::new(
            RepositoryOperation,
            vec![
                Signal::keywords(
                    "repo_terms",
                    &[
                        "repository", "repo", "git", "commit", "branch", "pull request",
                        "merge", "clone", "rebase", "github", "gitlab", "cherry pick",
                    ],
                ),
                Signal::structural("repo_reference", &[&REPO_REFERENCE], &[]),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_flags() -> HashMap<String, bool> {
        HashMap::new()
    }

    fn table(category: TaskCategory) -> CategorySignals {
        default_tables()
            .into_iter()
            .find(|t| t.category == category)
            .unwrap()
    }

    #[test]
    fn tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("Hi, how's it GOING?"),
            vec!["hi", "how", "s", "it", "going"]
        );
        assert!(tokenize("  \t ").is_empty());
    }

    #[test]
    fn phrases_match_contiguous_tokens() {
        let flags = no_flags();
        let input = SignalInput::new("please open a pull request", &flags);
        assert!(input.has_phrase(&tokenize("pull request")));
        assert!(!input.has_phrase(&tokenize("request pull")));
    }

    #[test]
    fn keywords_do_not_match_inside_words() {
        let flags = no_flags();
        let input = SignalInput::new("this is thigh-level", &flags);
        assert!(!input.has_phrase(&tokenize("hi")));
    }

    #[test]
    fn every_scorable_category_has_a_table() {
        let tables = default_tables();
        for category in TaskCategory::scorable() {
            assert!(
                tables.iter().any(|t| t.category == category),
                "no table for {category}"
            );
        }
        assert!(tables.iter().all(|t| t.category != TaskCategory::Unclassified));
    }

    #[test]
    fn gates_and_boosts_name_real_signals() {
        for t in default_tables() {
            if let Some(gate) = t.gate {
                assert!(t.signals.iter().any(|s| s.name() == gate), "{}", t.category);
            }
            if let Some(boost) = &t.boost {
                assert!(t.signals.iter().any(|s| s.name() == boost.trigger));
            }
        }
    }

    #[test]
    fn code_analysis_is_gated_on_structure() {
        let flags = no_flags();
        let t = table(TaskCategory::CodeAnalysis);
        let (score, signals) = t.score(&SignalInput::new("explain this code", &flags));
        assert_eq!(score, 0.0);
        assert!(signals.is_empty());

        let (score, _) = t.score(&SignalInput::new(
            "explain this code\n```\nfn main() {}\n```",
            &flags,
        ));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn code_attachment_flag_opens_the_gate() {
        let mut flags = no_flags();
        flags.insert(FLAG_CODE_ATTACHMENT.to_string(), true);
        let (score, signals) =
            table(TaskCategory::CodeAnalysis).score(&SignalInput::new("review this", &flags));
        assert_eq!(score, 1.0);
        assert_eq!(signals, vec!["code_terms", "code_structure"]);
    }

    #[test]
    fn error_pattern_boosts_debugging_without_keywords() {
        let flags = no_flags();
        let (score, signals) = table(TaskCategory::Debugging).score(&SignalInput::new(
            "    at Object.<anonymous> (/srv/index.js:10:5)",
            &flags,
        ));
        assert!((score - 0.8).abs() < 1e-9);
        assert_eq!(signals, vec!["error_trace"]);
    }

    #[test]
    fn error_log_flag_counts_as_error_trace() {
        let mut flags = no_flags();
        flags.insert(FLAG_ERROR_LOG.to_string(), true);
        let (score, _) = table(TaskCategory::Debugging).score(&SignalInput::new("look", &flags));
        assert!(score > 0.4);
    }

    #[test]
    fn false_flags_are_ignored() {
        let mut flags = no_flags();
        flags.insert(FLAG_WEB_SEARCH.to_string(), false);
        let (score, _) = table(TaskCategory::ResearchWeb).score(&SignalInput::new("ok", &flags));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn override_replaces_or_appends() {
        let mut t = table(TaskCategory::Debugging);
        t.override_keywords("debug_terms", &["kaboom".to_string()]);
        t.override_keywords("oncall", &["pager".to_string()]);
        assert_eq!(t.signals.len(), 3);

        let flags = no_flags();
        let (_, signals) = t.score(&SignalInput::new("kaboom, the pager went off", &flags));
        assert_eq!(signals, vec!["debug_terms", "oncall"]);

        let (_, signals) = t.score(&SignalInput::new("there is a bug", &flags));
        assert!(signals.is_empty());
    }

    #[test]
    fn structural_matchers_survive_keyword_override() {
        let mut t = table(TaskCategory::CodeAnalysis);
        t.override_keywords("code_structure", &["snippet".to_string()]);
        let flags = no_flags();
        let (score, _) = t.score(&SignalInput::new("```\nx\n```", &flags));
        assert!(score > 0.0);
    }
}
