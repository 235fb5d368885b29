//! Whole-document rule application.
//!
//! Rules run in order, each one replacing every non-overlapping match across
//! the full text produced by the rule before it. There is no parsing: an
//! identifier inside a string literal or comment is rewritten like any other.

use crate::rules::{CompiledRule, RuleSet};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    /// The regex engine gave up on a rule (e.g. backtracking limit).
    #[error("rule '{id}' failed while matching: {source}")]
    Engine {
        id: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
}

/// How often one rule fired on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub id: String,
    pub count: usize,
}

/// Result of running a rule set over one document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RewriteOutcome carries the rewritten text"]
pub struct RewriteOutcome {
    /// Rewritten document
    pub text: String,
    /// Rules that matched at least once, in application order
    pub hits: Vec<RuleHit>,
}

impl RewriteOutcome {
    /// Whether any rule matched at least once.
    pub fn fired(&self) -> bool {
        !self.hits.is_empty()
    }

    pub fn total_hits(&self) -> usize {
        self.hits.iter().map(|h| h.count).sum()
    }
}

/// Apply `rules` to `document`, left to right.
pub fn apply_rules(document: &str, rules: &RuleSet) -> Result<RewriteOutcome, RewriteError> {
    let mut text = document.to_string();
    let mut hits = Vec::new();

    for rule in rules {
        let count = count_matches(rule, &text)?;
        if count == 0 {
            continue;
        }

        let replaced = rule
            .regex()
            .try_replacen(&text, 0, rule.replacement())
            .map_err(|source| engine_error(rule, source))?
            .into_owned();
        text = replaced;

        hits.push(RuleHit {
            id: rule.id().to_string(),
            count,
        });
    }

    Ok(RewriteOutcome { text, hits })
}

fn count_matches(rule: &CompiledRule, text: &str) -> Result<usize, RewriteError> {
    let mut count = 0;
    for found in rule.regex().find_iter(text) {
        found.map_err(|source| engine_error(rule, source))?;
        count += 1;
    }
    Ok(count)
}

fn engine_error(rule: &CompiledRule, source: fancy_regex::Error) -> RewriteError {
    RewriteError::Engine {
        id: rule.id().to_string(),
        source: Box::new(source),
    }
}
