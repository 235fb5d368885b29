use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Lint addressed by the const-marker rules.
pub const PREFER_CONST_CONSTRUCTORS: &str = "prefer_const_constructors";
/// Lint addressed by the `withOpacity` migration.
pub const DEPRECATED_MEMBER_USE: &str = "deprecated_member_use";

/// A single substitution rule as written in a rule file or the built-in table.
///
/// `pattern` uses fancy-regex syntax; `replacement` is an expansion template
/// where `$1` / `${1}` / `$name` refer to capture groups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub lint: Option<String>,
    pub pattern: String,
    pub replacement: String,
}

/// Contents of a TOML rule file.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    rule_id: rule.id.clone(),
                });
            }

            if rule.pattern.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: Some(rule.id.clone()),
                    field: "pattern",
                });
            }

            if let Some(lint) = &rule.lint {
                if lint.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule_id: Some(rule.id.clone()),
                        field: "lint",
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        rule_id: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule file contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is defined more than once")
            }
        }
    }
}
