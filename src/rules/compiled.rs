use crate::rules::builtin;
use crate::rules::schema::RuleDefinition;
use fancy_regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use thiserror::Error;

/// Backtracking budget for one search. Look-behind patterns run in the
/// backtracking VM, which spends a couple of steps per scanned position, so
/// the budget has to cover whole documents rather than single matches.
pub const BACKTRACK_LIMIT: usize = 1_000_000_000;

/// A rule definition whose pattern failed to compile.
///
/// Raised while building a [`RuleSet`], before any file is read.
#[derive(Error, Debug)]
#[error("rule '{id}' has an invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub id: String,
    pub pattern: String,
    #[source]
    pub source: Box<fancy_regex::Error>,
}

/// A rule id that is already taken in the set being extended.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rule id '{id}' is already defined")]
pub struct DuplicateRuleId {
    pub id: String,
}

/// A rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    definition: RuleDefinition,
    regex: Regex,
}

impl CompiledRule {
    pub fn new(definition: RuleDefinition) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(&definition.pattern)
            .backtrack_limit(BACKTRACK_LIMIT)
            .build()
            .map_err(|source| PatternError {
                id: definition.id.clone(),
                pattern: definition.pattern.clone(),
                source: Box::new(source),
            })?;
        Ok(Self { definition, regex })
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn lint(&self) -> Option<&str> {
        self.definition.lint.as_deref()
    }

    pub fn pattern(&self) -> &str {
        &self.definition.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.definition.replacement
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Ordered list of compiled rules. Order is application order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn compile(
        definitions: impl IntoIterator<Item = RuleDefinition>,
    ) -> Result<Self, PatternError> {
        let rules = definitions
            .into_iter()
            .map(CompiledRule::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The compiled-in table for `prefer_const_constructors` and the
    /// `withOpacity` deprecation.
    pub fn builtin() -> Result<Self, PatternError> {
        Self::compile(builtin::definitions())
    }

    /// Append rules after the current ones. Ids must stay unique across the
    /// combined set; on conflict nothing is appended.
    pub fn extend(&mut self, other: RuleSet) -> Result<(), DuplicateRuleId> {
        let existing: HashSet<&str> = self.rules.iter().map(CompiledRule::id).collect();
        if let Some(clash) = other.rules.iter().find(|rule| existing.contains(rule.id())) {
            return Err(DuplicateRuleId {
                id: clash.id().to_string(),
            });
        }
        self.rules.extend(other.rules);
        Ok(())
    }

    /// Keep only rules tagged with one of `lints`. An empty filter keeps all.
    pub fn retain_lints(&mut self, lints: &[String]) {
        if lints.is_empty() {
            return;
        }
        self.rules.retain(|rule| {
            rule.lint()
                .is_some_and(|lint| lints.iter().any(|wanted| wanted == lint))
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a CompiledRule;
    type IntoIter = std::slice::Iter<'a, CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::schema::{DEPRECATED_MEMBER_USE, PREFER_CONST_CONSTRUCTORS};

    #[test]
    fn builtin_table_compiles() {
        let rules = RuleSet::builtin().unwrap();
        assert_eq!(rules.len(), builtin::BUILTIN_RULES.len());
        assert_eq!(rules.iter().next().unwrap().id(), "const-icon");
    }

    #[test]
    fn malformed_pattern_names_the_rule() {
        let err = RuleSet::compile(vec![RuleDefinition {
            id: "broken".to_string(),
            lint: None,
            pattern: r"Text\(".to_string() + "(",
            replacement: String::new(),
        }])
        .unwrap_err();
        assert_eq!(err.id, "broken");
        assert!(err.to_string().contains("rule 'broken'"));
    }

    #[test]
    fn retain_lints_filters_by_tag() {
        let mut rules = RuleSet::builtin().unwrap();
        rules.retain_lints(&[DEPRECATED_MEMBER_USE.to_string()]);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.iter().next().unwrap().id(), "with-opacity-to-with-values");

        let mut rules = RuleSet::builtin().unwrap();
        rules.retain_lints(&[PREFER_CONST_CONSTRUCTORS.to_string()]);
        assert_eq!(rules.len(), builtin::BUILTIN_RULES.len() - 1);
    }

    #[test]
    fn extend_rejects_ids_already_in_the_set() {
        let mut rules = RuleSet::builtin().unwrap();
        let shadow = RuleSet::compile(vec![
            RuleDefinition {
                id: "const-card".to_string(),
                lint: None,
                pattern: "Card".to_string(),
                replacement: "const Card".to_string(),
            },
            RuleDefinition {
                id: "const-text".to_string(),
                lint: None,
                pattern: "Text".to_string(),
                replacement: "Label".to_string(),
            },
        ])
        .unwrap();

        let err = rules.extend(shadow).unwrap_err();
        assert_eq!(err.id, "const-text");
        assert_eq!(rules.len(), builtin::BUILTIN_RULES.len());
    }

    #[test]
    fn extend_appends_new_ids_in_order() {
        let mut rules = RuleSet::builtin().unwrap();
        let extra = RuleSet::compile(vec![RuleDefinition {
            id: "const-card".to_string(),
            lint: None,
            pattern: "Card".to_string(),
            replacement: "const Card".to_string(),
        }])
        .unwrap();

        rules.extend(extra).unwrap();
        assert_eq!(rules.iter().last().unwrap().id(), "const-card");
    }

    #[test]
    fn empty_lint_filter_keeps_everything() {
        let mut rules = RuleSet::builtin().unwrap();
        rules.retain_lints(&[]);
        assert_eq!(rules.len(), builtin::BUILTIN_RULES.len());
    }
}
