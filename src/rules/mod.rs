//! Rule definitions, the built-in table, and rule-file loading.

pub mod builtin;
pub mod compiled;
pub mod loader;
pub mod schema;

pub use builtin::{BuiltinRule, BUILTIN_RULES};
pub use compiled::{CompiledRule, DuplicateRuleId, PatternError, RuleSet, BACKTRACK_LIMIT};
pub use loader::{load_from_path, load_from_str, ConfigError, RuleFile};
pub use schema::{
    Metadata, RuleConfig, RuleDefinition, ValidationError, ValidationIssue,
    DEPRECATED_MEMBER_USE, PREFER_CONST_CONSTRUCTORS,
};
