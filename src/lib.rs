//! Dart Lint Fixer: regex-driven batch rewriting for Flutter sources
//!
//! Scans `lib/**/*.dart`, applies an ordered table of substitution rules to
//! each file, and writes the result back in place. The built-in table fixes
//! two lints:
//!
//! - `prefer_const_constructors`: inserts `const` before common widget
//!   constructors that follow leading whitespace
//! - `deprecated_member_use`: rewrites `.withOpacity(x)` to
//!   `.withValues(alpha: x)`
//!
//! # Architecture
//!
//! Rules are data ([`RuleDefinition`]), compiled once into a [`RuleSet`].
//! [`apply_rules`] runs a rule set over one document; [`batch::run`] walks
//! the [`FileSet`] and applies it to every file.
//!
//! Matching is purely textual. Nothing here understands Dart, so a rule can
//! fire inside a string literal or comment; the project's own analyzer is
//! the check on the result.
//!
//! # Example
//!
//! ```
//! use dart_lint_fixer::{apply_rules, RuleSet};
//!
//! let rules = RuleSet::builtin().unwrap();
//! let fixed = apply_rules("  Text('hi')", &rules).unwrap();
//! assert_eq!(fixed.text, "  const Text('hi')");
//! ```

pub mod batch;
pub mod discover;
pub mod document;
pub mod rewrite;
pub mod rules;

// Re-exports
pub use batch::{
    run, run_with, BatchError, BatchOptions, BatchReport, FailurePolicy, FileEvent, FileOutcome,
    WritePolicy,
};
pub use discover::{DiscoveryError, FileSet};
pub use document::{read_document, write_document, FileAccessError};
pub use rewrite::{apply_rules, RewriteError, RewriteOutcome, RuleHit};
pub use rules::{
    load_from_path, load_from_str, CompiledRule, ConfigError, DuplicateRuleId, PatternError,
    RuleDefinition, RuleFile, RuleSet,
};
