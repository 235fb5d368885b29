//! The built-in rule table.
//!
//! Every const-marker pattern has the same shape:
//!
//! ```text
//! (?<!const)(?<!\s)(\s+)Widget\(
//! ```
//!
//! `(\s+)` captures the whole whitespace run in front of the identifier
//! (`(?<!\s)` pins the start of the run), and `(?<!const)` skips calls that
//! already carry the marker, so running the table twice never yields
//! `const const`.

use crate::rules::schema::{RuleDefinition, DEPRECATED_MEMBER_USE, PREFER_CONST_CONSTRUCTORS};

/// Static form of [`RuleDefinition`] for the compiled-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinRule {
    pub id: &'static str,
    pub lint: &'static str,
    pub pattern: &'static str,
    pub replacement: &'static str,
}

impl BuiltinRule {
    pub fn to_definition(&self) -> RuleDefinition {
        RuleDefinition {
            id: self.id.to_string(),
            lint: Some(self.lint.to_string()),
            pattern: self.pattern.to_string(),
            replacement: self.replacement.to_string(),
        }
    }
}

/// Applied in this order.
pub const BUILTIN_RULES: &[BuiltinRule] = &[
    // Any call
    BuiltinRule {
        id: "const-icon",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Icon\(",
        replacement: "${1}const Icon(",
    },
    BuiltinRule {
        id: "const-text",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Text\(",
        replacement: "${1}const Text(",
    },
    BuiltinRule {
        id: "const-sized-box",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)SizedBox\(",
        replacement: "${1}const SizedBox(",
    },
    BuiltinRule {
        id: "const-edge-insets",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)EdgeInsets\.",
        replacement: "${1}const EdgeInsets.",
    },
    BuiltinRule {
        id: "const-padding",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Padding\(",
        replacement: "${1}const Padding(",
    },
    BuiltinRule {
        id: "const-center",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Center\(",
        replacement: "${1}const Center(",
    },
    BuiltinRule {
        id: "const-column",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Column\(",
        replacement: "${1}const Column(",
    },
    BuiltinRule {
        id: "const-row",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Row\(",
        replacement: "${1}const Row(",
    },
    // Exactly-empty argument list
    BuiltinRule {
        id: "const-empty-container",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Container\(\s*\)",
        replacement: "${1}const Container()",
    },
    BuiltinRule {
        id: "const-empty-spacer",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Spacer\(\s*\)",
        replacement: "${1}const Spacer()",
    },
    BuiltinRule {
        id: "const-empty-divider",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)Divider\(\s*\)",
        replacement: "${1}const Divider()",
    },
    BuiltinRule {
        id: "const-empty-progress-indicator",
        lint: PREFER_CONST_CONSTRUCTORS,
        pattern: r"(?<!const)(?<!\s)(\s+)CircularProgressIndicator\(\s*\)",
        replacement: "${1}const CircularProgressIndicator()",
    },
    BuiltinRule {
        id: "with-opacity-to-with-values",
        lint: DEPRECATED_MEMBER_USE,
        pattern: r"\.withOpacity\(([0-9.]+)\)",
        replacement: ".withValues(alpha: ${1})",
    },
];

/// Owned definitions for the whole built-in table, in application order.
pub fn definitions() -> Vec<RuleDefinition> {
    BUILTIN_RULES.iter().map(BuiltinRule::to_definition).collect()
}
