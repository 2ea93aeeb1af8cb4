//! Alias validation rules.
//!
//! Two rules guard the `route_alias` form field before a content save:
//!
//! - `aliasDoesNotExist`: no route owned by another node uses the alias.
//!   The lookup itself lives with the store; this module only decides
//!   whether a lookup is needed and how to read its result.
//! - `aliasValid`: the alias does not start with `/` or `\` and contains
//!   only ASCII alphanumerics, `/`, `\`, `_` and `-`.
//!
//! Blank aliases pass both rules: they mean "no route wanted".

use std::fmt;

use serde::Serialize;

/// Form field the rules are attached to.
pub const ALIAS_FIELD: &str = "route_alias";

/// Rule name for the uniqueness check.
pub const RULE_ALIAS_UNIQUE: &str = "aliasDoesNotExist";

/// Rule name for the character-set check.
pub const RULE_ALIAS_CHARSET: &str = "aliasValid";

pub const ALIAS_IN_USE_MESSAGE: &str = "This alias is already in use by another route";

pub const ALIAS_CHARSET_MESSAGE: &str = "The alias must not begin with a slash or backslash \
     character. Only alphanumeric characters, underscores, hyphens and slashes or backslashes \
     are acceptable.";

/// Punctuation allowed besides ASCII alphanumerics.
const ALLOWED_PUNCTUATION: [char; 4] = ['/', '\\', '_', '-'];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Character-set rule. The empty alias passes.
pub fn is_charset_valid(alias: &str) -> bool {
    if alias.starts_with(['/', '\\']) {
        return false;
    }
    alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(&c))
}

/// Whether the uniqueness rule has to consult the store at all.
pub fn needs_uniqueness_lookup(alias: &str) -> bool {
    !alias.is_empty()
}

/// Interpret the number of conflicting routes found by the store.
pub fn is_unique(alias: &str, conflicting_routes: i64) -> bool {
    !needs_uniqueness_lookup(alias) || conflicting_routes == 0
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of both alias rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub uniqueness: bool,
    pub charset: bool,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.uniqueness && self.charset
    }

    /// One violation per failed rule, uniqueness first.
    pub fn violations(&self) -> Vec<AliasViolation> {
        let mut violations = Vec::new();
        if !self.uniqueness {
            violations.push(AliasViolation {
                field: ALIAS_FIELD,
                rule: RULE_ALIAS_UNIQUE,
                message: ALIAS_IN_USE_MESSAGE,
            });
        }
        if !self.charset {
            violations.push(AliasViolation {
                field: ALIAS_FIELD,
                rule: RULE_ALIAS_CHARSET,
                message: ALIAS_CHARSET_MESSAGE,
            });
        }
        violations
    }

    /// Turn a failed result into an error carrying every violation.
    pub fn into_result(self) -> Result<(), AliasRejected> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AliasRejected {
                violations: self.violations(),
            })
        }
    }
}

/// A single failed rule, surfaced on the form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasViolation {
    pub field: &'static str,
    pub rule: &'static str,
    pub message: &'static str,
}

impl fmt::Display for AliasViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.rule, self.message)
    }
}

/// Returned when a content save must be blocked because of its alias.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Alias rejected: {}", summarize(.violations))]
pub struct AliasRejected {
    pub violations: Vec<AliasViolation>,
}

fn summarize(violations: &[AliasViolation]) -> String {
    violations
        .iter()
        .map(|v| v.rule)
        .collect::<Vec<_>>()
        .join(", ")
}
