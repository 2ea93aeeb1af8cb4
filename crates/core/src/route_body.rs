//! Structured routing parameters stored in a route's `body` column.
//!
//! New rows store a JSON object. Rows written by the previous system hold
//! an array literal such as
//! `array('plugin' => 'nodes', 'controller' => 'nodes', ...)`; those are
//! parsed as data, never evaluated.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Plugin that renders content nodes.
pub const NODE_PLUGIN: &str = "nodes";

/// Controller that renders content nodes.
pub const NODE_CONTROLLER: &str = "nodes";

/// Controller action that renders a single node.
pub const NODE_ACTION: &str = "view";

static LEGACY_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^array\s*\((.*)\)\s*;?$").expect("valid regex")
});

static LEGACY_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'((?:[^'\\]|\\.)*)'\s*=>\s*'((?:[^'\\]|\\.)*)'").expect("valid regex")
});

/// Errors from decoding a stored body.
#[derive(Debug, thiserror::Error)]
pub enum RouteBodyError {
    #[error("Route body is empty")]
    Empty,

    #[error("Route body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Route body is not a readable array literal: {0}")]
    Legacy(String),

    #[error("Route body is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Route body has an unrecognized format")]
    Unrecognized,
}

/// Parameters the router needs to dispatch an alias to a node.
///
/// The JSON form carries exactly these five keys; anything else is a
/// decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteBody {
    pub plugin: String,
    pub controller: String,
    pub action: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub slug: String,
}

impl RouteBody {
    /// Body pointing at the node view action for the given type and slug.
    pub fn for_node(content_type: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            plugin: NODE_PLUGIN.to_string(),
            controller: NODE_CONTROLLER.to_string(),
            action: NODE_ACTION.to_string(),
            content_type: content_type.into(),
            slug: slug.into(),
        }
    }

    /// Serialize for storage.
    pub fn encode(&self) -> Result<String, RouteBodyError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored body, accepting both the JSON and legacy forms.
    pub fn decode(raw: &str) -> Result<Self, RouteBodyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RouteBodyError::Empty);
        }
        if raw.starts_with('{') {
            return Ok(serde_json::from_str(raw)?);
        }
        if let Some(captures) = LEGACY_ARRAY_RE.captures(raw) {
            let inner = captures.get(1).map_or("", |m| m.as_str());
            return Self::from_fields(parse_legacy_pairs(inner)?);
        }
        Err(RouteBodyError::Unrecognized)
    }

    fn from_fields(mut fields: HashMap<String, String>) -> Result<Self, RouteBodyError> {
        let mut take = |key: &'static str| {
            fields
                .remove(key)
                .ok_or(RouteBodyError::MissingField(key))
        };
        Ok(Self {
            plugin: take("plugin")?,
            controller: take("controller")?,
            action: take("action")?,
            content_type: take("type")?,
            slug: take("slug")?,
        })
    }
}

/// Read `'key' => 'value'` pairs separated by commas. Anything else
/// between pairs (nested arrays, bare words, variables) is rejected.
fn parse_legacy_pairs(inner: &str) -> Result<HashMap<String, String>, RouteBodyError> {
    let mut fields = HashMap::new();
    let mut cursor = 0;

    for captures in LEGACY_PAIR_RE.captures_iter(inner) {
        let whole = captures.get(0).ok_or(RouteBodyError::Unrecognized)?;
        check_separator(&inner[cursor..whole.start()], cursor == 0)?;
        cursor = whole.end();

        let key = captures.get(1).map_or("", |m| m.as_str());
        let value = captures.get(2).map_or("", |m| m.as_str());
        fields.insert(unescape_single_quoted(key), unescape_single_quoted(value));
    }

    let trailing = inner[cursor..].trim();
    if !(trailing.is_empty() || (trailing == "," && cursor > 0)) {
        return Err(RouteBodyError::Legacy(format!("unexpected trailing text '{trailing}'")));
    }
    Ok(fields)
}

fn check_separator(gap: &str, first: bool) -> Result<(), RouteBodyError> {
    let gap = gap.trim();
    let expected = if first { "" } else { "," };
    if gap == expected {
        Ok(())
    } else {
        Err(RouteBodyError::Legacy(format!("unexpected text '{gap}'")))
    }
}

/// Single-quoted literals only recognise `\'` and `\\`.
fn unescape_single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\'' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
