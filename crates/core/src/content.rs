//! The slice of a content node that route synchronization reads.
//!
//! Content rows belong to the host application. Only the fields needed to
//! build a route travel here, together with the two transient form fields
//! (`route_alias`, `route_status`) submitted alongside the node.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::DbId;

/// A content save as seen by the route synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSubmission {
    /// `None` for a node that has not been inserted yet.
    pub id: Option<DbId>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub slug: String,
    /// `None` when the form did not carry the field at all.
    #[serde(default)]
    pub route_alias: Option<String>,
    /// Unchecked checkboxes submit nothing, so `None` means disabled.
    #[serde(default, deserialize_with = "checkbox")]
    pub route_status: Option<bool>,
}

/// What the submission asks for, after whitespace trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasRequest<'a> {
    /// No `route_alias` field was submitted; routes are left untouched.
    Absent,
    /// The field was submitted blank: no route wanted.
    Empty,
    /// A route is wanted under this alias (stored untrimmed).
    Alias(&'a str),
}

impl ContentSubmission {
    pub fn new(id: DbId, content_type: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            content_type: content_type.into(),
            slug: slug.into(),
            route_alias: None,
            route_status: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.route_alias = Some(alias.into());
        self
    }

    pub fn with_status(mut self, enabled: bool) -> Self {
        self.route_status = Some(enabled);
        self
    }

    /// Fill in the id the store assigned on insert. An id already present
    /// in the submission wins.
    pub fn with_assigned_id(mut self, id: DbId) -> Self {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self
    }

    /// Route status to persist. Absent means disabled, not "unchanged".
    pub fn status_enabled(&self) -> bool {
        self.route_status.unwrap_or(false)
    }

    pub fn alias_request(&self) -> AliasRequest<'_> {
        match self.route_alias.as_deref() {
            None => AliasRequest::Absent,
            Some(alias) if alias.trim().is_empty() => AliasRequest::Empty,
            Some(alias) => AliasRequest::Alias(alias),
        }
    }
}

/// Accepts the shapes an HTML checkbox arrives in: booleans, `0`/`1`,
/// and the strings `"0"`, `"1"`, `"on"`, `"true"`, `"false"`, `""`.
fn checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        Raw::Bool(b) => b,
        Raw::Int(n) => n != 0,
        Raw::Str(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "on" | "true"),
    }))
}
