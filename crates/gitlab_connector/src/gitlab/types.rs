//! GitLab API wire types - the fields the connector reads.

use serde::{Deserialize, Serialize};

/// A GitLab group.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    /// Group ID.
    pub id: u64,
    /// Group name.
    pub name: String,
    /// Group description.
    #[serde(default)]
    pub description: Option<String>,
    /// Parent group ID for subgroups; absent or zero for top-level
    /// groups.
    #[serde(default)]
    pub parent_id: Option<u64>,
}

/// A GitLab project.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Project ID.
    pub id: u64,
    /// Project name.
    pub name: String,
    /// Project description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A group or project membership record.
///
/// The group-members and project-members endpoints return the same
/// field set for everything the connector reads, so one struct covers
/// both; the distinction is resolved here at the client boundary
/// rather than re-discriminated at every call site.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// User ID of the member.
    pub id: u64,
    /// Username (login).
    pub username: String,
    /// Display name.
    pub name: String,
    /// Account state, e.g. "active" or "blocked".
    pub state: String,
    /// Numeric access-level code (see [`crate::access::AccessLevel`]).
    pub access_level: u64,
    /// Email, only present for enterprise users of the queried
    /// namespace; usually filled in via [`UserDetail`] enrichment.
    #[serde(default)]
    pub email: Option<String>,
}

/// User detail record used for email enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetail {
    pub id: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub public_email: Option<String>,
}

impl UserDetail {
    /// The email to surface, preferring the public one when set.
    #[must_use]
    pub fn best_email(&self) -> Option<&str> {
        self.public_email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(self.email.as_deref().filter(|e| !e.is_empty()))
    }
}

/// Request body for adding a member to a group or project.
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub user_id: u64,
    pub access_level: u64,
}
