//! Canonical resource, entitlement, and grant records.
//!
//! Everything here is an immutable value produced per listing call;
//! nothing is cached or mutated after construction. The remote
//! membership list stays authoritative.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::access::AccessLevel;
use crate::error::{ConnectorError, Result};

/// Separator in composite resource ids (`"<groupId>/<groupName>"`).
const ID_SEPARATOR: char = '/';

/// Separator in entitlement ids (`"<kind>:<resourceId>:<Level>"`).
const ENTITLEMENT_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Group,
    Project,
    User,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Group => "group",
            ResourceKind::Project => "project",
            ResourceKind::User => "user",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "group" => Ok(ResourceKind::Group),
            "project" => Ok(ResourceKind::Project),
            "user" => Ok(ResourceKind::User),
            other => Err(ConnectorError::malformed_resource_id(other)),
        }
    }
}

/// A resource identifier scoped by kind. `raw` is the remote numeric id
/// for projects and users, and the composite `"<id>/<name>"` form for
/// groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub raw: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.raw)
    }
}

/// Flat key→value profile attached to a resource.
pub type Profile = Map<String, Value>;

/// Canonical representation of a remote group, project, or member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    pub profile: Profile,
    /// Structural parent for this listing pass (project→group,
    /// user→group-or-project). Immutable once set.
    pub parent: Option<ResourceId>,
}

/// A grantable (resource, access level) capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    pub resource: ResourceId,
    pub level: AccessLevel,
    pub display_name: String,
    pub description: String,
}

impl Entitlement {
    /// Build the entitlement for `level` on `resource`. Display text
    /// defaults to the level name; syncers override it with the
    /// resource-kind wording.
    pub fn new(resource: ResourceId, level: AccessLevel) -> Self {
        let id = entitlement_id(&resource, level);
        Self {
            id,
            resource,
            level,
            display_name: level.as_str().to_string(),
            description: String::new(),
        }
    }

    pub fn with_display(
        mut self,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.display_name = display_name.into();
        self.description = description.into();
        self
    }
}

/// An observed (resource, entitlement, principal) assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: String,
    pub entitlement: Entitlement,
    pub principal: ResourceId,
}

impl Grant {
    pub fn new(entitlement: Entitlement, principal: ResourceId) -> Self {
        let id = format!("{}{}{}", entitlement.id, ENTITLEMENT_SEPARATOR, principal.raw);
        Self {
            id,
            entitlement,
            principal,
        }
    }
}

/// Compose the composite group resource id.
#[must_use]
pub fn compose_group_id(group_id: &str, group_name: &str) -> String {
    format!("{group_id}{ID_SEPARATOR}{group_name}")
}

/// Decompose a composite group resource id into (id, name).
///
/// Rejects anything that does not split into exactly two non-empty
/// segments.
pub fn decompose_group_id(id: &str) -> Result<(&str, &str)> {
    let mut parts = id.split(ID_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(group_id), Some(name), None) if !group_id.is_empty() && !name.is_empty() => {
            Ok((group_id, name))
        }
        _ => Err(ConnectorError::malformed_resource_id(id)),
    }
}

/// Entitlement id for `level` on `resource`:
/// `"<kind>:<resourceId>:<LevelName>"`.
#[must_use]
pub fn entitlement_id(resource: &ResourceId, level: AccessLevel) -> String {
    format!(
        "{kind}{sep}{raw}{sep}{level}",
        kind = resource.kind,
        sep = ENTITLEMENT_SEPARATOR,
        raw = resource.raw,
        level = level.as_str(),
    )
}

/// Decompose an entitlement id back into its resource and level.
///
/// The resource segment may itself contain the composite-id separator
/// but never a colon; exactly three non-empty colon-separated segments
/// are required.
pub fn parse_entitlement_id(id: &str) -> Result<(ResourceId, AccessLevel)> {
    let mut parts = id.split(ENTITLEMENT_SEPARATOR);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(raw), Some(level), None)
            if !kind.is_empty() && !raw.is_empty() && !level.is_empty() =>
        {
            let kind: ResourceKind = kind
                .parse()
                .map_err(|_| ConnectorError::malformed_entitlement_id(id))?;
            Ok((ResourceId::new(kind, raw), AccessLevel::from_name(level)))
        }
        _ => Err(ConnectorError::malformed_entitlement_id(id)),
    }
}
