//! CLI command handlers.

pub mod list;
pub mod provision;

use gitlab_connector::resource::{Profile, decompose_group_id};
use gitlab_connector::{Resource, ResourceId, ResourceKind};

/// Parse a `kind:id` resource reference from the command line.
pub fn parse_resource_ref(raw: &str) -> Result<ResourceId, String> {
    let Some((kind, id)) = raw.split_once(':') else {
        return Err(format!(
            "invalid resource reference {raw:?}: expected \"kind:id\", e.g. \"group:348/Engineering\""
        ));
    };
    if id.is_empty() {
        return Err(format!("invalid resource reference {raw:?}: empty id"));
    }
    let kind: ResourceKind = kind
        .parse()
        .map_err(|_| format!("unknown resource kind {kind:?}: expected group, project, or user"))?;
    Ok(ResourceId::new(kind, id))
}

/// Build the minimal resource record the syncers need from a bare id.
///
/// Group ids carry the display name in their composite form; other
/// kinds fall back to the raw id unless a display name is supplied.
pub fn resource_stub(id: ResourceId, display_name: Option<String>) -> Resource {
    let display_name = display_name.unwrap_or_else(|| match id.kind {
        ResourceKind::Group => decompose_group_id(&id.raw)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|_| id.raw.clone()),
        ResourceKind::Project | ResourceKind::User => id.raw.clone(),
    });

    Resource {
        id,
        display_name,
        profile: Profile::new(),
        parent: None,
    }
}
