//! Group listing, entitlements, grants, and membership mutations.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{
    MutationOutcome, Provisioner, ResourceSyncer, classify_grant_error, classify_revoke_error,
    principal_user_id,
};
use crate::access::{AccessLevel, GRANTABLE_LEVELS};
use crate::error::Result;
use crate::gitlab::{GitlabClient, Group, Member};
use crate::pagination::parse_cursor;
use crate::resource::{
    Entitlement, Grant, Profile, Resource, ResourceId, ResourceKind, compose_group_id,
    decompose_group_id,
};

/// Syncer for GitLab groups.
///
/// Group resources carry the composite `"<id>/<name>"` id so a later
/// call can reconstruct both the API id and the display name without
/// refetching the group.
pub struct GroupSyncer {
    client: Arc<GitlabClient>,
}

impl GroupSyncer {
    pub fn new(client: Arc<GitlabClient>) -> Self {
        Self { client }
    }

    fn resource_from(group: Group) -> Resource {
        let mut profile = Profile::new();
        profile.insert("id".to_string(), Value::from(group.id));
        profile.insert("name".to_string(), Value::from(group.name.clone()));
        if let Some(description) = group.description {
            profile.insert("description".to_string(), Value::from(description));
        }
        // Zero means "no parent" on the wire.
        if let Some(parent_id) = group.parent_id.filter(|&id| id != 0) {
            profile.insert("parent_group_id".to_string(), Value::from(parent_id));
        }

        Resource {
            id: ResourceId::new(
                ResourceKind::Group,
                compose_group_id(&group.id.to_string(), &group.name),
            ),
            display_name: group.name,
            profile,
            parent: None,
        }
    }

    fn entitlement_for(resource: &Resource, level: AccessLevel) -> Entitlement {
        Entitlement::new(resource.id.clone(), level).with_display(
            format!("{} Group {level}", resource.display_name),
            format!("{level} on the {} group in Gitlab", resource.display_name),
        )
    }

    fn grant_from(resource: &Resource, member: &Member) -> Grant {
        let level = AccessLevel::from_code(member.access_level);
        if level == AccessLevel::None && member.access_level != 0 {
            tracing::warn!(
                user_id = member.id,
                access_level = member.access_level,
                "unrecognized access level code in membership record"
            );
        }
        Grant::new(
            Self::entitlement_for(resource, level),
            ResourceId::new(ResourceKind::User, member.id.to_string()),
        )
    }
}

#[async_trait]
impl ResourceSyncer for GroupSyncer {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Group
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        cursor: &str,
    ) -> Result<(Vec<Resource>, String)> {
        let page = parse_cursor(cursor)?;
        let fetched = self.client.list_groups(page).await?;
        let next = fetched.next_cursor();
        let resources = fetched.items.into_iter().map(Self::resource_from).collect();
        Ok((resources, next))
    }

    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>> {
        Ok(GRANTABLE_LEVELS
            .iter()
            .map(|&level| Self::entitlement_for(resource, level))
            .collect())
    }

    async fn grants(&self, resource: &Resource, cursor: &str) -> Result<(Vec<Grant>, String)> {
        let (group_id, _) = decompose_group_id(&resource.id.raw)?;
        let page = parse_cursor(cursor)?;
        let fetched = self.client.list_group_members(group_id, page).await?;
        let next = fetched.next_cursor();
        let grants = fetched
            .items
            .iter()
            .map(|member| Self::grant_from(resource, member))
            .collect();
        Ok((grants, next))
    }
}

#[async_trait]
impl Provisioner for GroupSyncer {
    async fn grant(
        &self,
        entitlement: &Entitlement,
        principal: &ResourceId,
    ) -> Result<MutationOutcome> {
        let (group_id, _) = decompose_group_id(&entitlement.resource.raw)?;
        let user_id = principal_user_id(principal)?;
        match self
            .client
            .add_group_member(group_id, user_id, entitlement.level)
            .await
        {
            Ok(()) => Ok(MutationOutcome::Applied),
            Err(err) => classify_grant_error(err),
        }
    }

    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome> {
        let (group_id, _) = decompose_group_id(&grant.entitlement.resource.raw)?;
        let user_id = principal_user_id(&grant.principal)?;
        match self.client.remove_group_member(group_id, user_id).await {
            Ok(()) => Ok(MutationOutcome::Applied),
            Err(err) => classify_revoke_error(err),
        }
    }
}
