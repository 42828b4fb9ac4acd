//! Project listing scoped to a parent group, plus project mutations.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{
    MutationOutcome, Provisioner, ResourceSyncer, classify_grant_error, classify_revoke_error,
    principal_user_id,
};
use crate::access::{AccessLevel, GRANTABLE_LEVELS};
use crate::error::{ConnectorError, Result};
use crate::gitlab::{GitlabClient, Member, Project};
use crate::pagination::parse_cursor;
use crate::resource::{
    Entitlement, Grant, Profile, Resource, ResourceId, ResourceKind, decompose_group_id,
};

/// Syncer for GitLab projects.
///
/// Projects are listed under a group parent; a missing parent yields an
/// empty, complete listing rather than an error. Project ids are the
/// plain numeric API id.
pub struct ProjectSyncer {
    client: Arc<GitlabClient>,
}

impl ProjectSyncer {
    pub fn new(client: Arc<GitlabClient>) -> Self {
        Self { client }
    }

    fn resource_from(project: Project, parent: &ResourceId) -> Resource {
        let mut profile = Profile::new();
        profile.insert("id".to_string(), Value::from(project.id));
        profile.insert("name".to_string(), Value::from(project.name.clone()));
        if let Some(description) = project.description {
            profile.insert("description".to_string(), Value::from(description));
        }

        Resource {
            id: ResourceId::new(ResourceKind::Project, project.id.to_string()),
            display_name: project.name,
            profile,
            parent: Some(parent.clone()),
        }
    }

    fn entitlement_for(resource: &Resource, level: AccessLevel) -> Entitlement {
        Entitlement::new(resource.id.clone(), level).with_display(
            format!("{} Project {level}", resource.display_name),
            format!("{level} on the {} project in Gitlab", resource.display_name),
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
impl ResourceSyncer for ProjectSyncer {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Project
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        cursor: &str,
    ) -> Result<(Vec<Resource>, String)> {
        let Some(parent) = parent else {
            return Ok((Vec::new(), String::new()));
        };
        if parent.kind != ResourceKind::Group {
            return Err(ConnectorError::malformed_resource_id(parent.to_string()));
        }

        let (group_id, _) = decompose_group_id(&parent.raw)?;
        let page = parse_cursor(cursor)?;
        let fetched = self.client.list_group_projects(group_id, page).await?;
        let next = fetched.next_cursor();
        let resources = fetched
            .items
            .into_iter()
            .map(|project| Self::resource_from(project, parent))
            .collect();
        Ok((resources, next))
    }

    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>> {
        Ok(GRANTABLE_LEVELS
            .iter()
            .map(|&level| Self::entitlement_for(resource, level))
            .collect())
    }

    async fn grants(&self, resource: &Resource, cursor: &str) -> Result<(Vec<Grant>, String)> {
        let page = parse_cursor(cursor)?;
        let fetched = self
            .client
            .list_project_members(&resource.id.raw, page)
            .await?;
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
impl Provisioner for ProjectSyncer {
    async fn grant(
        &self,
        entitlement: &Entitlement,
        principal: &ResourceId,
    ) -> Result<MutationOutcome> {
        let user_id = principal_user_id(principal)?;
        match self
            .client
            .add_project_member(&entitlement.resource.raw, user_id, entitlement.level)
            .await
        {
            Ok(()) => Ok(MutationOutcome::Applied),
            Err(err) => classify_grant_error(err),
        }
    }

    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome> {
        let user_id = principal_user_id(&grant.principal)?;
        match self
            .client
            .remove_project_member(&grant.entitlement.resource.raw, user_id)
            .await
        {
            Ok(()) => Ok(MutationOutcome::Applied),
            Err(err) => classify_revoke_error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::http::mock::MockTransport;

    const BASE: &str = "https://gitlab.example.com";

    fn syncer(transport: &MockTransport) -> ProjectSyncer {
        let client = GitlabClient::with_transport(BASE, "glpat-test", Arc::new(transport.clone()))
            .expect("client should build");
        ProjectSyncer::new(Arc::new(client))
    }

    fn group_parent() -> ResourceId {
        ResourceId::new(ResourceKind::Group, "348/Engineering")
    }

    fn project_resource() -> Resource {
        ProjectSyncer::resource_from(
            Project {
                id: 17,
                name: "billing-service".to_string(),
                description: None,
            },
            &group_parent(),
        )
    }

    #[tokio::test]
    async fn listing_without_a_parent_is_empty_and_complete() {
        let transport = MockTransport::new();
        let syncer = syncer(&transport);

        let (resources, cursor) = syncer.list(None, "").await.unwrap();
        assert!(resources.is_empty());
        assert_eq!(cursor, "");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn listing_walks_the_parent_groups_projects() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/groups/348/projects?per_page=2"),
            200,
            vec![("x-next-page".to_string(), "2".to_string())],
            r#"[
                {"id": 17, "name": "billing-service", "description": "invoices"},
                {"id": 18, "name": "ledger"}
            ]"#,
        );
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/groups/348/projects?per_page=2&page=2"),
            200,
            Vec::new(),
            r#"[{"id": 19, "name": "gateway"}]"#,
        );

        let syncer = syncer(&transport);
        let parent = group_parent();

        let (resources, cursor) = syncer.list(Some(&parent), "").await.unwrap();
        assert_eq!(cursor, "2");
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].id.raw, "17");
        assert_eq!(resources[0].display_name, "billing-service");
        assert_eq!(resources[0].profile["description"], Value::from("invoices"));
        assert_eq!(resources[0].parent.as_ref(), Some(&parent));

        let (resources, cursor) = syncer.list(Some(&parent), &cursor).await.unwrap();
        assert_eq!(cursor, "");
        assert_eq!(resources[0].id.raw, "19");
    }

    #[tokio::test]
    async fn listing_rejects_a_non_group_parent() {
        let transport = MockTransport::new();
        let syncer = syncer(&transport);
        let parent = ResourceId::new(ResourceKind::Project, "17");

        let err = syncer.list(Some(&parent), "").await.unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedResourceId { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn entitlements_use_project_wording() {
        let transport = MockTransport::new();
        let syncer = syncer(&transport);
        let resource = project_resource();

        let entitlements = syncer.entitlements(&resource).await.unwrap();
        assert_eq!(entitlements.len(), 6);

        let maintainer = &entitlements[4];
        assert_eq!(maintainer.id, "project:17:Maintainer");
        assert_eq!(maintainer.display_name, "billing-service Project Maintainer");
        assert_eq!(
            maintainer.description,
            "Maintainer on the billing-service project in Gitlab"
        );
    }

    #[tokio::test]
    async fn grants_come_from_project_members() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/projects/17/members"),
            200,
            Vec::new(),
            r#"[{"id": 99, "username": "jdoe", "name": "Jane Doe", "state": "active", "access_level": 20}]"#,
        );

        let syncer = syncer(&transport);
        let resource = project_resource();

        let (grants, cursor) = syncer.grants(&resource, "").await.unwrap();
        assert_eq!(cursor, "");
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].entitlement.level, AccessLevel::Reporter);
        assert_eq!(grants[0].id, "project:17:Reporter:99");
    }

    #[tokio::test]
    async fn project_mutations_classify_idempotent_replays() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/api/v4/projects/17/members"),
            409,
            Vec::new(),
            r#"{"message": "Member already exists"}"#,
        );
        transport.push_json(
            HttpMethod::Delete,
            format!("{BASE}/api/v4/projects/17/members/99"),
            404,
            Vec::new(),
            "404 Member Not Found",
        );

        let syncer = syncer(&transport);
        let resource = project_resource();
        let entitlement = ProjectSyncer::entitlement_for(&resource, AccessLevel::Developer);
        let principal = ResourceId::new(ResourceKind::User, "99");

        let outcome = syncer.grant(&entitlement, &principal).await.unwrap();
        assert_eq!(outcome, MutationOutcome::AlreadyExists);

        let grant = Grant::new(entitlement, principal);
        let outcome = syncer.revoke(&grant).await.unwrap();
        assert_eq!(outcome, MutationOutcome::AlreadyRevoked);
    }
}
