//! Member listing with best-effort email enrichment.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::ResourceSyncer;
use crate::error::Result;
use crate::gitlab::{GitlabClient, Member};
use crate::pagination::parse_cursor;
use crate::resource::{
    Entitlement, Grant, Profile, Resource, ResourceId, ResourceKind, decompose_group_id,
};

/// Syncer for GitLab users.
///
/// Users are surfaced as the members of a group or project parent, one
/// page of members per call. Membership endpoints rarely include the
/// email, so each member gets a best-effort `GET /users/:id` lookup;
/// a failed lookup leaves the email off the profile and never fails
/// the page.
pub struct UserSyncer {
    client: Arc<GitlabClient>,
}

impl UserSyncer {
    pub fn new(client: Arc<GitlabClient>) -> Self {
        Self { client }
    }

    async fn lookup_email(&self, member: &Member) -> Option<String> {
        match self.client.get_user(member.id).await {
            Ok(detail) => detail.best_email().map(str::to_string),
            Err(err) => {
                tracing::debug!(user_id = member.id, error = %err, "email lookup failed");
                None
            }
        }
    }

    async fn resource_from(&self, member: Member, parent: &ResourceId) -> Resource {
        let email = self
            .lookup_email(&member)
            .await
            .or_else(|| member.email.clone());

        let mut profile = Profile::new();
        profile.insert("id".to_string(), Value::from(member.id));
        profile.insert("first_name".to_string(), Value::from(member.name.clone()));
        profile.insert("username".to_string(), Value::from(member.username));
        profile.insert("state".to_string(), Value::from(member.state));
        profile.insert(
            "access_level".to_string(),
            Value::from(member.access_level),
        );
        if let Some(email) = email {
            profile.insert("email".to_string(), Value::from(email));
        }

        Resource {
            id: ResourceId::new(ResourceKind::User, member.id.to_string()),
            display_name: member.name,
            profile,
            parent: Some(parent.clone()),
        }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        cursor: &str,
    ) -> Result<(Vec<Resource>, String)> {
        let Some(parent) = parent else {
            return Ok((Vec::new(), String::new()));
        };

        let page = parse_cursor(cursor)?;
        let fetched = match parent.kind {
            ResourceKind::Group => {
                let (group_id, _) = decompose_group_id(&parent.raw)?;
                self.client.list_group_members(group_id, page).await?
            }
            ResourceKind::Project => self.client.list_project_members(&parent.raw, page).await?,
            ResourceKind::User => return Ok((Vec::new(), String::new())),
        };

        let next = fetched.next_cursor();
        let mut resources = Vec::with_capacity(fetched.items.len());
        for member in fetched.items {
            resources.push(self.resource_from(member, parent).await);
        }
        Ok((resources, next))
    }

    /// Users carry no entitlements; capabilities hang off groups and
    /// projects.
    async fn entitlements(&self, _resource: &Resource) -> Result<Vec<Entitlement>> {
        Ok(Vec::new())
    }

    async fn grants(&self, _resource: &Resource, _cursor: &str) -> Result<(Vec<Grant>, String)> {
        Ok((Vec::new(), String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use crate::http::HttpMethod;
    use crate::http::mock::MockTransport;

    const BASE: &str = "https://gitlab.example.com";

    fn syncer(transport: &MockTransport) -> UserSyncer {
        let client = GitlabClient::with_transport(BASE, "glpat-test", Arc::new(transport.clone()))
            .expect("client should build");
        UserSyncer::new(Arc::new(client))
    }

    const MEMBER_JDOE: &str = r#"{"id": 99, "username": "jdoe", "name": "Jane Doe", "state": "active", "access_level": 30}"#;

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
    async fn group_members_are_listed_with_enriched_emails() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/groups/348/members"),
            200,
            vec![("x-next-page".to_string(), "2".to_string())],
            &format!("[{MEMBER_JDOE}]"),
        );
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/users/99"),
            200,
            Vec::new(),
            r#"{"id": 99, "email": "private@example.com", "public_email": "jane@example.com"}"#,
        );

        let syncer = syncer(&transport);
        let parent = ResourceId::new(ResourceKind::Group, "348/Engineering");

        let (resources, cursor) = syncer.list(Some(&parent), "").await.unwrap();
        assert_eq!(cursor, "2");
        assert_eq!(resources.len(), 1);

        let user = &resources[0];
        assert_eq!(user.id.raw, "99");
        assert_eq!(user.display_name, "Jane Doe");
        assert_eq!(user.parent.as_ref(), Some(&parent));
        assert_eq!(user.profile["username"], Value::from("jdoe"));
        assert_eq!(user.profile["state"], Value::from("active"));
        assert_eq!(user.profile["access_level"], Value::from(30));
        assert_eq!(user.profile["email"], Value::from("jane@example.com"));
    }

    #[tokio::test]
    async fn enrichment_failure_leaves_the_email_off() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/projects/17/members"),
            200,
            Vec::new(),
            &format!("[{MEMBER_JDOE}]"),
        );
        // No /users/99 route registered: the lookup errors and is ignored.

        let syncer = syncer(&transport);
        let parent = ResourceId::new(ResourceKind::Project, "17");

        let (resources, cursor) = syncer.list(Some(&parent), "").await.unwrap();
        assert_eq!(cursor, "");
        assert_eq!(resources.len(), 1);
        assert!(!resources[0].profile.contains_key("email"));
    }

    #[tokio::test]
    async fn membership_email_is_the_fallback_when_lookup_finds_none() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/projects/17/members"),
            200,
            Vec::new(),
            r#"[{"id": 99, "username": "jdoe", "name": "Jane Doe", "state": "active", "access_level": 30, "email": "member@example.com"}]"#,
        );
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/users/99"),
            200,
            Vec::new(),
            r#"{"id": 99, "email": null, "public_email": ""}"#,
        );

        let syncer = syncer(&transport);
        let parent = ResourceId::new(ResourceKind::Project, "17");

        let (resources, _) = syncer.list(Some(&parent), "").await.unwrap();
        assert_eq!(
            resources[0].profile["email"],
            Value::from("member@example.com")
        );
    }

    #[tokio::test]
    async fn group_parent_with_a_malformed_composite_id_fails() {
        let transport = MockTransport::new();
        let syncer = syncer(&transport);
        let parent = ResourceId::new(ResourceKind::Group, "348");

        let err = syncer.list(Some(&parent), "").await.unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedResourceId { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn users_have_no_entitlements_or_grants() {
        let transport = MockTransport::new();
        let syncer = syncer(&transport);
        let resource = Resource {
            id: ResourceId::new(ResourceKind::User, "99"),
            display_name: "Jane Doe".to_string(),
            profile: Profile::new(),
            parent: None,
        };

        assert!(syncer.entitlements(&resource).await.unwrap().is_empty());
        let (grants, cursor) = syncer.grants(&resource, "").await.unwrap();
        assert!(grants.is_empty());
        assert_eq!(cursor, "");
        assert!(transport.requests().is_empty());
    }
}
