//! Per-resource-kind syncers and membership mutations.
//!
//! The host driver talks to two traits: [`ResourceSyncer`] for the
//! listing operations and [`Provisioner`] for grant/revoke. A
//! [`Connector`] wires one GitLab client into the three syncers and
//! dispatches mutations by the kind encoded in the entitlement id.
//!
//! # Module Structure
//!
//! - [`groups`] - Group listing, entitlements, grants, and mutations
//! - [`projects`] - Project listing scoped to a parent group
//! - [`users`] - Member listing with email enrichment

mod groups;
mod projects;
mod users;

pub use groups::GroupSyncer;
pub use projects::ProjectSyncer;
pub use users::UserSyncer;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ConnectorError, Result};
use crate::gitlab::{GitlabClient, GitlabError};
use crate::resource::{
    Entitlement, Grant, Resource, ResourceId, ResourceKind, parse_entitlement_id,
};

/// Result of a grant or revoke mutation.
///
/// Idempotent replays are successes, not errors: granting an existing
/// membership reports `AlreadyExists`, revoking a missing one reports
/// `AlreadyRevoked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    AlreadyExists,
    AlreadyRevoked,
}

/// The listing contract, one implementation per resource kind.
///
/// `list` and `grants` return the page of items plus the next cursor;
/// an empty cursor in the return position means the listing is
/// complete.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    fn resource_kind(&self) -> ResourceKind;

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        cursor: &str,
    ) -> Result<(Vec<Resource>, String)>;

    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>>;

    async fn grants(&self, resource: &Resource, cursor: &str) -> Result<(Vec<Grant>, String)>;
}

/// The mutation contract for kinds whose memberships can be edited.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn grant(
        &self,
        entitlement: &Entitlement,
        principal: &ResourceId,
    ) -> Result<MutationOutcome>;

    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome>;
}

/// Extract the numeric GitLab user id from a principal reference.
pub(crate) fn principal_user_id(principal: &ResourceId) -> Result<u64> {
    if principal.kind != ResourceKind::User {
        return Err(ConnectorError::unknown_principal(principal.to_string()));
    }
    principal
        .raw
        .parse()
        .map_err(|_| ConnectorError::unknown_principal(principal.to_string()))
}

/// Classify a failed add-member call: a conflict means the membership
/// already exists and the mutation is a no-op success.
pub(crate) fn classify_grant_error(err: GitlabError) -> Result<MutationOutcome> {
    match err {
        GitlabError::Conflict(message) => {
            tracing::warn!(%message, "membership already exists, treating grant as applied");
            Ok(MutationOutcome::AlreadyExists)
        }
        other => Err(other.into()),
    }
}

/// Classify a failed remove-member call: not-found means the membership
/// is already gone and the mutation is a no-op success.
pub(crate) fn classify_revoke_error(err: GitlabError) -> Result<MutationOutcome> {
    match err {
        GitlabError::NotFound(message) => {
            tracing::warn!(%message, "membership already gone, treating revoke as applied");
            Ok(MutationOutcome::AlreadyRevoked)
        }
        other => Err(other.into()),
    }
}

/// One GitLab client wired into the three per-kind syncers.
pub struct Connector {
    groups: GroupSyncer,
    projects: ProjectSyncer,
    users: UserSyncer,
}

impl Connector {
    pub fn new(client: Arc<GitlabClient>) -> Self {
        Self {
            groups: GroupSyncer::new(Arc::clone(&client)),
            projects: ProjectSyncer::new(Arc::clone(&client)),
            users: UserSyncer::new(client),
        }
    }

    #[must_use]
    pub fn groups(&self) -> &GroupSyncer {
        &self.groups
    }

    #[must_use]
    pub fn projects(&self) -> &ProjectSyncer {
        &self.projects
    }

    #[must_use]
    pub fn users(&self) -> &UserSyncer {
        &self.users
    }

    /// The syncer for `kind`, for callers that dispatch dynamically.
    #[must_use]
    pub fn syncer(&self, kind: ResourceKind) -> &dyn ResourceSyncer {
        match kind {
            ResourceKind::Group => &self.groups,
            ResourceKind::Project => &self.projects,
            ResourceKind::User => &self.users,
        }
    }

    /// Grant `user_id` the capability named by `entitlement_id`.
    pub async fn grant(&self, entitlement_id: &str, user_id: u64) -> Result<MutationOutcome> {
        let (entitlement, principal) = self.resolve(entitlement_id, user_id)?;
        match entitlement.resource.kind {
            ResourceKind::Group => self.groups.grant(&entitlement, &principal).await,
            ResourceKind::Project => self.projects.grant(&entitlement, &principal).await,
            ResourceKind::User => Err(ConnectorError::malformed_entitlement_id(entitlement_id)),
        }
    }

    /// Revoke `user_id`'s capability named by `entitlement_id`.
    pub async fn revoke(&self, entitlement_id: &str, user_id: u64) -> Result<MutationOutcome> {
        let (entitlement, principal) = self.resolve(entitlement_id, user_id)?;
        let kind = entitlement.resource.kind;
        let grant = Grant::new(entitlement, principal);
        match kind {
            ResourceKind::Group => self.groups.revoke(&grant).await,
            ResourceKind::Project => self.projects.revoke(&grant).await,
            ResourceKind::User => Err(ConnectorError::malformed_entitlement_id(entitlement_id)),
        }
    }

    fn resolve(&self, entitlement_id: &str, user_id: u64) -> Result<(Entitlement, ResourceId)> {
        let (resource, level) = parse_entitlement_id(entitlement_id)?;
        let entitlement = Entitlement::new(resource, level);
        let principal = ResourceId::new(ResourceKind::User, user_id.to_string());
        Ok((entitlement, principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::http::mock::MockTransport;

    const BASE: &str = "https://gitlab.example.com";

    fn connector(transport: &MockTransport) -> Connector {
        let client = GitlabClient::with_transport(BASE, "glpat-test", Arc::new(transport.clone()))
            .expect("client should build");
        Connector::new(Arc::new(client))
    }

    #[test]
    fn principal_user_id_requires_a_numeric_user_reference() {
        let principal = ResourceId::new(ResourceKind::User, "99");
        assert_eq!(principal_user_id(&principal).unwrap(), 99);

        let err = principal_user_id(&ResourceId::new(ResourceKind::User, "jdoe")).unwrap_err();
        assert!(matches!(err, ConnectorError::UnknownPrincipal { .. }));

        let err = principal_user_id(&ResourceId::new(ResourceKind::Group, "99")).unwrap_err();
        assert!(matches!(err, ConnectorError::UnknownPrincipal { .. }));
    }

    #[test]
    fn grant_error_classification() {
        let outcome = classify_grant_error(GitlabError::Conflict("exists".to_string())).unwrap();
        assert_eq!(outcome, MutationOutcome::AlreadyExists);

        let err = classify_grant_error(GitlabError::Api {
            status: 500,
            message: "boom".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ConnectorError::Remote(_)));

        // Not-found on a grant is a real failure, not idempotency.
        let err = classify_grant_error(GitlabError::NotFound("gone".to_string())).unwrap_err();
        assert!(matches!(err, ConnectorError::Remote(_)));
    }

    #[test]
    fn revoke_error_classification() {
        let outcome = classify_revoke_error(GitlabError::NotFound("gone".to_string())).unwrap();
        assert_eq!(outcome, MutationOutcome::AlreadyRevoked);

        let err = classify_revoke_error(GitlabError::Conflict("odd".to_string())).unwrap_err();
        assert!(matches!(err, ConnectorError::Remote(_)));
    }

    #[tokio::test]
    async fn grant_dispatches_by_entitlement_kind() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/api/v4/groups/348/members"),
            201,
            Vec::new(),
            "{}",
        );
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/api/v4/projects/17/members"),
            201,
            Vec::new(),
            "{}",
        );

        let connector = connector(&transport);
        let outcome = connector
            .grant("group:348/Engineering:Developer", 99)
            .await
            .unwrap();
        assert_eq!(outcome, MutationOutcome::Applied);

        let outcome = connector.grant("project:17:Maintainer", 99).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Applied);

        let bodies: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| String::from_utf8_lossy(&r.body).to_string())
            .collect();
        assert_eq!(bodies[0], r#"{"user_id":99,"access_level":30}"#);
        assert_eq!(bodies[1], r#"{"user_id":99,"access_level":40}"#);
    }

    #[tokio::test]
    async fn user_entitlements_cannot_be_granted_or_revoked() {
        let transport = MockTransport::new();
        let connector = connector(&transport);

        let err = connector.grant("user:99:Developer", 99).await.unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedEntitlementId { .. }));

        let err = connector.revoke("user:99:Developer", 99).await.unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedEntitlementId { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_entitlement_ids_fail_before_any_request() {
        let transport = MockTransport::new();
        let connector = connector(&transport);

        let err = connector.grant("group:348", 99).await.unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedEntitlementId { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn revoke_dispatches_and_classifies_not_found() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Delete,
            format!("{BASE}/api/v4/groups/348/members/99"),
            204,
            Vec::new(),
            "",
        );
        transport.push_json(
            HttpMethod::Delete,
            format!("{BASE}/api/v4/groups/348/members/99"),
            404,
            Vec::new(),
            "404 Member Not Found",
        );

        let connector = connector(&transport);
        let outcome = connector
            .revoke("group:348/Engineering:Developer", 99)
            .await
            .unwrap();
        assert_eq!(outcome, MutationOutcome::Applied);

        let outcome = connector
            .revoke("group:348/Engineering:Developer", 99)
            .await
            .unwrap();
        assert_eq!(outcome, MutationOutcome::AlreadyRevoked);
    }

    #[test]
    fn syncer_dispatch_matches_kinds() {
        let transport = MockTransport::new();
        let connector = connector(&transport);
        assert_eq!(
            connector.syncer(ResourceKind::Group).resource_kind(),
            ResourceKind::Group
        );
        assert_eq!(
            connector.syncer(ResourceKind::Project).resource_kind(),
            ResourceKind::Project
        );
        assert_eq!(
            connector.syncer(ResourceKind::User).resource_kind(),
            ResourceKind::User
        );
    }
}
