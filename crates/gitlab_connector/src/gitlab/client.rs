//! GitLab API client creation and request plumbing.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use super::error::GitlabError;
use super::types::{Group, Member, NewMember, Project, UserDetail};
use crate::access::AccessLevel;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpMethod, HttpRequest, HttpTransport};
use crate::pagination::Page;

/// Page size requested for group and project listings.
pub const LIST_PAGE_SIZE: u32 = 2;

/// Whole-request timeout for the default transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitLab REST client over the transport seam.
///
/// Holds no mutable state; cloning shares the transport. Every listing
/// goes through one generic paged GET that reads the `x-next-page`
/// continuation header.
#[derive(Clone)]
pub struct GitlabClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GitlabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitlabClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GitlabClient {
    /// Create a client with the default reqwest transport.
    ///
    /// `base_url` must be an absolute http(s) URL and `token` a
    /// non-empty personal access token; both are validated here so no
    /// call is ever attempted with unusable configuration.
    pub fn new(base_url: &str, token: &str) -> Result<Self, GitlabError> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)
            .map_err(|e| GitlabError::Config(e.to_string()))?;
        Self::with_transport(base_url, token, Arc::new(transport))
    }

    /// Create a client over an explicit transport (tests, custom TLS).
    pub fn with_transport(
        base_url: &str,
        token: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, GitlabError> {
        if token.is_empty() {
            return Err(GitlabError::Config("access token is empty".to_string()));
        }

        let parsed = Url::parse(base_url)
            .map_err(|e| GitlabError::Config(format!("invalid base url {base_url:?}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(GitlabError::Config(format!(
                "base url must be http(s), got {:?}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// The normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/api/v4{}", self.base_url, path);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    fn headers(&self, has_body: bool) -> HttpHeaders {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("PRIVATE-TOKEN".to_string(), self.token.clone()),
        ];
        if has_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers
    }

    /// Fetch one page of a collection.
    ///
    /// `page == None` requests the first page with the server's default
    /// offset; `per_page == None` leaves the page size to the server.
    /// The returned continuation comes from the `x-next-page` header
    /// (absent, empty, or `0` means no further pages).
    async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        per_page: Option<u32>,
        page: Option<u32>,
    ) -> Result<Page<T>, GitlabError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(per_page) = per_page {
            query.push(("per_page", per_page.to_string()));
        }
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }

        let url = self.api_url(path, &query);
        tracing::debug!(%url, page = ?page, "fetching collection page");

        let response = self
            .transport
            .send(HttpRequest {
                method: HttpMethod::Get,
                url,
                headers: self.headers(false),
                body: Vec::new(),
            })
            .await?;

        if !response.is_success() {
            return Err(GitlabError::from_status(response.status, &response.body));
        }

        let next_page = response
            .header("x-next-page")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| n >= 1);

        let items: Vec<T> = serde_json::from_slice(&response.body)?;
        Ok(Page { items, next_page })
    }

    /// Fetch a single JSON object.
    async fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitlabError> {
        let url = self.api_url(path, &[]);
        let response = self
            .transport
            .send(HttpRequest {
                method: HttpMethod::Get,
                url,
                headers: self.headers(false),
                body: Vec::new(),
            })
            .await?;

        if !response.is_success() {
            return Err(GitlabError::from_status(response.status, &response.body));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Issue a mutation and discard the response body.
    async fn mutate(
        &self,
        method: HttpMethod,
        path: &str,
        body: Vec<u8>,
    ) -> Result<(), GitlabError> {
        let url = self.api_url(path, &[]);
        tracing::debug!(%url, method = method.as_str(), "issuing membership mutation");

        let has_body = !body.is_empty();
        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers: self.headers(has_body),
                body,
            })
            .await?;

        if !response.is_success() {
            return Err(GitlabError::from_status(response.status, &response.body));
        }
        Ok(())
    }

    /// List top-level and accessible groups.
    pub async fn list_groups(&self, page: Option<u32>) -> Result<Page<Group>, GitlabError> {
        self.get_paged("/groups", Some(LIST_PAGE_SIZE), page).await
    }

    /// List the projects of a group.
    pub async fn list_group_projects(
        &self,
        group_id: &str,
        page: Option<u32>,
    ) -> Result<Page<Project>, GitlabError> {
        self.get_paged(
            &format!("/groups/{group_id}/projects"),
            Some(LIST_PAGE_SIZE),
            page,
        )
        .await
    }

    /// List the direct members of a group.
    pub async fn list_group_members(
        &self,
        group_id: &str,
        page: Option<u32>,
    ) -> Result<Page<Member>, GitlabError> {
        self.get_paged(&format!("/groups/{group_id}/members"), None, page)
            .await
    }

    /// List the direct members of a project.
    pub async fn list_project_members(
        &self,
        project_id: &str,
        page: Option<u32>,
    ) -> Result<Page<Member>, GitlabError> {
        self.get_paged(&format!("/projects/{project_id}/members"), None, page)
            .await
    }

    /// Fetch a user's detail record (email enrichment).
    pub async fn get_user(&self, user_id: u64) -> Result<UserDetail, GitlabError> {
        self.get_one(&format!("/users/{user_id}")).await
    }

    /// Add a member to a group. 409 surfaces as
    /// [`GitlabError::Conflict`].
    pub async fn add_group_member(
        &self,
        group_id: &str,
        user_id: u64,
        level: AccessLevel,
    ) -> Result<(), GitlabError> {
        let body = serde_json::to_vec(&NewMember {
            user_id,
            access_level: level.code(),
        })?;
        self.mutate(
            HttpMethod::Post,
            &format!("/groups/{group_id}/members"),
            body,
        )
        .await
    }

    /// Remove a member from a group. 404 surfaces as
    /// [`GitlabError::NotFound`].
    pub async fn remove_group_member(
        &self,
        group_id: &str,
        user_id: u64,
    ) -> Result<(), GitlabError> {
        self.mutate(
            HttpMethod::Delete,
            &format!("/groups/{group_id}/members/{user_id}"),
            Vec::new(),
        )
        .await
    }

    /// Add a member to a project. 409 surfaces as
    /// [`GitlabError::Conflict`].
    pub async fn add_project_member(
        &self,
        project_id: &str,
        user_id: u64,
        level: AccessLevel,
    ) -> Result<(), GitlabError> {
        let body = serde_json::to_vec(&NewMember {
            user_id,
            access_level: level.code(),
        })?;
        self.mutate(
            HttpMethod::Post,
            &format!("/projects/{project_id}/members"),
            body,
        )
        .await
    }

    /// Remove a member from a project. 404 surfaces as
    /// [`GitlabError::NotFound`].
    pub async fn remove_project_member(
        &self,
        project_id: &str,
        user_id: u64,
    ) -> Result<(), GitlabError> {
        self.mutate(
            HttpMethod::Delete,
            &format!("/projects/{project_id}/members/{user_id}"),
            Vec::new(),
        )
        .await
    }
}
