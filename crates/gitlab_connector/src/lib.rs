//! GitLab identity-governance connector.
//!
//! This library exposes GitLab groups, projects, and memberships to an
//! access-review platform through a small, uniform contract: list
//! resources, enumerate entitlements, list grants, and apply or revoke
//! memberships.
//!
//! # Module Structure
//!
//! - [`http`] - Transport boundary for all network I/O
//! - [`pagination`] - Page cursors and the per-page result type
//! - [`access`] - The fixed GitLab access-level enumeration
//! - [`resource`] - Canonical resource/entitlement/grant records
//! - [`gitlab`] - The GitLab REST client
//! - [`connector`] - Per-resource-kind syncers and mutations
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gitlab_connector::connector::{Connector, ResourceSyncer};
//! use gitlab_connector::gitlab::GitlabClient;
//!
//! let client = Arc::new(GitlabClient::new("https://gitlab.com/", &token)?);
//! let connector = Connector::new(client);
//!
//! let (groups, next) = connector.groups().list(None, "").await?;
//! ```

pub mod access;
pub mod connector;
pub mod error;
pub mod gitlab;
pub mod http;
pub mod pagination;
pub mod resource;

pub use access::AccessLevel;
pub use connector::{Connector, MutationOutcome, Provisioner, ResourceSyncer};
pub use error::{ConnectorError, Result};
pub use gitlab::{GitlabClient, GitlabError};
pub use pagination::Page;
pub use resource::{Entitlement, Grant, Resource, ResourceId, ResourceKind};
