//! GitLab REST API client.
//!
//! A thin, typed layer over the transport seam. One generic paged GET
//! walks every collection (groups, group projects, group and project
//! members); mutations add and remove memberships.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitLab API operations
//! - [`types`] - Wire structs for API responses and request bodies
//! - [`client`] - The client itself

mod client;
mod error;
mod types;

pub use client::GitlabClient;
pub use error::GitlabError;
pub use types::{Group, Member, NewMember, Project, UserDetail};
