//! Connector-level error taxonomy.

use thiserror::Error;

use crate::gitlab::GitlabError;

/// Errors surfaced to the platform driver.
///
/// Remote failures propagate unchanged; nothing here is swallowed or
/// retried. Idempotent grant/revoke conflicts are not errors, they are
/// reported through [`crate::connector::MutationOutcome`].
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A continuation cursor that is not a page number ≥ 1.
    #[error("invalid pagination cursor: {cursor:?}")]
    InvalidCursor { cursor: String },

    /// Transport error or non-2xx status from the GitLab API.
    #[error("gitlab request failed: {0}")]
    Remote(#[from] GitlabError),

    /// A composite resource id that does not split into exactly two
    /// non-empty segments.
    #[error("malformed resource id: {id:?}")]
    MalformedResourceId { id: String },

    /// An entitlement id that does not split into exactly three
    /// non-empty segments.
    #[error("malformed entitlement id: {id:?}")]
    MalformedEntitlementId { id: String },

    /// A principal reference that cannot be parsed to the numeric user
    /// id GitLab requires.
    #[error("unknown principal reference: {principal:?}")]
    UnknownPrincipal { principal: String },
}

impl ConnectorError {
    pub fn invalid_cursor(cursor: impl Into<String>) -> Self {
        Self::InvalidCursor {
            cursor: cursor.into(),
        }
    }

    pub fn malformed_resource_id(id: impl Into<String>) -> Self {
        Self::MalformedResourceId { id: id.into() }
    }

    pub fn malformed_entitlement_id(id: impl Into<String>) -> Self {
        Self::MalformedEntitlementId { id: id.into() }
    }

    pub fn unknown_principal(principal: impl Into<String>) -> Self {
        Self::UnknownPrincipal {
            principal: principal.into(),
        }
    }
}

/// Result type for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;
