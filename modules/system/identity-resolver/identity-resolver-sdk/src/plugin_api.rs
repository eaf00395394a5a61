//! Collaborator traits implemented outside the resolver core.
//!
//! `CatalogClient` is backed by the identity store; `SignedTokenDecoder`
//! reads claims out of compact signed tokens.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{CatalogError, TokenDecodeError};
use crate::models::{CanonicalIdentityRef, CatalogEntity, CatalogQuery, SessionIdentity};

/// Catalog collaborator.
///
/// Implementations must be safe for concurrent use: the resolver may call
/// them from many in-flight sign-ins at once.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Look up the single entity matching `query`.
    ///
    /// Returns `Ok(None)` when the lookup succeeded with zero results.
    ///
    /// # Errors
    ///
    /// Any failure to perform the lookup. Implementations must not report a
    /// failed call as `Ok(None)`.
    async fn find_entity(
        &self,
        query: &CatalogQuery,
    ) -> Result<Option<CatalogEntity>, CatalogError>;

    /// Create the session identity for a bound identity reference.
    ///
    /// # Errors
    ///
    /// Any failure to issue the session.
    async fn issue_session(
        &self,
        identity: &CanonicalIdentityRef,
    ) -> Result<SessionIdentity, CatalogError>;
}

/// Decodes (not necessarily verifies) the claims of a compact signed token.
pub trait SignedTokenDecoder: Send + Sync {
    /// # Errors
    ///
    /// Returns `TokenDecodeError` if the token is not well-formed.
    fn decode_claims(&self, raw: &str) -> Result<Map<String, Value>, TokenDecodeError>;
}
