//! Time-bounded access to the catalog collaborator.

use std::sync::Arc;
use std::time::Duration;

use identity_resolver_sdk::{
    CanonicalIdentityRef, CatalogClient, CatalogEntity, CatalogError, CatalogQuery,
    SessionIdentity,
};

/// Wraps a [`CatalogClient`] so every call is bounded by `timeout`.
///
/// An elapsed timeout is a lookup failure, never an empty result.
#[derive(Clone)]
pub struct CatalogLookup {
    client: Arc<dyn CatalogClient>,
    timeout: Duration,
}

impl CatalogLookup {
    #[must_use]
    pub fn new(client: Arc<dyn CatalogClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// # Errors
    ///
    /// Returns the client's error, or `CatalogError::Timeout`.
    pub async fn find(&self, query: &CatalogQuery) -> Result<Option<CatalogEntity>, CatalogError> {
        tokio::time::timeout(self.timeout, self.client.find_entity(query))
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))?
    }

    /// # Errors
    ///
    /// Returns the client's error, or `CatalogError::Timeout`.
    pub async fn issue_session(
        &self,
        identity: &CanonicalIdentityRef,
    ) -> Result<SessionIdentity, CatalogError> {
        tokio::time::timeout(self.timeout, self.client.issue_session(identity))
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))?
    }
}
