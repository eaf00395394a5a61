//! Client implementation for the static catalog plugin.
//!
//! Implements `CatalogClient` using the domain service.

use async_trait::async_trait;
use identity_resolver_sdk::{
    CanonicalIdentityRef, CatalogClient, CatalogEntity, CatalogError, CatalogQuery,
    SessionIdentity,
};

use super::service::Service;

#[async_trait]
impl CatalogClient for Service {
    async fn find_entity(
        &self,
        query: &CatalogQuery,
    ) -> Result<Option<CatalogEntity>, CatalogError> {
        self.find(query)
    }

    async fn issue_session(
        &self,
        identity: &CanonicalIdentityRef,
    ) -> Result<SessionIdentity, CatalogError> {
        Ok(Self::session(identity))
    }
}
