//! Domain service for the identity resolver.

use std::sync::Arc;

use identity_resolver_sdk::{
    AuthenticationResult, ProviderId, SessionIdentity, SignedTokenDecoder,
};
use tracing::info;

use super::binder;
use super::catalog::CatalogLookup;
use super::error::DomainError;
use super::registry::ProviderRegistry;
use super::resolver::ResolveContext;

/// Identity resolver service.
///
/// Holds only read-only state; concurrent sign-ins share nothing mutable.
pub struct Service {
    registry: ProviderRegistry,
    catalog: CatalogLookup,
    decoder: Arc<dyn SignedTokenDecoder>,
}

impl Service {
    #[must_use]
    pub fn new(
        registry: ProviderRegistry,
        catalog: CatalogLookup,
        decoder: Arc<dyn SignedTokenDecoder>,
    ) -> Self {
        Self {
            registry,
            catalog,
            decoder,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolve the session identity for an authenticated upstream principal.
    ///
    /// # Errors
    ///
    /// - `ProviderNotRegistered` for an unknown provider id
    /// - `IdentityResolutionDisabled` when the provider has no resolver chain
    /// - `UnexpectedResultShape` when `result` does not come from this provider's authenticator
    /// - Claim, cross-validation, lookup and chain-exhausted failures from the chain
    /// - `SessionIssuance` if the catalog cannot issue the session
    #[tracing::instrument(skip_all, fields(provider_id = %provider_id))]
    pub async fn resolve_identity(
        &self,
        provider_id: &ProviderId,
        result: &AuthenticationResult,
    ) -> Result<SessionIdentity, DomainError> {
        let registration = self.registry.lookup(provider_id)?;

        let Some(chain) = registration.chain.as_ref() else {
            return Err(DomainError::IdentityResolutionDisabled {
                provider_id: provider_id.to_string(),
            });
        };

        let expected = registration.authenticator.flavor();
        if result.flavor() != expected {
            return Err(DomainError::UnexpectedResultShape {
                provider_id: provider_id.to_string(),
                expected,
                actual: result.flavor(),
            });
        }

        let ctx = ResolveContext {
            catalog: &self.catalog,
            decoder: self.decoder.as_ref(),
        };
        let outcome = chain.resolve(provider_id, result, &ctx).await;
        let identity = binder::bind(provider_id, outcome)?;
        let session = binder::issue_session(&self.catalog, &identity).await?;

        info!(
            user = %session.user_entity_ref(),
            verified = session.is_verified(),
            "Resolved sign-in identity"
        );
        Ok(session)
    }
}
