//! Local (in-process) client for the identity resolver.

use std::sync::Arc;

use async_trait::async_trait;
use identity_resolver_sdk::{
    AuthenticationResult, IdentityResolverClient, IdentityResolverError, ProviderId,
    SessionIdentity,
};

use super::{DomainError, Service};

/// Local client wrapping the service.
///
/// Handed to the transport layer by the module during `init()`.
pub struct IdentityResolverLocalClient {
    svc: Arc<Service>,
}

impl IdentityResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, provider_id: &ProviderId, e: DomainError) -> IdentityResolverError {
    tracing::error!(
        operation = op,
        provider_id = %provider_id,
        error = %e,
        "identity_resolver call failed"
    );
    e.into()
}

#[async_trait]
impl IdentityResolverClient for IdentityResolverLocalClient {
    async fn resolve_identity(
        &self,
        provider_id: &ProviderId,
        result: &AuthenticationResult,
    ) -> Result<SessionIdentity, IdentityResolverError> {
        self.svc
            .resolve_identity(provider_id, result)
            .await
            .map_err(|e| log_and_convert("resolve_identity", provider_id, e))
    }
}
