//! Public API trait for the identity resolver.
//!
//! The transport layer calls this once the upstream handshake has completed
//! and turns any error into an authentication rejection.

use async_trait::async_trait;

use crate::error::IdentityResolverError;
use crate::models::{AuthenticationResult, ProviderId, SessionIdentity};

/// Public API trait for the identity resolver.
///
/// ```ignore
/// let session = resolver.resolve_identity(&provider_id, &result).await?;
/// issue_cookie(session.token());
/// ```
#[async_trait]
pub trait IdentityResolverClient: Send + Sync {
    /// Resolve an authenticated upstream principal to a canonical session identity.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the provider is not registered
    /// - `ResolutionDisabled` if identity resolution is off for the provider
    /// - `Claim` / `CrossValidation` if the upstream result fails validation
    /// - `Lookup` if the catalog collaborator fails
    /// - `ChainExhausted` if no resolver found a matching catalog entity
    async fn resolve_identity(
        &self,
        provider_id: &ProviderId,
        result: &AuthenticationResult,
    ) -> Result<SessionIdentity, IdentityResolverError>;
}
