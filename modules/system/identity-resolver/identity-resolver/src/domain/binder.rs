//! Identity binding: the last step before a session is issued.

use identity_resolver_sdk::{CanonicalIdentityRef, CatalogError, ProviderId, SessionIdentity};

use super::catalog::CatalogLookup;
use super::error::DomainError;
use super::resolver::ResolverOutcome;

/// Accept a `Bound` outcome and reject everything else.
///
/// # Errors
///
/// Propagates `Fatal`. A `NotFound` reaching this point becomes `Unbound`.
pub fn bind(
    provider_id: &ProviderId,
    outcome: ResolverOutcome,
) -> Result<CanonicalIdentityRef, DomainError> {
    match outcome {
        ResolverOutcome::Bound(identity) => Ok(identity),
        ResolverOutcome::NotFound => Err(DomainError::Unbound {
            provider_id: provider_id.to_string(),
        }),
        ResolverOutcome::Fatal(e) => Err(e),
    }
}

/// Ask the catalog to issue the session for `identity`.
///
/// # Errors
///
/// Returns `SessionIssuance` if the catalog fails, or returns a session for a
/// different entity, or marks a fallback identity as verified.
pub async fn issue_session(
    catalog: &CatalogLookup,
    identity: &CanonicalIdentityRef,
) -> Result<SessionIdentity, DomainError> {
    let entity_ref = identity.entity_ref();
    let session_error = |source: CatalogError| DomainError::SessionIssuance {
        entity_ref: entity_ref.to_string(),
        source,
    };

    let session = catalog
        .issue_session(identity)
        .await
        .map_err(session_error)?;

    if session.user_entity_ref() != entity_ref {
        return Err(session_error(CatalogError::Malformed(format!(
            "session issued for `{}`",
            session.user_entity_ref()
        ))));
    }
    if session.is_verified() && !identity.is_verified() {
        return Err(session_error(CatalogError::Malformed(
            "unverified identity issued a verified session".to_owned(),
        )));
    }
    Ok(session)
}
