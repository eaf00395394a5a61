//! Cross-validation of a profile claim against the same claim in the ID token.
//!
//! Guards against the userinfo response being swapped or forged independently
//! of the token set. It does not protect against a compromised provider, and
//! it does not re-verify token signatures (see [`super::token`]).

use identity_resolver_sdk::SignedTokenDecoder;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use super::error::DomainError;

/// Where the check happens, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct CrossCheck<'a> {
    /// Human-readable provider name, e.g. `Keycloak`.
    pub provider: &'a str,
    pub resolver: &'a str,
    /// Claim name in the profile; also the path looked up in the token.
    pub claim_path: &'a str,
}

/// Assert that the profile claim and the token claim are byte-identical.
///
/// Returns the validated claim value. The token side must hold a JSON string:
/// a numeric token claim is a mismatch even when the profile carries the same
/// number, since the profile value has already been rendered as text.
///
/// # Errors
///
/// - `MissingClaim` if the profile claim is absent
/// - `IdTokenMissing` if there is no signed token
/// - `IdTokenUndecodable` if the token cannot be decoded
/// - `ClaimMismatch` if the token value differs or is absent
pub fn cross_validate(
    check: &CrossCheck<'_>,
    profile_claim: Option<&str>,
    signed_token: Option<&SecretString>,
    decoder: &dyn SignedTokenDecoder,
) -> Result<String, DomainError> {
    let Some(profile_value) = profile_claim else {
        return Err(DomainError::MissingClaim {
            provider: check.provider.to_owned(),
            resolver: check.resolver.to_owned(),
            claim: check.claim_path.to_owned(),
        });
    };

    let Some(token) = signed_token else {
        return Err(DomainError::IdTokenMissing {
            provider: check.provider.to_owned(),
            resolver: check.resolver.to_owned(),
        });
    };

    let claims = decoder
        .decode_claims(token.expose_secret())
        .map_err(|e| DomainError::IdTokenUndecodable {
            provider: check.provider.to_owned(),
            resolver: check.resolver.to_owned(),
            reason: e.to_string(),
        })?;

    match claim_at(&claims, check.claim_path).and_then(Value::as_str) {
        Some(token_value) if token_value == profile_value => Ok(profile_value.to_owned()),
        _ => Err(DomainError::ClaimMismatch {
            provider: check.provider.to_owned(),
            resolver: check.resolver.to_owned(),
            claim: check.claim_path.to_owned(),
        }),
    }
}

/// Exact key first, then a dot-separated walk through nested objects.
fn claim_at<'a>(claims: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = claims.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = claims.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
