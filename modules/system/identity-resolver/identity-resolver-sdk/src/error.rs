//! Error types for the identity resolver module.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to the transport layer by [`crate::IdentityResolverClient`].
///
/// Every variant aborts the sign-in attempt. The message keeps enough detail
/// (provider, resolver, claim) for operators; presenting a generic rejection to
/// the end user is the caller's job.
#[derive(Debug, Error)]
pub enum IdentityResolverError {
    /// Provider or resolver configuration is invalid, or the provider is not registered.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A claim required by the resolver is absent from the upstream result.
    #[error("claim error: {0}")]
    Claim(String),

    /// Profile claim and signed-token claim disagree, or one of them is missing.
    #[error("cross-validation failed: {0}")]
    CrossValidation(String),

    /// The catalog collaborator failed (timeout, connectivity, malformed response).
    #[error("catalog lookup failed: {0}")]
    Lookup(String),

    /// Every resolver in the chain reported no catalog match.
    #[error("{0}")]
    ChainExhausted(String),

    /// Identity resolution is switched off for the provider.
    #[error("identity resolution disabled: {0}")]
    ResolutionDisabled(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures reported by a [`crate::CatalogClient`].
///
/// "No matching entity" is not an error: lookups return `Ok(None)` for it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("catalog call timed out after {0:?}")]
    Timeout(Duration),

    #[error("query `{query}` matched {count} entities")]
    Ambiguous { query: String, count: usize },

    #[error("malformed catalog response: {0}")]
    Malformed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// A compact signed token could not be decoded.
#[derive(Debug, Error)]
#[error("failed to decode signed token: {0}")]
pub struct TokenDecodeError(pub String);
