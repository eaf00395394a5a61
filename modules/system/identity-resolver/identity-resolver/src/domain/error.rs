//! Domain errors for the identity resolver.

use identity_resolver_sdk::{CatalogError, IdentityResolverError, ResultFlavor};

/// Message returned when every resolver in a chain reported no catalog match.
pub const CHAIN_EXHAUSTED_MESSAGE: &str = "unable to resolve user identity; verify the catalog \
    contains expected user entities matching the configured resolvers.";

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("no auth provider found for `{provider_id}`")]
    UnknownProvider { provider_id: String },

    #[error("auth provider `{provider_id}` is not registered")]
    ProviderNotRegistered { provider_id: String },

    #[error("auth provider `{provider_id}` is registered twice")]
    DuplicateProvider { provider_id: String },

    #[error("invalid configuration for auth provider `{provider_id}`: {reason}")]
    InvalidProviderConfig { provider_id: String, reason: String },

    #[error(
        "sign-in resolver `{resolver}` is not available for auth provider `{provider_id}`"
    )]
    UnknownResolver {
        provider_id: String,
        resolver: String,
    },

    #[error(
        "invalid options for sign-in resolver `{resolver}` of auth provider `{provider_id}`: \
         {reason}"
    )]
    InvalidResolverOptions {
        provider_id: String,
        resolver: String,
        reason: String,
    },

    #[error(
        "auth provider `{provider_id}` declares an empty sign-in resolver list"
    )]
    EmptyResolverList { provider_id: String },

    #[error("identity resolution is disabled for auth provider `{provider_id}`")]
    IdentityResolutionDisabled { provider_id: String },

    #[error(
        "auth provider `{provider_id}` expects a {expected} authentication result, got {actual}"
    )]
    UnexpectedResultShape {
        provider_id: String,
        expected: ResultFlavor,
        actual: ResultFlavor,
    },

    #[error(
        "the user profile from {provider} is missing the '{claim}' claim, likely due to a \
         misconfiguration in the provider (resolver `{resolver}`)"
    )]
    MissingClaim {
        provider: String,
        resolver: String,
        claim: String,
    },

    #[error(
        "request did not contain a user: none of the headers {headers:?} is set \
         (resolver `{resolver}`)"
    )]
    MissingUserHeader {
        resolver: String,
        headers: Vec<String>,
    },

    #[error("claim '{claim}' is not an email address (resolver `{resolver}`)")]
    InvalidEmail { resolver: String, claim: String },

    #[error(
        "sign-in email domain `{domain}` is not allowed (resolver `{resolver}`)"
    )]
    EmailDomainNotAllowed { resolver: String, domain: String },

    #[error("the user ID token from {provider} is missing (resolver `{resolver}`)")]
    IdTokenMissing { provider: String, resolver: String },

    #[error(
        "the user ID token from {provider} could not be decoded: {reason} \
         (resolver `{resolver}`)"
    )]
    IdTokenUndecodable {
        provider: String,
        resolver: String,
        reason: String,
    },

    #[error(
        "there was a problem verifying your identity with {provider} due to a mismatching \
         '{claim}' claim (resolver `{resolver}`)"
    )]
    ClaimMismatch {
        provider: String,
        resolver: String,
        claim: String,
    },

    #[error("catalog lookup `{query}` failed for resolver `{resolver}`: {source}")]
    CatalogLookup {
        resolver: String,
        query: String,
        #[source]
        source: CatalogError,
    },

    #[error("failed to issue a session for `{entity_ref}`: {source}")]
    SessionIssuance {
        entity_ref: String,
        #[source]
        source: CatalogError,
    },

    #[error("{}", CHAIN_EXHAUSTED_MESSAGE)]
    ChainExhausted { provider_id: String },

    #[error(
        "resolution for auth provider `{provider_id}` ended without a bound identity"
    )]
    Unbound { provider_id: String },
}

impl DomainError {
    /// Startup-time configuration failures.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownProvider { .. }
                | Self::ProviderNotRegistered { .. }
                | Self::DuplicateProvider { .. }
                | Self::InvalidProviderConfig { .. }
                | Self::UnknownResolver { .. }
                | Self::InvalidResolverOptions { .. }
                | Self::EmptyResolverList { .. }
        )
    }

    /// Failures where two sources of the same claim could not be reconciled.
    #[must_use]
    pub fn is_cross_validation(&self) -> bool {
        matches!(
            self,
            Self::IdTokenMissing { .. }
                | Self::IdTokenUndecodable { .. }
                | Self::ClaimMismatch { .. }
        )
    }
}

impl From<DomainError> for IdentityResolverError {
    fn from(e: DomainError) -> Self {
        let msg = e.to_string();
        match e {
            e if e.is_configuration() => Self::Configuration(msg),
            e if e.is_cross_validation() => Self::CrossValidation(msg),
            DomainError::IdentityResolutionDisabled { .. } => Self::ResolutionDisabled(msg),
            DomainError::UnexpectedResultShape { .. }
            | DomainError::MissingClaim { .. }
            | DomainError::MissingUserHeader { .. }
            | DomainError::InvalidEmail { .. }
            | DomainError::EmailDomainNotAllowed { .. } => Self::Claim(msg),
            DomainError::CatalogLookup { .. } | DomainError::SessionIssuance { .. } => {
                Self::Lookup(msg)
            }
            DomainError::ChainExhausted { .. } => Self::ChainExhausted(msg),
            _ => Self::Internal(msg),
        }
    }
}
