//! Sign-in resolvers: one named strategy per type, mapping a claim to a
//! catalog query.

use async_trait::async_trait;
use identity_resolver_sdk::{
    AuthenticationResult, CanonicalIdentityRef, CatalogQuery, EntityRef, SignedTokenDecoder,
};
use tracing::{debug, warn};

use super::catalog::CatalogLookup;
use super::claims::{self, ClaimSpec, ExtractedClaims};
use super::cross_validation::{CrossCheck, cross_validate};
use super::error::DomainError;

/// Outcome of a single resolver.
///
/// `NotFound` is the only outcome a chain falls through on.
#[derive(Debug)]
pub enum ResolverOutcome {
    Bound(CanonicalIdentityRef),
    NotFound,
    Fatal(DomainError),
}

impl ResolverOutcome {
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

impl From<Result<Option<CanonicalIdentityRef>, DomainError>> for ResolverOutcome {
    fn from(value: Result<Option<CanonicalIdentityRef>, DomainError>) -> Self {
        match value {
            Ok(Some(identity)) => Self::Bound(identity),
            Ok(None) => Self::NotFound,
            Err(e) => Self::Fatal(e),
        }
    }
}

/// Per-request collaborators handed to every resolver.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub catalog: &'a CatalogLookup,
    pub decoder: &'a dyn SignedTokenDecoder,
}

/// A single named identity-matching strategy.
#[async_trait]
pub trait SignInResolver: Send + Sync {
    /// Configuration name, e.g. `usernameMatchingUserEntityName`.
    fn name(&self) -> &str;

    async fn resolve(
        &self,
        result: &AuthenticationResult,
        ctx: &ResolveContext<'_>,
    ) -> ResolverOutcome;
}

/// Options shared by every resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Bind an unverified identity when the catalog has no match.
    pub allow_fallback_without_catalog_match: bool,
}

/// Turns the extracted claim into the catalog matching key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTransform {
    Identity,
    /// `alice@example.com` becomes `alice`. A non-empty allow-list restricts
    /// the accepted domains (case-insensitive).
    EmailLocalPart { allowed_domains: Vec<String> },
}

impl ValueTransform {
    fn apply(&self, resolver: &str, claim: &str, value: String) -> Result<String, DomainError> {
        match self {
            Self::Identity => Ok(value),
            Self::EmailLocalPart { allowed_domains } => {
                let invalid = || DomainError::InvalidEmail {
                    resolver: resolver.to_owned(),
                    claim: claim.to_owned(),
                };
                let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
                if local.is_empty() || domain.is_empty() {
                    return Err(invalid());
                }
                if !allowed_domains.is_empty()
                    && !allowed_domains
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(domain))
                {
                    return Err(DomainError::EmailDomainNotAllowed {
                        resolver: resolver.to_owned(),
                        domain: domain.to_owned(),
                    });
                }
                Ok(local.to_owned())
            }
        }
    }
}

/// How the matching key is compared against catalog entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    EntityName,
    Annotation(String),
    ProfileEmail,
}

impl MatchStrategy {
    fn query(&self, key: String) -> CatalogQuery {
        match self {
            Self::EntityName => CatalogQuery::EntityName { name: key },
            Self::Annotation(annotation) => CatalogQuery::Annotation {
                key: annotation.clone(),
                value: key,
            },
            Self::ProfileEmail => CatalogQuery::ProfileEmail { email: key },
        }
    }
}

/// Data-driven resolver covering every named strategy.
#[derive(Debug, Clone)]
pub struct Resolver {
    pub name: String,
    /// Provider name used in operator-facing messages, e.g. `Keycloak`.
    pub provider_label: String,
    pub claim: ClaimSpec,
    /// Require the claim to match the same claim in the ID token.
    pub cross_validate: bool,
    pub transform: ValueTransform,
    pub strategy: MatchStrategy,
    pub options: ResolverOptions,
}

impl Resolver {
    /// Resolve to `Some(identity)`, `None` for no catalog match, or a fatal error.
    ///
    /// # Errors
    ///
    /// Claim, cross-validation and catalog lookup failures.
    pub async fn try_resolve(
        &self,
        result: &AuthenticationResult,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<CanonicalIdentityRef>, DomainError> {
        let claim_name = self.claim.claim_name();
        let ExtractedClaims {
            value,
            signed_token: token,
        } = claims::extract(result, &self.claim);

        let value = if self.cross_validate {
            let check = CrossCheck {
                provider: &self.provider_label,
                resolver: &self.name,
                claim_path: &claim_name,
            };
            cross_validate(&check, value.as_deref(), token.as_ref(), ctx.decoder)?
        } else {
            value.ok_or_else(|| self.missing_claim(&claim_name))?
        };

        let key = self.transform.apply(&self.name, &claim_name, value)?;
        let query = self.strategy.query(key.clone());

        match ctx.catalog.find(&query).await {
            Ok(Some(entity)) => Ok(Some(CanonicalIdentityRef::Catalog(entity))),
            Ok(None) if self.options.allow_fallback_without_catalog_match => {
                let entity_ref = EntityRef::parse_user_ref(&key);
                warn!(
                    resolver = %self.name,
                    query = %query,
                    entity_ref = %entity_ref,
                    "No catalog match; signing in with an unverified fallback identity"
                );
                Ok(Some(CanonicalIdentityRef::Unverified {
                    entity_ref,
                    raw_subject: key,
                }))
            }
            Ok(None) => {
                debug!(resolver = %self.name, query = %query, "No catalog match");
                Ok(None)
            }
            Err(source) => Err(DomainError::CatalogLookup {
                resolver: self.name.clone(),
                query: query.to_string(),
                source,
            }),
        }
    }

    fn missing_claim(&self, claim_name: &str) -> DomainError {
        match &self.claim {
            ClaimSpec::Header(lookup) => DomainError::MissingUserHeader {
                resolver: self.name.clone(),
                headers: lookup.candidates(),
            },
            ClaimSpec::Subject | ClaimSpec::Profile(_) => DomainError::MissingClaim {
                provider: self.provider_label.clone(),
                resolver: self.name.clone(),
                claim: claim_name.to_owned(),
            },
        }
    }
}

#[async_trait]
impl SignInResolver for Resolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(
        &self,
        result: &AuthenticationResult,
        ctx: &ResolveContext<'_>,
    ) -> ResolverOutcome {
        self.try_resolve(result, ctx).await.into()
    }
}
