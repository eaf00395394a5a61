//! Named sign-in resolver factories.
//!
//! Each factory validates its own options at startup and produces a
//! [`Resolver`]. Option keys accept both `snake_case` and the `camelCase`
//! spelling used by existing deployments.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use super::claims::{ClaimSpec, HeaderLookup};
use super::error::DomainError;
use super::resolver::{MatchStrategy, Resolver, ResolverOptions, ValueTransform};

pub const KEYCLOAK_ID_ANNOTATION: &str = "keycloak.org/id";
pub const PING_IDENTITY_ID_ANNOTATION: &str = "pingidentity.org/id";
pub const LDAP_UUID_ANNOTATION: &str = "backstage.io/ldap-uuid";
pub const DEFAULT_LDAP_UUID_CLAIM: &str = "ldap_uuid";

/// OIDC deployment whose `sub` claim is matched against a user-id annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OidcSubjectProvider {
    pub resolver_name: &'static str,
    pub provider_name: &'static str,
    pub annotation: &'static str,
}

pub const KEYCLOAK: OidcSubjectProvider = OidcSubjectProvider {
    resolver_name: "oidcSubClaimMatchingKeycloakUserId",
    provider_name: "Keycloak",
    annotation: KEYCLOAK_ID_ANNOTATION,
};

pub const PING_IDENTITY: OidcSubjectProvider = OidcSubjectProvider {
    resolver_name: "oidcSubClaimMatchingPingIdentityUserId",
    provider_name: "Ping Identity",
    annotation: PING_IDENTITY_ID_ANNOTATION,
};

/// Every resolver a provider may declare by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    /// `email` claim against the entity's `spec.profile.email`.
    EmailMatchingUserEntityProfileEmail,
    /// Local part of the `email` claim against the entity name.
    EmailLocalPartMatchingUserEntityName,
    /// `username` claim against the entity name.
    UsernameMatchingUserEntityName,
    UsernameMatchingUserEntityAnnotation { annotation: &'static str },
    /// Numeric or string `id` claim against a user-id annotation.
    UserIdMatchingUserEntityAnnotation { annotation: &'static str },
    IdMatchingUserEntityAnnotation {
        claim: &'static str,
        annotation: &'static str,
    },
    EmailMatchingUserEntityAnnotation { annotation: &'static str },
    /// `x-forwarded-user` header against the entity name.
    ForwardedUserMatchingUserEntityName,
    PreferredUsernameMatchingUserEntityName,
    /// Cross-validated `sub` against a provider-specific annotation.
    OidcSubClaim(OidcSubjectProvider),
    /// Cross-validated LDAP UUID claim against `backstage.io/ldap-uuid`.
    OidcLdapUuidMatchingAnnotation,
    /// Configured header, else the well-known forwarded user headers.
    OAuth2ProxyUserHeaderMatchingUserEntityName,
}

/// Provider-level inputs every factory may need.
#[derive(Debug, Clone, Copy)]
pub struct FactoryContext<'a> {
    pub provider_id: &'a str,
    /// Provider name used in operator-facing messages.
    pub provider_label: &'a str,
    pub oauth_user_header: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FallbackOptions {
    #[serde(alias = "dangerouslyAllowSignInWithoutUserInCatalog")]
    dangerously_allow_sign_in_without_user_in_catalog: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EmailLocalPartOptions {
    #[serde(alias = "dangerouslyAllowSignInWithoutUserInCatalog")]
    dangerously_allow_sign_in_without_user_in_catalog: bool,
    #[serde(alias = "allowedDomains")]
    allowed_domains: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LdapUuidOptions {
    #[serde(alias = "dangerouslyAllowSignInWithoutUserInCatalog")]
    dangerously_allow_sign_in_without_user_in_catalog: bool,
    #[serde(alias = "ldapUuidKey")]
    ldap_uuid_key: Option<String>,
}

impl ResolverKind {
    /// Name used in `sign_in.resolvers[].resolver`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EmailMatchingUserEntityProfileEmail => "emailMatchingUserEntityProfileEmail",
            Self::EmailLocalPartMatchingUserEntityName => "emailLocalPartMatchingUserEntityName",
            Self::UsernameMatchingUserEntityName => "usernameMatchingUserEntityName",
            Self::UsernameMatchingUserEntityAnnotation { .. } => {
                "usernameMatchingUserEntityAnnotation"
            }
            Self::UserIdMatchingUserEntityAnnotation { .. } => "userIdMatchingUserEntityAnnotation",
            Self::IdMatchingUserEntityAnnotation { .. } => "idMatchingUserEntityAnnotation",
            Self::EmailMatchingUserEntityAnnotation { .. } => "emailMatchingUserEntityAnnotation",
            Self::ForwardedUserMatchingUserEntityName => "forwardedUserMatchingUserEntityName",
            Self::PreferredUsernameMatchingUserEntityName => {
                "preferredUsernameMatchingUserEntityName"
            }
            Self::OidcSubClaim(provider) => provider.resolver_name,
            Self::OidcLdapUuidMatchingAnnotation => "oidcLdapUuidMatchingAnnotation",
            Self::OAuth2ProxyUserHeaderMatchingUserEntityName => {
                "oauth2ProxyUserHeaderMatchingUserEntityName"
            }
        }
    }

    /// Validate `options` and build the resolver.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolverOptions` if `options` does not match the
    /// resolver's option schema.
    pub fn build(
        &self,
        ctx: &FactoryContext<'_>,
        options: &Map<String, Value>,
    ) -> Result<Resolver, DomainError> {
        let (label, claim, strategy) = self.shape(ctx);
        let mut resolver = match *self {
            Self::EmailLocalPartMatchingUserEntityName => {
                let opts: EmailLocalPartOptions = self.parse_options(ctx, options)?;
                let mut resolver = self.base(
                    label,
                    claim,
                    strategy,
                    opts.dangerously_allow_sign_in_without_user_in_catalog,
                );
                resolver.transform = ValueTransform::EmailLocalPart {
                    allowed_domains: opts.allowed_domains,
                };
                resolver
            }
            Self::OidcLdapUuidMatchingAnnotation => {
                let opts: LdapUuidOptions = self.parse_options(ctx, options)?;
                let claim = opts.ldap_uuid_key.map_or(claim, ClaimSpec::Profile);
                self.base(
                    label,
                    claim,
                    strategy,
                    opts.dangerously_allow_sign_in_without_user_in_catalog,
                )
            }
            _ => {
                let opts: FallbackOptions = self.parse_options(ctx, options)?;
                self.base(
                    label,
                    claim,
                    strategy,
                    opts.dangerously_allow_sign_in_without_user_in_catalog,
                )
            }
        };
        resolver.cross_validate = matches!(
            self,
            Self::OidcSubClaim(_) | Self::OidcLdapUuidMatchingAnnotation
        );

        if resolver.options.allow_fallback_without_catalog_match {
            warn!(
                provider_id = ctx.provider_id,
                resolver = %resolver.name,
                "Sign-in without a catalog user is allowed; unmatched users sign in unverified"
            );
        }
        Ok(resolver)
    }

    /// Message label, claim and match strategy before options are applied.
    fn shape<'a>(&self, ctx: &FactoryContext<'a>) -> (&'a str, ClaimSpec, MatchStrategy) {
        let label = ctx.provider_label;
        match *self {
            Self::EmailMatchingUserEntityProfileEmail => {
                (label, ClaimSpec::profile("email"), MatchStrategy::ProfileEmail)
            }
            Self::UsernameMatchingUserEntityName => {
                (label, ClaimSpec::profile("username"), MatchStrategy::EntityName)
            }
            Self::UsernameMatchingUserEntityAnnotation { annotation } => (
                label,
                ClaimSpec::profile("username"),
                MatchStrategy::Annotation(annotation.to_owned()),
            ),
            Self::UserIdMatchingUserEntityAnnotation { annotation } => (
                label,
                ClaimSpec::profile("id"),
                MatchStrategy::Annotation(annotation.to_owned()),
            ),
            Self::IdMatchingUserEntityAnnotation { claim, annotation } => (
                label,
                ClaimSpec::profile(claim),
                MatchStrategy::Annotation(annotation.to_owned()),
            ),
            Self::EmailMatchingUserEntityAnnotation { annotation } => (
                label,
                ClaimSpec::profile("email"),
                MatchStrategy::Annotation(annotation.to_owned()),
            ),
            Self::ForwardedUserMatchingUserEntityName => (
                label,
                ClaimSpec::Header(HeaderLookup::single(super::claims::FORWARDED_USER)),
                MatchStrategy::EntityName,
            ),
            Self::PreferredUsernameMatchingUserEntityName => (
                "OIDC",
                ClaimSpec::profile("preferred_username"),
                MatchStrategy::EntityName,
            ),
            Self::OidcSubClaim(provider) => (
                provider.provider_name,
                ClaimSpec::Subject,
                MatchStrategy::Annotation(provider.annotation.to_owned()),
            ),
            Self::OAuth2ProxyUserHeaderMatchingUserEntityName => (
                label,
                ClaimSpec::Header(HeaderLookup::user_headers(
                    ctx.oauth_user_header.map(str::to_owned),
                )),
                MatchStrategy::EntityName,
            ),
            Self::EmailLocalPartMatchingUserEntityName => {
                (label, ClaimSpec::profile("email"), MatchStrategy::EntityName)
            }
            Self::OidcLdapUuidMatchingAnnotation => (
                "LDAP",
                ClaimSpec::profile(DEFAULT_LDAP_UUID_CLAIM),
                MatchStrategy::Annotation(LDAP_UUID_ANNOTATION.to_owned()),
            ),
        }
    }

    fn base(
        &self,
        provider_label: &str,
        claim: ClaimSpec,
        strategy: MatchStrategy,
        allow_fallback: bool,
    ) -> Resolver {
        Resolver {
            name: self.name().to_owned(),
            provider_label: provider_label.to_owned(),
            claim,
            cross_validate: false,
            transform: ValueTransform::Identity,
            strategy,
            options: ResolverOptions {
                allow_fallback_without_catalog_match: allow_fallback,
            },
        }
    }

    fn parse_options<T: DeserializeOwned>(
        &self,
        ctx: &FactoryContext<'_>,
        options: &Map<String, Value>,
    ) -> Result<T, DomainError> {
        serde_json::from_value(Value::Object(options.clone())).map_err(|e| {
            DomainError::InvalidResolverOptions {
                provider_id: ctx.provider_id.to_owned(),
                resolver: self.name().to_owned(),
                reason: e.to_string(),
            }
        })
    }
}
