//! Provider registry: fixed per-provider defaults plus configured overrides.
//!
//! Built once at startup and read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use identity_resolver_sdk::{ProviderId, ResultFlavor};
use tracing::info;

use super::chain::ResolverChain;
use super::error::DomainError;
use super::factories::{FactoryContext, KEYCLOAK, PING_IDENTITY, ResolverKind};
use super::resolver::SignInResolver;
use crate::config::{IdentityResolverConfig, ResolverEntry};

/// Authenticator strategy selected by a provider id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticatorKind {
    Atlassian,
    Auth0,
    AzureEasyAuth,
    Bitbucket,
    BitbucketServer,
    CloudflareAccess,
    GitHub,
    GitLab,
    Google,
    GcpIap,
    OAuth2Proxy,
    Oidc,
    Okta,
    OneLogin,
    Microsoft,
}

const COMMON: [ResolverKind; 2] = [
    ResolverKind::EmailMatchingUserEntityProfileEmail,
    ResolverKind::EmailLocalPartMatchingUserEntityName,
];

const BITBUCKET_USERNAME: ResolverKind = ResolverKind::UsernameMatchingUserEntityAnnotation {
    annotation: "bitbucket.org/username",
};
const AZURE_USER_ID: ResolverKind = ResolverKind::IdMatchingUserEntityAnnotation {
    claim: "oid",
    annotation: "graph.microsoft.com/user-id",
};
const GCP_IAP_EMAIL: ResolverKind = ResolverKind::EmailMatchingUserEntityAnnotation {
    annotation: "google.com/email",
};
const OKTA_EMAIL: ResolverKind = ResolverKind::EmailMatchingUserEntityAnnotation {
    annotation: "okta.com/email",
};
const MICROSOFT_USER_ID: ResolverKind = ResolverKind::UserIdMatchingUserEntityAnnotation {
    annotation: "graph.microsoft.com/user-id",
};

impl AuthenticatorKind {
    /// Fixed provider-id table. `None` for ids this module does not know.
    #[must_use]
    pub fn from_provider_id(provider_id: &str) -> Option<Self> {
        let kind = match provider_id {
            "atlassian" => Self::Atlassian,
            "auth0" => Self::Auth0,
            "azure-easyauth" => Self::AzureEasyAuth,
            "bitbucket" => Self::Bitbucket,
            "bitbucketServer" => Self::BitbucketServer,
            "cfaccess" => Self::CloudflareAccess,
            "github" => Self::GitHub,
            "gitlab" => Self::GitLab,
            "google" => Self::Google,
            "gcp-iap" => Self::GcpIap,
            "oauth2Proxy" => Self::OAuth2Proxy,
            "oidc" => Self::Oidc,
            "okta" => Self::Okta,
            "onelogin" => Self::OneLogin,
            "microsoft" => Self::Microsoft,
            _ => return None,
        };
        Some(kind)
    }

    /// Shape of the authentication result this authenticator produces.
    #[must_use]
    pub fn flavor(self) -> ResultFlavor {
        match self {
            Self::AzureEasyAuth | Self::CloudflareAccess | Self::GcpIap | Self::OAuth2Proxy => {
                ResultFlavor::Proxy
            }
            Self::Atlassian
            | Self::Auth0
            | Self::Bitbucket
            | Self::BitbucketServer
            | Self::GitHub
            | Self::GitLab
            | Self::Google
            | Self::Oidc
            | Self::Okta
            | Self::OneLogin
            | Self::Microsoft => ResultFlavor::OAuth,
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Atlassian => "Atlassian",
            Self::Auth0 => "Auth0",
            Self::AzureEasyAuth => "Azure Easy Auth",
            Self::Bitbucket => "Bitbucket",
            Self::BitbucketServer => "Bitbucket Server",
            Self::CloudflareAccess => "Cloudflare Access",
            Self::GitHub => "GitHub",
            Self::GitLab => "GitLab",
            Self::Google => "Google",
            Self::GcpIap => "GCP IAP",
            Self::OAuth2Proxy => "OAuth2 Proxy",
            Self::Oidc => "OIDC",
            Self::Okta => "Okta",
            Self::OneLogin => "OneLogin",
            Self::Microsoft => "Microsoft",
        }
    }

    /// Resolvers used when the configuration declares none.
    #[must_use]
    pub fn default_resolvers(self) -> Vec<ResolverKind> {
        match self {
            Self::Atlassian | Self::GitHub | Self::GitLab | Self::OneLogin => {
                vec![ResolverKind::UsernameMatchingUserEntityName]
            }
            Self::Auth0 | Self::BitbucketServer | Self::CloudflareAccess => {
                vec![ResolverKind::EmailMatchingUserEntityProfileEmail]
            }
            Self::AzureEasyAuth => vec![AZURE_USER_ID],
            Self::Bitbucket => vec![BITBUCKET_USERNAME],
            Self::Google => vec![ResolverKind::EmailLocalPartMatchingUserEntityName],
            Self::GcpIap => vec![GCP_IAP_EMAIL],
            Self::OAuth2Proxy => vec![ResolverKind::OAuth2ProxyUserHeaderMatchingUserEntityName],
            Self::Oidc => vec![
                ResolverKind::OidcSubClaim(KEYCLOAK),
                ResolverKind::OidcLdapUuidMatchingAnnotation,
            ],
            Self::Okta => vec![OKTA_EMAIL],
            Self::Microsoft => vec![MICROSOFT_USER_ID],
        }
    }

    /// Resolvers selectable by name in configuration.
    #[must_use]
    pub fn factories(self) -> Vec<ResolverKind> {
        let specific = match self {
            Self::Atlassian | Self::OneLogin => vec![ResolverKind::UsernameMatchingUserEntityName],
            Self::Auth0 | Self::BitbucketServer | Self::CloudflareAccess | Self::Google => {
                Vec::new()
            }
            Self::AzureEasyAuth => vec![AZURE_USER_ID],
            Self::Bitbucket => vec![
                BITBUCKET_USERNAME,
                ResolverKind::UserIdMatchingUserEntityAnnotation {
                    annotation: "bitbucket.org/user-id",
                },
            ],
            Self::GitHub => vec![
                ResolverKind::UsernameMatchingUserEntityName,
                ResolverKind::UserIdMatchingUserEntityAnnotation {
                    annotation: "github.com/user-id",
                },
            ],
            Self::GitLab => vec![
                ResolverKind::UsernameMatchingUserEntityName,
                ResolverKind::UserIdMatchingUserEntityAnnotation {
                    annotation: "gitlab.com/user-id",
                },
            ],
            Self::GcpIap => vec![
                GCP_IAP_EMAIL,
                ResolverKind::IdMatchingUserEntityAnnotation {
                    claim: "sub",
                    annotation: "google.com/user-id",
                },
            ],
            Self::OAuth2Proxy => vec![
                ResolverKind::ForwardedUserMatchingUserEntityName,
                ResolverKind::OAuth2ProxyUserHeaderMatchingUserEntityName,
            ],
            Self::Oidc => vec![
                ResolverKind::PreferredUsernameMatchingUserEntityName,
                ResolverKind::OidcSubClaim(KEYCLOAK),
                ResolverKind::OidcSubClaim(PING_IDENTITY),
                ResolverKind::OidcLdapUuidMatchingAnnotation,
            ],
            Self::Okta => vec![OKTA_EMAIL],
            Self::Microsoft => vec![
                ResolverKind::EmailMatchingUserEntityAnnotation {
                    annotation: "microsoft.com/email",
                },
                MICROSOFT_USER_ID,
            ],
        };
        specific.into_iter().chain(COMMON).collect()
    }
}

/// Immutable registration of one provider.
#[derive(Debug, Clone)]
pub struct ProviderRegistration {
    pub provider_id: ProviderId,
    pub authenticator: AuthenticatorKind,
    /// `None` when identity resolution is disabled for the provider.
    pub chain: Option<ResolverChain>,
    /// Resolver names this provider accepts in configuration.
    pub factories: Vec<&'static str>,
}

/// Provider id to registration, fixed after construction.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, ProviderRegistration>,
}

impl ProviderRegistry {
    /// Register every configured provider (except `guest`) for the active environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown provider id, an unreadable
    /// provider block, an empty or unknown resolver, or invalid resolver options.
    #[tracing::instrument(skip_all, fields(environment = %cfg.environment))]
    pub fn from_config(cfg: &IdentityResolverConfig) -> Result<Self, DomainError> {
        let mut builder = ProviderRegistryBuilder::new(cfg.oauth_user_header.clone());
        for provider_id in cfg.provider_ids() {
            let env_cfg = cfg.environment_config(provider_id).map_err(|e| {
                DomainError::InvalidProviderConfig {
                    provider_id: provider_id.to_owned(),
                    reason: e.to_string(),
                }
            })?;
            let declared = env_cfg.sign_in.map(|s| s.resolvers);
            builder.register(
                provider_id,
                env_cfg.disable_identity_resolution,
                declared.as_deref(),
            )?;
        }
        Ok(builder.build())
    }

    /// # Errors
    ///
    /// Returns `ProviderNotRegistered` if `provider_id` was not registered at startup.
    pub fn lookup(&self, provider_id: &ProviderId) -> Result<&ProviderRegistration, DomainError> {
        self.providers
            .get(provider_id)
            .ok_or_else(|| DomainError::ProviderNotRegistered {
                provider_id: provider_id.to_string(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered provider ids, sorted.
    #[must_use]
    pub fn provider_ids(&self) -> Vec<&ProviderId> {
        let mut ids: Vec<_> = self.providers.keys().collect();
        ids.sort();
        ids
    }
}

/// Collects registrations; the only way to populate a [`ProviderRegistry`].
#[derive(Debug, Default)]
pub struct ProviderRegistryBuilder {
    oauth_user_header: Option<String>,
    providers: HashMap<ProviderId, ProviderRegistration>,
}

impl ProviderRegistryBuilder {
    #[must_use]
    pub fn new(oauth_user_header: Option<String>) -> Self {
        Self {
            oauth_user_header,
            providers: HashMap::new(),
        }
    }

    /// Register `provider_id` with its default resolvers, or with `declared`
    /// when given.
    ///
    /// # Errors
    ///
    /// - `UnknownProvider` if the id is not in the fixed provider table
    /// - `DuplicateProvider` if it was already registered
    /// - `EmptyResolverList` if `declared` is empty
    /// - `UnknownResolver` / `InvalidResolverOptions` for a bad declared resolver
    pub fn register(
        &mut self,
        provider_id: &str,
        disable_identity_resolution: bool,
        declared: Option<&[ResolverEntry]>,
    ) -> Result<&ProviderRegistration, DomainError> {
        let authenticator = AuthenticatorKind::from_provider_id(provider_id).ok_or_else(|| {
            DomainError::UnknownProvider {
                provider_id: provider_id.to_owned(),
            }
        })?;
        let id = ProviderId::new(provider_id);
        if self.providers.contains_key(&id) {
            return Err(DomainError::DuplicateProvider {
                provider_id: provider_id.to_owned(),
            });
        }

        let factories = authenticator.factories();
        let chain = if disable_identity_resolution {
            None
        } else {
            let ctx = FactoryContext {
                provider_id,
                provider_label: authenticator.display_name(),
                oauth_user_header: self.oauth_user_header.as_deref(),
            };
            Some(build_chain(&ctx, authenticator, &factories, declared)?)
        };

        let registration = ProviderRegistration {
            provider_id: id.clone(),
            authenticator,
            chain,
            factories: factories.iter().map(ResolverKind::name).collect(),
        };
        if let Some(chain) = &registration.chain {
            info!(
                provider_id,
                authenticator = ?authenticator,
                resolvers = ?chain.names(),
                "Registered auth provider"
            );
        } else {
            info!(
                provider_id,
                authenticator = ?authenticator,
                "Registered auth provider with identity resolution disabled"
            );
        }

        Ok(self.providers.entry(id).or_insert(registration))
    }

    #[must_use]
    pub fn build(self) -> ProviderRegistry {
        let mut enabled: Vec<_> = self.providers.keys().map(ProviderId::as_str).collect();
        enabled.sort_unstable();
        info!(providers = ?enabled, "Enabled auth providers");
        ProviderRegistry {
            providers: self.providers,
        }
    }
}

fn build_chain(
    ctx: &FactoryContext<'_>,
    authenticator: AuthenticatorKind,
    factories: &[ResolverKind],
    declared: Option<&[ResolverEntry]>,
) -> Result<ResolverChain, DomainError> {
    let resolvers = match declared {
        None => authenticator
            .default_resolvers()
            .iter()
            .map(|kind| kind.build(ctx, &serde_json::Map::new()))
            .collect::<Result<Vec<_>, _>>()?,
        Some([]) => {
            return Err(DomainError::EmptyResolverList {
                provider_id: ctx.provider_id.to_owned(),
            });
        }
        Some(entries) => entries
            .iter()
            .map(|entry| {
                let kind = factories
                    .iter()
                    .find(|k| k.name() == entry.resolver)
                    .ok_or_else(|| DomainError::UnknownResolver {
                        provider_id: ctx.provider_id.to_owned(),
                        resolver: entry.resolver.clone(),
                    })?;
                kind.build(ctx, &entry.options)
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(ResolverChain::new(
        resolvers
            .into_iter()
            .map(|r| Arc::new(r) as Arc<dyn SignInResolver>)
            .collect(),
    ))
}
