//! Configuration for the identity resolver.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provider key that never takes part in identity resolution.
pub const GUEST_PROVIDER: &str = "guest";

/// Environment variable naming the forwarded header trusted for proxy sign-in.
pub const OAUTH_USER_HEADER_ENV: &str = "OAUTH_USER_HEADER";

/// Prefix for environment overrides, nested with `__`.
pub const ENV_PREFIX: &str = "IDENTITY_RESOLVER_";

fn default_environment() -> String {
    "development".to_owned()
}

fn default_lookup_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityResolverConfig {
    /// Selects the per-environment block of every provider entry.
    pub environment: String,

    /// Header trusted by `oauth2ProxyUserHeaderMatchingUserEntityName`.
    ///
    /// When set, it is the only header consulted. Also populated from the
    /// `OAUTH_USER_HEADER` environment variable.
    pub oauth_user_header: Option<String>,

    /// Upper bound for a single catalog call.
    #[serde(with = "humantime_serde")]
    pub lookup_timeout: Duration,

    /// Provider id to its per-environment settings.
    ///
    /// Kept as raw values so that provider entries carrying protocol settings
    /// this module does not own (and the `guest` entry) still load.
    pub providers: BTreeMap<String, Value>,
}

impl Default for IdentityResolverConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            oauth_user_header: None,
            lookup_timeout: default_lookup_timeout(),
            providers: BTreeMap::new(),
        }
    }
}

impl IdentityResolverConfig {
    /// Layer defaults, an optional YAML file and environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a `figment::Error` if a source cannot be parsed or the merged
    /// document does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[OAUTH_USER_HEADER_ENV]))
            .extract()
    }

    /// Provider ids taking part in identity resolution, in sorted order.
    pub fn provider_ids(&self) -> impl Iterator<Item = &str> {
        self.providers
            .keys()
            .map(String::as_str)
            .filter(|id| *id != GUEST_PROVIDER)
    }

    /// Settings of `provider_id` for the active environment.
    ///
    /// A provider without a block for the active environment gets the defaults.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the block does not match the schema.
    pub fn environment_config(
        &self,
        provider_id: &str,
    ) -> Result<ProviderEnvironmentConfig, serde_json::Error> {
        match self
            .providers
            .get(provider_id)
            .and_then(|p| p.get(&self.environment))
        {
            Some(block) => serde_json::from_value(block.clone()),
            None => Ok(ProviderEnvironmentConfig::default()),
        }
    }
}

/// Identity-resolution settings of one provider in one environment.
///
/// Unknown keys (client ids, secrets, callback URLs) belong to the protocol
/// layer and are ignored here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderEnvironmentConfig {
    /// Register the provider without any resolver; sign-in through it is rejected.
    #[serde(alias = "disableIdentityResolution")]
    pub disable_identity_resolution: bool,

    /// Replaces the provider's default resolver(s) when present.
    #[serde(alias = "signIn")]
    pub sign_in: Option<SignInConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignInConfig {
    /// Tried in declared order.
    pub resolvers: Vec<ResolverEntry>,
}

/// One declared resolver: its factory name plus resolver-specific options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverEntry {
    pub resolver: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}
