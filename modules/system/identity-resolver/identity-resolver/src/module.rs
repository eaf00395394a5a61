//! Identity resolver module.

use std::sync::{Arc, OnceLock};

use anyhow::Context;
use identity_resolver_sdk::{CatalogClient, IdentityResolverClient, SignedTokenDecoder};
use tracing::info;

use crate::config::IdentityResolverConfig;
use crate::domain::{
    CatalogLookup, IdentityResolverLocalClient, ProviderRegistry, Service, UnverifiedJwtDecoder,
};

/// Identity Resolver module.
///
/// This module:
/// 1. Builds the provider registry from configuration, failing fast on any
///    unknown provider or invalid resolver declaration
/// 2. Binds the catalog collaborator behind the configured lookup timeout
/// 3. Hands out the [`IdentityResolverClient`] used by the transport layer
pub struct IdentityResolver {
    service: OnceLock<Arc<Service>>,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self {
            service: OnceLock::new(),
        }
    }
}

impl IdentityResolver {
    /// Initialize with the JWT claim decoder.
    ///
    /// # Errors
    ///
    /// Fails if the provider registry cannot be built or the module was
    /// already initialized.
    pub fn init(
        &self,
        cfg: &IdentityResolverConfig,
        catalog: Arc<dyn CatalogClient>,
    ) -> anyhow::Result<Arc<dyn IdentityResolverClient>> {
        self.init_with_decoder(cfg, catalog, Arc::new(UnverifiedJwtDecoder))
    }

    /// Initialize with a caller-supplied signed-token decoder.
    ///
    /// # Errors
    ///
    /// Same as [`IdentityResolver::init`].
    #[tracing::instrument(skip_all, fields(environment))]
    pub fn init_with_decoder(
        &self,
        cfg: &IdentityResolverConfig,
        catalog: Arc<dyn CatalogClient>,
        decoder: Arc<dyn SignedTokenDecoder>,
    ) -> anyhow::Result<Arc<dyn IdentityResolverClient>> {
        tracing::Span::current().record("environment", cfg.environment.as_str());
        info!(
            environment = %cfg.environment,
            lookup_timeout = ?cfg.lookup_timeout,
            "Initializing identity_resolver"
        );

        let registry =
            ProviderRegistry::from_config(cfg).context("failed to build auth provider registry")?;
        let catalog = CatalogLookup::new(catalog, cfg.lookup_timeout);
        let svc = Arc::new(Service::new(registry, catalog, decoder));

        let api: Arc<dyn IdentityResolverClient> =
            Arc::new(IdentityResolverLocalClient::new(svc.clone()));

        self.service
            .set(svc)
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        Ok(api)
    }

    /// The initialized service, if `init` has run.
    #[must_use]
    pub fn service(&self) -> Option<&Arc<Service>> {
        self.service.get()
    }
}
