//! Static catalog plugin module.

use std::sync::{Arc, OnceLock};

use identity_resolver_sdk::CatalogClient;
use tracing::info;

use crate::config::StaticCatalogPluginConfig;
use crate::domain::Service;

/// Static catalog plugin module.
///
/// Serves user entities from configuration and hands its client to the
/// identity resolver.
pub struct StaticCatalogPlugin {
    service: OnceLock<Arc<Service>>,
}

impl Default for StaticCatalogPlugin {
    fn default() -> Self {
        Self {
            service: OnceLock::new(),
        }
    }
}

impl StaticCatalogPlugin {
    /// # Errors
    ///
    /// Fails if the plugin was already initialized.
    pub fn init(&self, cfg: &StaticCatalogPluginConfig) -> anyhow::Result<Arc<dyn CatalogClient>> {
        info!("Initializing static_catalog_plugin");
        tracing::warn!(
            "Static catalog plugin serves a fixed in-memory user list. \
             Do NOT use it in production."
        );

        let service = Arc::new(Service::from_config(cfg));
        info!(user_count = service.len(), "Loaded plugin configuration");

        self.service
            .set(service.clone())
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        let api: Arc<dyn CatalogClient> = service;
        info!("Static catalog plugin initialized");
        Ok(api)
    }

    #[must_use]
    pub fn service(&self) -> Option<&Arc<Service>> {
        self.service.get()
    }
}
