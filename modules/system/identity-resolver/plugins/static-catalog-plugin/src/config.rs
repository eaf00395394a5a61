//! Configuration for the static catalog plugin.

use std::collections::BTreeMap;

use identity_resolver_sdk::models::DEFAULT_NAMESPACE;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticCatalogPluginConfig {
    /// User entities served by the catalog.
    pub users: Vec<UserConfig>,
}

/// One user entity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// `metadata.name`.
    pub name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// `metadata.annotations`, e.g. `keycloak.org/id`.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// `spec.profile.email`.
    #[serde(default)]
    pub email: Option<String>,

    /// Group references; bare names resolve to `group:default/<name>`.
    #[serde(default)]
    pub member_of: Vec<String>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}
