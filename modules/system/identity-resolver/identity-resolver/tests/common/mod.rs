#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use figment::Figment;
use figment::providers::{Format, Serialized, Yaml};
use identity_resolver::IdentityResolver;
use identity_resolver::config::IdentityResolverConfig;
use identity_resolver_sdk::{
    AuthenticationResult, CanonicalIdentityRef, CatalogClient, CatalogEntity, CatalogError,
    CatalogQuery, IdentityResolverClient, OAuthResult, SessionIdentity,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use static_catalog_plugin::StaticCatalogPlugin;
use static_catalog_plugin::config::StaticCatalogPluginConfig;

/// Catalog users shared by the scenarios.
pub const CATALOG: &str = "
users:
  - name: alice
    email: alice@example.com
    annotations:
      keycloak.org/id: u123
      pingidentity.org/id: u123
      backstage.io/ldap-uuid: 7f3c
    member_of: [devs]
  - name: bob
    email: bob@example.com
";

pub fn resolver_config(yaml: &str) -> IdentityResolverConfig {
    Figment::from(Serialized::defaults(IdentityResolverConfig::default()))
        .merge(Yaml::string(yaml))
        .extract()
        .unwrap()
}

pub fn static_catalog(yaml: &str) -> Arc<dyn CatalogClient> {
    let cfg: StaticCatalogPluginConfig = Figment::new()
        .merge(Yaml::string(yaml))
        .extract()
        .unwrap();
    StaticCatalogPlugin::default().init(&cfg).unwrap()
}

pub fn client(
    resolver_yaml: &str,
    catalog: Arc<dyn CatalogClient>,
) -> Arc<dyn IdentityResolverClient> {
    IdentityResolver::default()
        .init(&resolver_config(resolver_yaml), catalog)
        .unwrap()
}

pub fn oauth(profile: &Value, id_token: Option<&str>) -> AuthenticationResult {
    let mut result = OAuthResult::new(profile.as_object().cloned().unwrap_or_default());
    if let Some(token) = id_token {
        result = result.with_id_token(token);
    }
    AuthenticationResult::OAuth(result)
}

/// HS256 token under a throwaway key; the resolver reads claims without verifying it.
pub fn id_token(claims: &Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(b"integration-test-secret"),
    )
    .unwrap()
}

/// Records every lookup before delegating.
pub struct RecordingCatalog {
    inner: Arc<dyn CatalogClient>,
    queries: Mutex<Vec<CatalogQuery>>,
}

impl RecordingCatalog {
    pub fn new(inner: Arc<dyn CatalogClient>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<CatalogQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for RecordingCatalog {
    async fn find_entity(
        &self,
        query: &CatalogQuery,
    ) -> Result<Option<CatalogEntity>, CatalogError> {
        self.queries.lock().unwrap().push(query.clone());
        self.inner.find_entity(query).await
    }

    async fn issue_session(
        &self,
        identity: &CanonicalIdentityRef,
    ) -> Result<SessionIdentity, CatalogError> {
        self.inner.issue_session(identity).await
    }
}

/// Never answers within any reasonable timeout.
pub struct StalledCatalog;

#[async_trait]
impl CatalogClient for StalledCatalog {
    async fn find_entity(
        &self,
        _query: &CatalogQuery,
    ) -> Result<Option<CatalogEntity>, CatalogError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn issue_session(
        &self,
        identity: &CanonicalIdentityRef,
    ) -> Result<SessionIdentity, CatalogError> {
        Ok(SessionIdentity::builder(identity.entity_ref().clone()).build())
    }
}
