//! Shared fixtures for domain unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use identity_resolver_sdk::{
    AuthenticationResult, CanonicalIdentityRef, CatalogClient, CatalogEntity, CatalogError,
    CatalogQuery, EntityRef, OAuthResult, SessionIdentity,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;

use super::catalog::CatalogLookup;

/// In-memory catalog with optional injected failure.
#[derive(Default)]
pub struct MemoryCatalog {
    entities: Vec<CatalogEntity>,
    failure: Option<CatalogError>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: &str, annotations: &[(&str, &str)]) -> Self {
        let mut entity = CatalogEntity::new(EntityRef::user(name));
        for (k, v) in annotations {
            entity.annotations.insert((*k).to_owned(), (*v).to_owned());
        }
        self.entities.push(entity);
        self
    }

    pub fn with_email_user(mut self, name: &str, email: &str) -> Self {
        let mut entity = CatalogEntity::new(EntityRef::user(name));
        entity.profile_email = Some(email.to_owned());
        self.entities.push(entity);
        self
    }

    pub fn failing(mut self, error: CatalogError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn find_entity(
        &self,
        query: &CatalogQuery,
    ) -> Result<Option<CatalogEntity>, CatalogError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut matches = self.entities.iter().filter(|e| e.matches(query));
        let first = matches.next().cloned();
        let rest = matches.count();
        if rest > 0 {
            return Err(CatalogError::Ambiguous {
                query: query.to_string(),
                count: rest + 1,
            });
        }
        Ok(first)
    }

    async fn issue_session(
        &self,
        identity: &CanonicalIdentityRef,
    ) -> Result<SessionIdentity, CatalogError> {
        Ok(SessionIdentity::builder(identity.entity_ref().clone())
            .verified(identity.is_verified())
            .token("test-session".to_owned())
            .build())
    }
}

pub fn lookup(catalog: MemoryCatalog) -> CatalogLookup {
    shared_lookup(&Arc::new(catalog))
}

pub fn shared_lookup(catalog: &Arc<MemoryCatalog>) -> CatalogLookup {
    let client: Arc<dyn CatalogClient> = catalog.clone();
    CatalogLookup::new(client, Duration::from_secs(5))
}

pub fn oauth(profile: &Value) -> AuthenticationResult {
    AuthenticationResult::OAuth(OAuthResult::new(profile.as_object().cloned().unwrap_or_default()))
}

pub fn oauth_with_token(profile: &Value, id_token: &str) -> AuthenticationResult {
    AuthenticationResult::OAuth(
        OAuthResult::new(profile.as_object().cloned().unwrap_or_default()).with_id_token(id_token),
    )
}

/// HS256 token signed with a throwaway key; decoding ignores the signature.
pub fn id_token(claims: &Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(b"unit-test-secret"),
    )
    .unwrap()
}
