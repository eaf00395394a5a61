//! Domain models for the identity resolver module.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default entity kind used when a reference omits it.
pub const DEFAULT_ENTITY_KIND: &str = "user";

/// Default namespace used when a reference omits it.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Key of a configured auth provider, e.g. `oidc` or `github`.
///
/// Unique across the provider registry and immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Family of authenticator that produced an [`AuthenticationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFlavor {
    /// `OAuth2` / OIDC redirect flow.
    OAuth,
    /// Identity asserted by a trusted reverse proxy.
    Proxy,
}

impl fmt::Display for ResultFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth => f.write_str("oauth"),
            Self::Proxy => f.write_str("proxy"),
        }
    }
}

/// Result of a completed `OAuth2` / OIDC handshake.
#[derive(Debug, Clone, Default)]
pub struct OAuthResult {
    /// Profile / userinfo claims as returned by the provider.
    pub profile: Map<String, Value>,
    /// Raw ID token from the token set. Never logged.
    pub id_token: Option<SecretString>,
}

impl OAuthResult {
    #[must_use]
    pub fn new(profile: Map<String, Value>) -> Self {
        Self {
            profile,
            id_token: None,
        }
    }

    #[must_use]
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(SecretString::from(token.into()));
        self
    }
}

/// Result of a proxy-authenticated request.
///
/// Header names are stored lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ProxyResult {
    headers: HashMap<String, String>,
    claims: Map<String, Value>,
}

impl ProxyResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Claims the proxy forwarded in decoded form (e.g. from an assertion header).
    #[must_use]
    pub fn with_claims(mut self, claims: Map<String, Value>) -> Self {
        self.claims = claims;
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
}

/// Immutable value produced by the protocol layer for one sign-in attempt.
#[derive(Debug, Clone)]
pub enum AuthenticationResult {
    OAuth(OAuthResult),
    Proxy(ProxyResult),
}

impl AuthenticationResult {
    #[must_use]
    pub fn flavor(&self) -> ResultFlavor {
        match self {
            Self::OAuth(_) => ResultFlavor::OAuth,
            Self::Proxy(_) => ResultFlavor::Proxy,
        }
    }

    /// Profile claims, regardless of result shape.
    #[must_use]
    pub fn profile_claims(&self) -> &Map<String, Value> {
        match self {
            Self::OAuth(r) => &r.profile,
            Self::Proxy(r) => r.claims(),
        }
    }

    /// String value of a profile claim. Non-string and empty values read as absent.
    #[must_use]
    pub fn profile_claim(&self, key: &str) -> Option<&str> {
        self.profile_claims()
            .get(key)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Primary subject claim (`sub`).
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.profile_claim("sub")
    }

    #[must_use]
    pub fn signed_token(&self) -> Option<&SecretString> {
        match self {
            Self::OAuth(r) => r.id_token.as_ref(),
            Self::Proxy(_) => None,
        }
    }

    /// Forwarded header value. Always absent for OAuth results.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            Self::OAuth(_) => None,
            Self::Proxy(r) => r.header(name),
        }
    }
}

/// Query understood by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogQuery {
    /// Entity whose `metadata.name` equals `name`.
    EntityName { name: String },
    /// Entity carrying annotation `key=value`.
    Annotation { key: String, value: String },
    /// Entity whose `spec.profile.email` equals `email`.
    ProfileEmail { email: String },
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityName { name } => write!(f, "metadata.name={name}"),
            Self::Annotation { key, value } => write!(f, "metadata.annotations.{key}={value}"),
            Self::ProfileEmail { email } => write!(f, "spec.profile.email={email}"),
        }
    }
}

/// Reference to a catalog entity, rendered as `kind:namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl EntityRef {
    #[must_use]
    pub fn new(kind: &str, namespace: &str, name: &str) -> Self {
        Self {
            kind: kind.to_ascii_lowercase(),
            namespace: namespace.to_ascii_lowercase(),
            name: name.to_owned(),
        }
    }

    /// `user:default/<name>`.
    #[must_use]
    pub fn user(name: &str) -> Self {
        Self::new(DEFAULT_ENTITY_KIND, DEFAULT_NAMESPACE, name)
    }

    /// Parse `[kind:][namespace/]name`, filling the missing parts from the defaults.
    #[must_use]
    pub fn parse_with_defaults(raw: &str, default_kind: &str, default_namespace: &str) -> Self {
        let (kind, rest) = match raw.split_once(':') {
            Some((kind, rest)) if !kind.is_empty() && !kind.contains('/') => (kind, rest),
            _ => (default_kind, raw),
        };
        let (namespace, name) = match rest.split_once('/') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => (ns, name),
            _ => (default_namespace, rest),
        };
        Self::new(kind, namespace, name)
    }

    /// Parse a user reference; bare names land in `user:default/`.
    #[must_use]
    pub fn parse_user_ref(raw: &str) -> Self {
        Self::parse_with_defaults(raw, DEFAULT_ENTITY_KIND, DEFAULT_NAMESPACE)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.kind, self.namespace, self.name)
    }
}

/// A canonical identity record as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntity {
    pub entity_ref: EntityRef,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub profile_email: Option<String>,
    /// Groups the entity is a member of.
    #[serde(default)]
    pub member_of: Vec<EntityRef>,
}

impl CatalogEntity {
    #[must_use]
    pub fn new(entity_ref: EntityRef) -> Self {
        Self {
            entity_ref,
            annotations: BTreeMap::new(),
            profile_email: None,
            member_of: Vec::new(),
        }
    }

    /// Whether this entity satisfies `query`.
    #[must_use]
    pub fn matches(&self, query: &CatalogQuery) -> bool {
        match query {
            CatalogQuery::EntityName { name } => self.entity_ref.name == *name,
            CatalogQuery::Annotation { key, value } => {
                self.annotations.get(key).is_some_and(|v| v == value)
            }
            CatalogQuery::ProfileEmail { email } => {
                self.profile_email.as_deref() == Some(email.as_str())
            }
        }
    }
}

/// Outcome of binding: a real catalog entity, or an explicitly unverified fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalIdentityRef {
    /// Resolved against an entity that exists in the catalog.
    Catalog(CatalogEntity),
    /// Synthesized without a catalog match. Only produced when the resolver was
    /// configured to allow sign-in without a catalog user.
    Unverified {
        entity_ref: EntityRef,
        raw_subject: String,
    },
}

impl CanonicalIdentityRef {
    #[must_use]
    pub fn entity_ref(&self) -> &EntityRef {
        match self {
            Self::Catalog(entity) => &entity.entity_ref,
            Self::Unverified { entity_ref, .. } => entity_ref,
        }
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Catalog(_))
    }
}

/// Session identity produced for a successful sign-in.
///
/// The session token is wrapped in `SecretString` so `Debug` redacts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionIdentity {
    user_entity_ref: EntityRef,
    #[serde(default)]
    ownership_entity_refs: Vec<EntityRef>,
    /// `false` for fallback identities that were not matched in the catalog.
    verified: bool,
    #[serde(skip)]
    token: Option<SecretString>,
}

impl SessionIdentity {
    #[must_use]
    pub fn builder(user_entity_ref: EntityRef) -> SessionIdentityBuilder {
        SessionIdentityBuilder {
            user_entity_ref,
            ownership_entity_refs: Vec::new(),
            verified: false,
            token: None,
        }
    }

    #[must_use]
    pub fn user_entity_ref(&self) -> &EntityRef {
        &self.user_entity_ref
    }

    #[must_use]
    pub fn ownership_entity_refs(&self) -> &[EntityRef] {
        &self.ownership_entity_refs
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

pub struct SessionIdentityBuilder {
    user_entity_ref: EntityRef,
    ownership_entity_refs: Vec<EntityRef>,
    verified: bool,
    token: Option<SecretString>,
}

impl SessionIdentityBuilder {
    #[must_use]
    pub fn ownership_entity_refs(mut self, refs: Vec<EntityRef>) -> Self {
        self.ownership_entity_refs = refs;
        self
    }

    #[must_use]
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<SecretString>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn build(self) -> SessionIdentity {
        SessionIdentity {
            user_entity_ref: self.user_entity_ref,
            ownership_entity_refs: self.ownership_entity_refs,
            verified: self.verified,
            token: self.token,
        }
    }
}
