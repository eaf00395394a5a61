//! Identity Resolver SDK
//!
//! This crate provides the public API for the `identity_resolver` module:
//!
//! - [`IdentityResolverClient`] - Public API trait for the transport layer
//! - [`CatalogClient`] - Catalog collaborator trait (entity lookup, session issuance)
//! - [`SignedTokenDecoder`] - Compact signed-token claim decoder
//! - [`AuthenticationResult`] - Upstream authentication result model
//! - [`SessionIdentity`] - Canonical session identity handed to session issuance
//! - [`IdentityResolverError`] / [`CatalogError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use identity_resolver_sdk::{AuthenticationResult, IdentityResolverClient, ProviderId};
//!
//! let session = resolver
//!     .resolve_identity(&ProviderId::new("oidc"), &result)
//!     .await?;
//! println!("signed in as {}", session.user_entity_ref());
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;

// Re-export main types at crate root
pub use api::IdentityResolverClient;
pub use error::{CatalogError, IdentityResolverError, TokenDecodeError};
pub use models::{
    AuthenticationResult, CanonicalIdentityRef, CatalogEntity, CatalogQuery, EntityRef,
    OAuthResult, ProviderId, ProxyResult, ResultFlavor, SessionIdentity,
};
pub use plugin_api::{CatalogClient, SignedTokenDecoder};
