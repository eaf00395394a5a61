#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Catalog Plugin
//!
//! In-memory [`identity_resolver_sdk::CatalogClient`] backed by a fixed list
//! of user entities from configuration. Intended for local development and
//! tests; it issues opaque random session tokens and has no persistence.
//!
//! ## Configuration
//!
//! ```yaml
//! users:
//!   - name: alice
//!     email: alice@example.com
//!     annotations:
//!       keycloak.org/id: "0b6c6f0e-6f2a-4d55-9a57-3a3c5f3c1f8e"
//!     member_of: ["team-a", "group:platform/admins"]
//!   - name: bob
//!     namespace: contractors
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use module::StaticCatalogPlugin;
