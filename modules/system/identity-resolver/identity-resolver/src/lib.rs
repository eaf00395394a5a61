//! Identity Resolver Module
//!
//! Maps a successfully authenticated upstream principal (`OAuth2`/OIDC result or
//! proxy-asserted headers) to a canonical catalog identity, or rejects the
//! sign-in.
//!
//! Per-provider resolver chains are built once at startup from configuration
//! and are read-only afterwards. Provides the `IdentityResolverClient` trait
//! implementation for consumption by the transport layer.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use module::IdentityResolver;
