//! Domain layer for the identity resolver.

pub mod binder;
pub mod catalog;
pub mod chain;
pub mod claims;
pub mod cross_validation;
pub mod error;
pub mod factories;
pub mod local_client;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod token;

#[cfg(test)]
mod test_support;

pub use catalog::CatalogLookup;
pub use chain::ResolverChain;
pub use error::DomainError;
pub use local_client::IdentityResolverLocalClient;
pub use registry::{AuthenticatorKind, ProviderRegistration, ProviderRegistry};
pub use resolver::{ResolveContext, ResolverOutcome, SignInResolver};
pub use service::Service;
pub use token::UnverifiedJwtDecoder;
