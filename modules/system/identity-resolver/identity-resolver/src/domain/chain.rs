//! Ordered resolver chains.

use std::fmt;
use std::sync::Arc;

use identity_resolver_sdk::{AuthenticationResult, ProviderId};
use tracing::debug;

use super::error::DomainError;
use super::resolver::{ResolveContext, ResolverOutcome, SignInResolver};

/// Resolvers tried in declared order.
///
/// The first `Bound` wins and later resolvers are never consulted. `Fatal`
/// stops the chain. Only `NotFound` moves on to the next resolver.
#[derive(Clone)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn SignInResolver>>,
}

impl ResolverChain {
    #[must_use]
    pub fn new(resolvers: Vec<Arc<dyn SignInResolver>>) -> Self {
        Self { resolvers }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Run the chain. Never returns `NotFound`: exhaustion becomes
    /// `Fatal(ChainExhausted)`.
    pub async fn resolve(
        &self,
        provider_id: &ProviderId,
        result: &AuthenticationResult,
        ctx: &ResolveContext<'_>,
    ) -> ResolverOutcome {
        for resolver in &self.resolvers {
            match resolver.resolve(result, ctx).await {
                ResolverOutcome::NotFound => {
                    debug!(
                        resolver = resolver.name(),
                        "Resolver found no catalog match, trying next"
                    );
                }
                outcome => return outcome,
            }
        }

        ResolverOutcome::Fatal(DomainError::ChainExhausted {
            provider_id: provider_id.to_string(),
        })
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use identity_resolver_sdk::{CanonicalIdentityRef, EntityRef};
    use serde_json::json;

    use super::*;
    use crate::domain::error::CHAIN_EXHAUSTED_MESSAGE;
    use crate::domain::test_support::{MemoryCatalog, lookup, oauth};
    use crate::domain::token::UnverifiedJwtDecoder;

    enum Scripted {
        NotFound,
        Bound(&'static str),
        Fatal,
    }

    struct ScriptedResolver {
        name: &'static str,
        script: Scripted,
        calls: AtomicUsize,
    }

    impl ScriptedResolver {
        fn new(name: &'static str, script: Scripted) -> Arc<Self> {
            Arc::new(Self {
                name,
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SignInResolver for ScriptedResolver {
        fn name(&self) -> &str {
            self.name
        }

        async fn resolve(
            &self,
            _result: &AuthenticationResult,
            _ctx: &ResolveContext<'_>,
        ) -> ResolverOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Scripted::NotFound => ResolverOutcome::NotFound,
                Scripted::Bound(name) => ResolverOutcome::Bound(CanonicalIdentityRef::Unverified {
                    entity_ref: EntityRef::user(name),
                    raw_subject: name.to_owned(),
                }),
                Scripted::Fatal => ResolverOutcome::Fatal(DomainError::MissingClaim {
                    provider: "Test".to_owned(),
                    resolver: self.name.to_owned(),
                    claim: "sub".to_owned(),
                }),
            }
        }
    }

    fn chain_of(resolvers: &[&Arc<ScriptedResolver>]) -> ResolverChain {
        ResolverChain::new(
            resolvers
                .iter()
                .map(|r| Arc::clone(r) as Arc<dyn SignInResolver>)
                .collect(),
        )
    }

    async fn run(chain: &ResolverChain) -> ResolverOutcome {
        let lookup = lookup(MemoryCatalog::new());
        let ctx = ResolveContext {
            catalog: &lookup,
            decoder: &UnverifiedJwtDecoder,
        };
        chain
            .resolve(&ProviderId::new("oidc"), &oauth(&json!({})), &ctx)
            .await
    }

    #[tokio::test]
    async fn first_bound_short_circuits() {
        let first = ScriptedResolver::new("first", Scripted::NotFound);
        let second = ScriptedResolver::new("second", Scripted::Bound("bob"));
        let third = ScriptedResolver::new("third", Scripted::Bound("carol"));
        let chain = chain_of(&[&first, &second, &third]);

        match run(&chain).await {
            ResolverOutcome::Bound(identity) => {
                assert_eq!(identity.entity_ref(), &EntityRef::user("bob"));
            }
            other => panic!("Expected Bound, got: {other:?}"),
        }
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 0);
    }

    #[tokio::test]
    async fn fatal_stops_the_chain() {
        let first = ScriptedResolver::new("first", Scripted::Fatal);
        let second = ScriptedResolver::new("second", Scripted::Bound("bob"));
        let chain = chain_of(&[&first, &second]);

        assert!(matches!(
            run(&chain).await,
            ResolverOutcome::Fatal(DomainError::MissingClaim { .. })
        ));
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn exhaustion_reports_standard_message() {
        let first = ScriptedResolver::new("first", Scripted::NotFound);
        let second = ScriptedResolver::new("second", Scripted::NotFound);
        let chain = chain_of(&[&first, &second]);

        match run(&chain).await {
            ResolverOutcome::Fatal(err @ DomainError::ChainExhausted { .. }) => {
                assert_eq!(err.to_string(), CHAIN_EXHAUSTED_MESSAGE);
            }
            other => panic!("Expected ChainExhausted, got: {other:?}"),
        }
    }

    #[test]
    fn debug_lists_resolver_names() {
        let first = ScriptedResolver::new("first", Scripted::NotFound);
        let second = ScriptedResolver::new("second", Scripted::NotFound);
        let chain = chain_of(&[&first, &second]);
        assert_eq!(chain.names(), vec!["first", "second"]);
        assert!(format!("{chain:?}").contains("second"));
    }
}
