//! Service implementation for the static catalog plugin.

use identity_resolver_sdk::{
    CanonicalIdentityRef, CatalogEntity, CatalogError, CatalogQuery, EntityRef, SessionIdentity,
};
use uuid::Uuid;

use crate::config::{StaticCatalogPluginConfig, UserConfig};

const GROUP_KIND: &str = "group";

/// Static catalog service.
///
/// Entities are fixed at construction; lookups never mutate state.
pub struct Service {
    entities: Vec<CatalogEntity>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticCatalogPluginConfig) -> Self {
        Self {
            entities: cfg.users.iter().map(build_entity).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Find the single entity matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Ambiguous` if more than one entity matches.
    pub fn find(&self, query: &CatalogQuery) -> Result<Option<CatalogEntity>, CatalogError> {
        let matches: Vec<&CatalogEntity> =
            self.entities.iter().filter(|e| e.matches(query)).collect();
        match matches.as_slice() {
            [] => Ok(None),
            [entity] => Ok(Some((*entity).clone())),
            many => Err(CatalogError::Ambiguous {
                query: query.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Build the session for a bound identity.
    ///
    /// Ownership covers the user itself plus every group it is a member of.
    /// Fallback identities own only themselves.
    #[must_use]
    pub fn session(identity: &CanonicalIdentityRef) -> SessionIdentity {
        let user_ref = identity.entity_ref().clone();
        let mut ownership = vec![user_ref.clone()];
        if let CanonicalIdentityRef::Catalog(entity) = identity {
            ownership.extend(entity.member_of.iter().cloned());
        }

        SessionIdentity::builder(user_ref)
            .ownership_entity_refs(ownership)
            .verified(identity.is_verified())
            .token(Uuid::new_v4().simple().to_string())
            .build()
    }
}

fn build_entity(user: &UserConfig) -> CatalogEntity {
    let mut entity = CatalogEntity::new(EntityRef::new(
        identity_resolver_sdk::models::DEFAULT_ENTITY_KIND,
        &user.namespace,
        &user.name,
    ));
    entity.annotations.clone_from(&user.annotations);
    entity.profile_email.clone_from(&user.email);
    entity.member_of = user
        .member_of
        .iter()
        .map(|group| EntityRef::parse_with_defaults(group, GROUP_KIND, &user.namespace))
        .collect();
    entity
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::BTreeMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn user(name: &str) -> UserConfig {
        UserConfig {
            name: name.to_owned(),
            namespace: "default".to_owned(),
            annotations: BTreeMap::new(),
            email: None,
            member_of: Vec::new(),
        }
    }

    fn config(users: Vec<UserConfig>) -> StaticCatalogPluginConfig {
        StaticCatalogPluginConfig { users }
    }

    #[test]
    fn finds_user_by_name() {
        let service = Service::from_config(&config(vec![user("alice"), user("bob")]));

        let found = service
            .find(&CatalogQuery::EntityName {
                name: "bob".to_owned(),
            })
            .unwrap()
            .unwrap();
        assert_eq!(found.entity_ref, EntityRef::user("bob"));
    }

    #[test]
    fn no_match_is_none() {
        let service = Service::from_config(&config(vec![user("alice")]));
        let found = service
            .find(&CatalogQuery::EntityName {
                name: "mallory".to_owned(),
            })
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn duplicate_matches_are_ambiguous() {
        let mut a = user("alice");
        a.email = Some("shared@example.com".to_owned());
        let mut b = user("bob");
        b.email = Some("shared@example.com".to_owned());
        let service = Service::from_config(&config(vec![a, b]));

        let err = service
            .find(&CatalogQuery::ProfileEmail {
                email: "shared@example.com".to_owned(),
            })
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::Ambiguous {
                query: "spec.profile.email=shared@example.com".to_owned(),
                count: 2,
            }
        );
    }

    #[test]
    fn groups_resolve_relative_to_user_namespace() {
        let mut alice = user("alice");
        alice.namespace = "team-a".to_owned();
        alice.member_of = vec!["devs".to_owned(), "group:platform/admins".to_owned()];
        let service = Service::from_config(&config(vec![alice]));

        let entity = service
            .find(&CatalogQuery::EntityName {
                name: "alice".to_owned(),
            })
            .unwrap()
            .unwrap();
        let groups: Vec<String> = entity.member_of.iter().map(ToString::to_string).collect();
        assert_eq!(groups, vec!["group:team-a/devs", "group:platform/admins"]);
    }

    #[test]
    fn session_includes_group_ownership() {
        let mut alice = user("alice");
        alice.member_of = vec!["devs".to_owned()];
        let service = Service::from_config(&config(vec![alice]));
        let entity = service
            .find(&CatalogQuery::EntityName {
                name: "alice".to_owned(),
            })
            .unwrap()
            .unwrap();

        let session = Service::session(&CanonicalIdentityRef::Catalog(entity));
        assert!(session.is_verified());
        assert_eq!(
            session.ownership_entity_refs(),
            &[
                EntityRef::user("alice"),
                EntityRef::new("group", "default", "devs")
            ]
        );
        let token = session.token().map(ExposeSecret::expose_secret).unwrap();
        assert_eq!(token.len(), 32);
    }

    #[test]
    fn fallback_session_is_unverified_and_owns_only_itself() {
        let session = Service::session(&CanonicalIdentityRef::Unverified {
            entity_ref: EntityRef::user("ghost"),
            raw_subject: "ghost".to_owned(),
        });
        assert!(!session.is_verified());
        assert_eq!(session.ownership_entity_refs(), &[EntityRef::user("ghost")]);
    }

    #[test]
    fn session_tokens_are_unique() {
        let identity = CanonicalIdentityRef::Unverified {
            entity_ref: EntityRef::user("ghost"),
            raw_subject: "ghost".to_owned(),
        };
        let a = Service::session(&identity);
        let b = Service::session(&identity);
        assert_ne!(
            a.token().map(ExposeSecret::expose_secret),
            b.token().map(ExposeSecret::expose_secret)
        );
    }
}
