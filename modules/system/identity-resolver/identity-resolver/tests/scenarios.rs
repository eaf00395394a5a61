mod common;

use identity_resolver::IdentityResolver;
use identity_resolver::domain::DomainError;
use identity_resolver_sdk::{
    AuthenticationResult, CatalogQuery, EntityRef, IdentityResolverError, ProviderId, ProxyResult,
};
use serde_json::json;

use common::{CATALOG, RecordingCatalog, client, id_token, oauth, resolver_config, static_catalog};

const OIDC: &str = "
providers:
  oidc: {}
";

#[tokio::test]
async fn oidc_sub_matching_keycloak_annotation_binds_entity() {
    let resolver = client(OIDC, static_catalog(CATALOG));
    let token = id_token(&json!({ "sub": "u123" }));

    let session = resolver
        .resolve_identity(
            &ProviderId::new("oidc"),
            &oauth(&json!({ "sub": "u123" }), Some(&token)),
        )
        .await
        .unwrap();

    assert_eq!(session.user_entity_ref(), &EntityRef::user("alice"));
    assert!(session.is_verified());
    assert_eq!(
        session.ownership_entity_refs(),
        &[
            EntityRef::user("alice"),
            EntityRef::new("group", "default", "devs"),
        ]
    );
    assert!(session.token().is_some());
}

#[tokio::test]
async fn oidc_sub_mismatch_is_cross_validation_error() {
    let resolver = client(OIDC, static_catalog(CATALOG));
    let token = id_token(&json!({ "sub": "u999" }));

    let err = resolver
        .resolve_identity(
            &ProviderId::new("oidc"),
            &oauth(&json!({ "sub": "u123" }), Some(&token)),
        )
        .await
        .unwrap_err();

    match err {
        IdentityResolverError::CrossValidation(msg) => {
            assert!(msg.contains("Keycloak"));
            assert!(msg.contains("'sub'"));
        }
        other => panic!("Expected CrossValidation, got: {other:?}"),
    }
}

#[tokio::test]
async fn oauth2_proxy_preferred_username_header_binds_entity() {
    let resolver = client(
        "
providers:
  oauth2Proxy: {}
",
        static_catalog(CATALOG),
    );
    let result = AuthenticationResult::Proxy(
        ProxyResult::new().with_header("X-Forwarded-Preferred-Username", "alice"),
    );

    let session = resolver
        .resolve_identity(&ProviderId::new("oauth2Proxy"), &result)
        .await
        .unwrap();
    assert_eq!(session.user_entity_ref(), &EntityRef::user("alice"));
}

#[tokio::test]
async fn annotation_not_found_falls_through_to_name_match() {
    let catalog = RecordingCatalog::new(static_catalog(CATALOG));
    let resolver = client(
        "
providers:
  oidc:
    development:
      sign_in:
        resolvers:
          - resolver: oidcLdapUuidMatchingAnnotation
          - resolver: preferredUsernameMatchingUserEntityName
",
        catalog.clone(),
    );
    let token = id_token(&json!({ "sub": "u456", "ldap_uuid": "9b2e" }));
    let profile = json!({ "sub": "u456", "ldap_uuid": "9b2e", "preferred_username": "bob" });

    let session = resolver
        .resolve_identity(&ProviderId::new("oidc"), &oauth(&profile, Some(&token)))
        .await
        .unwrap();

    assert_eq!(session.user_entity_ref(), &EntityRef::user("bob"));
    assert_eq!(
        catalog.queries(),
        vec![
            CatalogQuery::Annotation {
                key: "backstage.io/ldap-uuid".to_owned(),
                value: "9b2e".to_owned(),
            },
            CatalogQuery::EntityName {
                name: "bob".to_owned(),
            },
        ]
    );
}

#[test]
fn unknown_provider_fails_before_serving_requests() {
    let cfg = resolver_config(
        "
providers:
  github: {}
  unknown-provider: {}
",
    );
    let module = IdentityResolver::default();

    let err = match module.init(&cfg, static_catalog(CATALOG)) {
        Ok(_) => panic!("init must fail for an unknown provider"),
        Err(err) => err,
    };
    match err.downcast_ref::<DomainError>() {
        Some(domain @ DomainError::UnknownProvider { provider_id }) => {
            assert_eq!(provider_id, "unknown-provider");
            assert!(domain.is_configuration());
            assert_eq!(
                domain.to_string(),
                "no auth provider found for `unknown-provider`"
            );
        }
        other => panic!("Expected UnknownProvider, got: {other:?}"),
    }
    assert!(module.service().is_none());
}
