//! Claim extraction from upstream authentication results.
//!
//! Extraction never fails: anything missing surfaces as `None` and the
//! resolver decides whether that is fatal.

use identity_resolver_sdk::AuthenticationResult;
use secrecy::SecretString;
use serde_json::Value;

/// First well-known header consulted for proxy-asserted users.
pub const FORWARDED_PREFERRED_USERNAME: &str = "x-forwarded-preferred-username";

/// Second well-known header consulted for proxy-asserted users.
pub const FORWARDED_USER: &str = "x-forwarded-user";

/// Which value a resolver needs from the upstream result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimSpec {
    /// The primary subject claim (`sub`).
    Subject,
    /// A named profile claim such as `preferred_username`, `email` or `ldap_uuid`.
    Profile(String),
    /// A forwarded header set by a trusted proxy.
    Header(HeaderLookup),
}

impl ClaimSpec {
    #[must_use]
    pub fn profile(key: &str) -> Self {
        Self::Profile(key.to_owned())
    }

    /// Claim name as reported in error messages and logs.
    #[must_use]
    pub fn claim_name(&self) -> String {
        match self {
            Self::Subject => "sub".to_owned(),
            Self::Profile(key) => key.clone(),
            Self::Header(lookup) => lookup.candidates().join(" | "),
        }
    }
}

/// Forwarded-header lookup order.
///
/// An operator override replaces the well-known names entirely; otherwise the
/// well-known names are tried in order and the first non-empty value wins. A
/// blank override (`OAUTH_USER_HEADER=`) counts as unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLookup {
    pub override_header: Option<String>,
    pub well_known: Vec<String>,
}

impl HeaderLookup {
    /// `override_header`, else `x-forwarded-preferred-username` then `x-forwarded-user`.
    #[must_use]
    pub fn user_headers(override_header: Option<String>) -> Self {
        Self {
            override_header: override_header.filter(|name| !name.trim().is_empty()),
            well_known: vec![
                FORWARDED_PREFERRED_USERNAME.to_owned(),
                FORWARDED_USER.to_owned(),
            ],
        }
    }

    #[must_use]
    pub fn single(name: &str) -> Self {
        Self {
            override_header: None,
            well_known: vec![name.to_owned()],
        }
    }

    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        match &self.override_header {
            Some(name) => vec![name.clone()],
            None => self.well_known.clone(),
        }
    }
}

/// Flat view of the values a resolver works with.
#[derive(Debug, Clone, Default)]
pub struct ExtractedClaims {
    /// The requested claim value.
    pub value: Option<String>,
    /// The raw signed token, when the result carries one.
    pub signed_token: Option<SecretString>,
}

/// Pull the value described by `spec` out of `result`.
#[must_use]
pub fn extract(result: &AuthenticationResult, spec: &ClaimSpec) -> ExtractedClaims {
    let value = match spec {
        ClaimSpec::Subject => result.subject().map(str::to_owned),
        ClaimSpec::Profile(key) => result.profile_claims().get(key).and_then(claim_text),
        ClaimSpec::Header(lookup) => lookup
            .candidates()
            .iter()
            .find_map(|name| result.header(name).filter(|v| !v.is_empty()))
            .map(str::to_owned),
    };

    ExtractedClaims {
        value,
        signed_token: result.signed_token().cloned(),
    }
}

/// Non-empty strings as-is; numeric ids (GitHub, Bitbucket) in decimal form.
fn claim_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
