//! Claim decoding for compact signed tokens.
//!
//! Signatures are NOT verified here. The ID token was obtained and verified
//! during the upstream token exchange; this decoder only reads its claims so
//! they can be compared with the separately fetched profile.

use identity_resolver_sdk::{SignedTokenDecoder, TokenDecodeError};
use jsonwebtoken::dangerous::insecure_decode;
use serde_json::{Map, Value};

/// Reads JWT claims without signature or expiry checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnverifiedJwtDecoder;

impl SignedTokenDecoder for UnverifiedJwtDecoder {
    fn decode_claims(&self, raw: &str) -> Result<Map<String, Value>, TokenDecodeError> {
        insecure_decode::<Map<String, Value>>(raw)
            .map(|data| data.claims)
            .map_err(|e| TokenDecodeError(e.to_string()))
    }
}
