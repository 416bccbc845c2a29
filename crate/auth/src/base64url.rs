//! URL-safe base64 as used by JOSE.
//!
//! JWS and JWK values are emitted without padding. The decoder strips any padding the
//! input may carry, then re-pads to a multiple of 4 characters before decoding with the
//! padded URL-safe engine, so both forms are accepted.

use base64::{
    Engine,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};

use crate::{error::AuthError, result::AuthResult};

/// Encode bytes as unpadded base64url.
#[must_use]
pub fn encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode base64url text, padded or not.
pub fn decode(data: &str) -> AuthResult<Vec<u8>> {
    let unpadded = data.trim_end_matches('=');
    // a single trailing sextet can never encode a whole byte
    if unpadded.len() % 4 == 1 {
        return Err(AuthError::MalformedToken(format!(
            "invalid base64url length: {}",
            unpadded.len()
        )));
    }
    let mut padded = String::with_capacity(unpadded.len() + 3);
    padded.push_str(unpadded);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    Ok(URL_SAFE.decode(padded)?)
}
