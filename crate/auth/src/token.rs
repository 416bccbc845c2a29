//! Splitting of a compact JWS, before any verification.

use serde::Deserialize;

use crate::{auth_ensure, base64url, error::AuthError, result::AuthResult};

/// The JOSE header of a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct JwtTokenHeaders {
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// A token cut into its three parts. Nothing in it can be trusted yet.
#[derive(Debug)]
pub(crate) struct UnverifiedToken<'a> {
    pub header: JwtTokenHeaders,
    /// `base64url(header) "." base64url(payload)`, the bytes covered by the signature
    pub signing_input: &'a str,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl<'a> UnverifiedToken<'a> {
    pub(crate) fn parse(token: &'a str) -> AuthResult<Self> {
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| AuthError::MalformedToken("expected 3 parts".to_owned()))?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or_else(|| AuthError::MalformedToken("expected 3 parts".to_owned()))?;
        auth_ensure!(
            !payload.contains('.'),
            AuthError::MalformedToken("expected 3 parts".to_owned())
        );
        let header = serde_json::from_slice::<JwtTokenHeaders>(&base64url::decode(header)?)
            .map_err(|e| AuthError::MalformedToken(format!("invalid header: {e}")))?;
        Ok(Self {
            header,
            signing_input,
            payload: base64url::decode(payload)?,
            signature: base64url::decode(signature)?,
        })
    }
}
