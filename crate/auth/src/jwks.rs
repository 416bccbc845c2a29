//! JSON Web Key Set model.
//!
//! A [`SigningKeySet`] is what the provider publishes at its well-known URL. Entries are
//! public keys only; anything else present in an entry is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::AuthError,
    events::{AuthEvent, AuthEvents},
    result::AuthResult,
};

/// One public signing key of the provider, as published in its JWKS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    pub kid: String,
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeySet {
    pub keys: Vec<SigningKey>,
}

impl SigningKeySet {
    #[must_use]
    pub const fn new(keys: Vec<SigningKey>) -> Self {
        Self { keys }
    }

    /// Linear scan for the key identifier `kid`.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Build a key set from a JWKS JSON document.
    ///
    /// The document must hold a `keys` array, otherwise this fails with
    /// [`AuthError::MalformedKeySet`]. Entries which cannot be read as a
    /// [`SigningKey`] are reported to `events` and skipped.
    pub fn from_json(document: &Value, events: &dyn AuthEvents) -> AuthResult<Self> {
        let Some(keys) = document.get("keys") else {
            return Err(AuthError::MalformedKeySet(
                "missing 'keys' field".to_owned(),
            ));
        };
        let Value::Array(entries) = keys else {
            return Err(AuthError::MalformedKeySet(
                "'keys' field is not an array".to_owned(),
            ));
        };
        let keys = entries
            .iter()
            .filter_map(
                |entry| match serde_json::from_value::<SigningKey>(entry.clone()) {
                    Ok(key) => Some(key),
                    Err(e) => {
                        events.record(AuthEvent::KeyEntrySkipped {
                            detail: format!("{e}: {entry}"),
                        });
                        None
                    }
                },
            )
            .collect();
        Ok(Self { keys })
    }
}
