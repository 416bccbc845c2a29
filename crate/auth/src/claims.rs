use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `aud` claim: a single client identifier or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// Read an `aud` value as found in a token. Anything other than a string or a list
    /// yields `None`; non-string members of a list are skipped.
    fn from_claim(value: &Value) -> Option<Self> {
        match value {
            Value::String(aud) => Some(Self::Single(aud.clone())),
            Value::Array(auds) => Some(Self::Multiple(
                auds.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            )),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, client_id: &str) -> bool {
        match self {
            Self::Single(aud) => aud == client_id,
            Self::Multiple(auds) => auds.iter().any(|aud| aud == client_id),
        }
    }
}

/// The payload of a verified Cognito ID token.
///
/// The payload is kept exactly as the provider wrote it. Well-known claims get typed
/// accessors which return `None` when the claim is absent or has an unexpected JSON type,
/// so a mistyped claim fails the check that reads it instead of the whole decoding.
/// Times are `NumericDate`s: seconds since the epoch, possibly fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenClaims {
    claims: Map<String, Value>,
}

impl TokenClaims {
    fn string(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    fn numeric_date(&self, name: &str) -> Option<f64> {
        self.claims.get(name).and_then(Value::as_f64)
    }

    /// The user identifier. Resources are owned by this value.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.string("sub")
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.string("iss")
    }

    #[must_use]
    pub fn audience(&self) -> Option<Audience> {
        self.claims.get("aud").and_then(Audience::from_claim)
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<f64> {
        self.numeric_date("exp")
    }

    #[must_use]
    pub fn not_before(&self) -> Option<f64> {
        self.numeric_date("nbf")
    }

    #[must_use]
    pub fn issued_at(&self) -> Option<f64> {
        self.numeric_date("iat")
    }

    #[must_use]
    pub fn token_use(&self) -> Option<&str> {
        self.string("token_use")
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.string("email")
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.string("cognito:username")
    }

    /// Any claim, by name, as raw JSON.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}
