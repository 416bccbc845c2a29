use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Every way the authentication pipeline can fail.
///
/// The `Display` messages are internal diagnostics: they are logged, never sent to a client.
/// See [`TokenValidationError`] for the opaque, externally visible wrapper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // Transport failure or timeout while fetching the JWKS
    #[error("Failed to fetch JWKS: {0}")]
    KeyFetch(String),

    // The JWKS response does not have the expected shape
    #[error("Invalid JWKS format: {0}")]
    MalformedKeySet(String),

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("JWK conversion failed: {0}")]
    InvalidKeyMaterial(String),

    // The token is not a compact JWS made of three base64url parts
    #[error("Invalid token: {0}")]
    MalformedToken(String),

    #[error("Token missing 'kid' in header")]
    MissingKeyId,

    #[error("Public key not found for kid: {0}")]
    KeyNotFound(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not yet valid")]
    NotYetValid,

    #[error("Invalid audience: expected {0}")]
    InvalidAudience(String),

    #[error("Invalid issuer: expected {0}")]
    InvalidIssuer(String),

    #[error("Invalid token_use: expected 'id', got '{0}'")]
    WrongTokenClass(String),

    #[error("Authorization header missing or invalid")]
    MissingOrMalformedHeader,
}

/// A fieldless mirror of [`AuthError`], suitable for log fields and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ReasonCode {
    KeyFetchError,
    MalformedKeySet,
    UnsupportedKeyType,
    InvalidKeyMaterial,
    MalformedToken,
    MissingKeyId,
    KeyNotFound,
    InvalidSignature,
    Expired,
    NotYetValid,
    InvalidAudience,
    InvalidIssuer,
    WrongTokenClass,
    MissingOrMalformedHeader,
}

impl AuthError {
    #[must_use]
    pub const fn reason(&self) -> ReasonCode {
        match self {
            Self::KeyFetch(_) => ReasonCode::KeyFetchError,
            Self::MalformedKeySet(_) => ReasonCode::MalformedKeySet,
            Self::UnsupportedKeyType(_) => ReasonCode::UnsupportedKeyType,
            Self::InvalidKeyMaterial(_) => ReasonCode::InvalidKeyMaterial,
            Self::MalformedToken(_) => ReasonCode::MalformedToken,
            Self::MissingKeyId => ReasonCode::MissingKeyId,
            Self::KeyNotFound(_) => ReasonCode::KeyNotFound,
            Self::InvalidSignature => ReasonCode::InvalidSignature,
            Self::Expired => ReasonCode::Expired,
            Self::NotYetValid => ReasonCode::NotYetValid,
            Self::InvalidAudience(_) => ReasonCode::InvalidAudience,
            Self::InvalidIssuer(_) => ReasonCode::InvalidIssuer,
            Self::WrongTokenClass(_) => ReasonCode::WrongTokenClass,
            Self::MissingOrMalformedHeader => ReasonCode::MissingOrMalformedHeader,
        }
    }
}

impl From<base64::DecodeError> for AuthError {
    fn from(e: base64::DecodeError) -> Self {
        Self::MalformedToken(e.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        Self::KeyFetch(format!("{e}: details: {e:?}"))
    }
}

/// The only error the token verifier lets out.
///
/// Its `Display` is always "authentication failed" and may be shown to a client as is.
/// The precise cause stays reachable through
/// [`TokenValidationError::reason`] and [`TokenValidationError::cause`] for internal logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("authentication failed")]
pub struct TokenValidationError(#[source] AuthError);

impl TokenValidationError {
    #[must_use]
    pub const fn reason(&self) -> ReasonCode {
        self.0.reason()
    }

    #[must_use]
    pub const fn cause(&self) -> &AuthError {
        &self.0
    }

    #[must_use]
    pub fn into_cause(self) -> AuthError {
        self.0
    }
}

impl From<AuthError> for TokenValidationError {
    fn from(e: AuthError) -> Self {
        Self(e)
    }
}

/// Return early with an error if a condition is not satisfied.
///
/// This macro is equivalent to `if !$cond { return Err(From::from($err)); }`.
#[macro_export]
macro_rules! auth_ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err(::core::convert::From::from($err));
        }
    };
}
