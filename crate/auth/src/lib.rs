//! Verification of AWS Cognito ID tokens.
//!
//! [`TokenVerifier`] checks a bearer token against the signing keys a Cognito user pool
//! publishes, then checks its claims. Keys come from a [`KeySetSource`]: the [`JwksFetcher`]
//! downloads them on every call, optionally behind a [`CachedKeySetSource`].

pub mod base64url;
mod cache;
mod claims;
mod error;
mod events;
mod jwks;
mod key_material;
mod key_source;
mod result;
mod token;
mod verifier;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use cache::{CachedKeySetSource, with_optional_cache};
pub use claims::{Audience, TokenClaims};
pub use error::{AuthError, ReasonCode, TokenValidationError};
pub use events::{AuthEvent, AuthEvents, SharedEvents, TracingEvents};
pub use jwks::{SigningKey, SigningKeySet};
pub use key_material::{PublicKeyMaterial, to_public_key};
pub use key_source::{CognitoPool, DEFAULT_FETCH_TIMEOUT, JwksFetcher, KeySetSource, find_by_key_id};
pub use result::AuthResult;
pub use verifier::TokenVerifier;
