//! Request guards of the HTTP API.
//!
//! [`JwtAuth`] turns a Cognito ID token into an [`AuthenticatedUser`] stored in the
//! request extensions, [`BackendSecretAuth`] admits the trusted backend caller and
//! [`LogAllRequests`] writes one line per request.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, http::header};
use futures::future::{Ready, ready};
use hasha_auth::{AuthError, AuthResult, TokenClaims};

use crate::error::HashaError;

mod backend_secret;
pub(crate) use backend_secret::BackendSecretAuth;

mod jwt;
pub(crate) use jwt::JwtAuth;

mod log_requests;
pub(crate) use log_requests::LogAllRequests;

/// The caller of a JWT protected route.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The verified claims of the ID token
    pub claims: TokenClaims,
    /// The raw bearer token, forwarded to the store as the caller's credentials
    pub token: String,
}

impl AuthenticatedUser {
    /// The Cognito `sub` of the caller.
    ///
    /// # Errors
    ///
    /// Fails when the token carried no subject.
    pub fn subject(&self) -> Result<&str, HashaError> {
        self.claims
            .subject()
            .ok_or_else(|| HashaError::Unauthorized("the ID token has no subject".to_owned()))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = HashaError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Self>()
                .cloned()
                .ok_or_else(|| HashaError::Unauthorized("no authenticated user".to_owned())),
        )
    }
}

/// The token of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched literally, any other shape is rejected.
pub(crate) fn bearer_token(req: &impl HttpMessage) -> AuthResult<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .ok_or(AuthError::MissingOrMalformedHeader)
}
