use actix_web::dev::ServiceRequest;
use hasha_auth::TokenVerifier;
use tracing::{debug, trace};

use crate::{
    error::HashaError,
    middlewares::{AuthenticatedUser, bearer_token},
    result::HResult,
};

/// Authenticate the caller of `req` from its bearer token.
///
/// The verifier is not consulted when the `Authorization` header is missing or is not
/// a `Bearer` one.
pub(super) async fn handle_jwt(
    verifier: &TokenVerifier,
    req: &ServiceRequest,
) -> HResult<AuthenticatedUser> {
    trace!("JWT authentication of {} {}", req.method(), req.path());

    let token = bearer_token(req).map_err(|e| {
        debug!("{} {}: {e}", req.method(), req.path());
        HashaError::from(e)
    })?;

    match verifier.verify(&token).await {
        Ok(claims) => {
            debug!(
                "authenticated subject {:?} on {} {}",
                claims.subject(),
                req.method(),
                req.path()
            );
            Ok(AuthenticatedUser { claims, token })
        }
        Err(e) => {
            debug!(
                "{} {} 401 unauthorized: {} ({})",
                req.method(),
                req.path(),
                e.reason(),
                e.cause()
            );
            Err(e.into())
        }
    }
}
