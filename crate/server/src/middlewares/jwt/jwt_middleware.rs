//! actix-web glue for [`JwtAuth`].
//!
//! [`JwtAuth`] is the factory registered with `.wrap()` on a scope. For each worker, actix
//! asks it for a [`JwtAuthMiddleware`] wrapping the scope's services; that middleware runs
//! the bearer check in front of every request.

use std::{
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::{BoxBody, EitherBody},
    dev::{ServiceRequest, ServiceResponse},
};
use futures::{
    Future,
    future::{Ready, ok},
};
use hasha_auth::TokenVerifier;

use super::jwt_token_auth::handle_jwt;

/// Reject requests that do not carry a valid Cognito ID token.
///
/// On success the wrapped service finds an
/// [`AuthenticatedUser`](crate::middlewares::AuthenticatedUser) in the request extensions.
/// On failure it is never called and the client receives a 401 with a generic body.
#[derive(Clone)]
pub(crate) struct JwtAuth {
    verifier: Arc<TokenVerifier>,
}

impl JwtAuth {
    #[must_use]
    pub(crate) const fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

/// Builds the middleware around the next service of the chain.
///
/// The response body is either the wrapped service's own (`B`) or the boxed JSON body of a
/// rejection.
impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Transform = JwtAuthMiddleware<S>;

    /// Wrap `service`. Every middleware instance shares the same verifier.
    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        })
    }
}

/// The per-worker middleware produced by [`JwtAuth`].
pub(crate) struct JwtAuthMiddleware<S> {
    // `Rc` so that the service can be moved into the future returned by `call`
    service: Rc<S>,
    verifier: Arc<TokenVerifier>,
}

/// Authenticates each request, then hands it to the wrapped service.
impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Error = Error;
    #[allow(clippy::type_complexity)]
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;

    /// Ready whenever the wrapped service is.
    fn poll_ready(&self, ctx: &mut Context) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    /// Verify the bearer token of `req`.
    ///
    /// A verified caller is stored as an
    /// [`AuthenticatedUser`](crate::middlewares::AuthenticatedUser) request extension before the
    /// wrapped service runs. Otherwise the wrapped service is skipped and the rejection is
    /// rendered by [`HashaError`](crate::error::HashaError)'s `ResponseError` implementation.
    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verifier = self.verifier.clone();
        Box::pin(async move {
            match handle_jwt(&verifier, &req).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => Ok(req.error_response(e).map_into_right_body()),
            }
        })
    }
}
