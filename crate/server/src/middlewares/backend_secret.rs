use std::{
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::{BoxBody, EitherBody},
    dev::{ServiceRequest, ServiceResponse},
};
use futures::{
    Future,
    future::{Ready, ok},
};
use tracing::{debug, error};

use super::bearer_token;
use crate::error::HashaError;

/// Admit only callers presenting `Authorization: Bearer <backend secret>`.
///
/// Used on the routes called by the trusted backend (the Cognito post-confirmation hook).
#[derive(Clone)]
pub(crate) struct BackendSecretAuth {
    secret: Arc<str>,
}

impl BackendSecretAuth {
    pub(crate) fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BackendSecretAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Transform = BackendSecretAuthMiddleware<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(BackendSecretAuthMiddleware {
            service: Rc::new(service),
            secret: self.secret.clone(),
        })
    }
}

pub(crate) struct BackendSecretAuthMiddleware<S> {
    service: Rc<S>,
    secret: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for BackendSecretAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Error = Error;
    #[allow(clippy::type_complexity)]
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;

    fn poll_ready(&self, ctx: &mut Context) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let admitted = match bearer_token(&req) {
            Ok(token) => token == *self.secret,
            Err(_) => false,
        };
        if !admitted {
            error!(
                "{} {} 401 unauthorized: missing or wrong backend secret",
                req.method(),
                req.path()
            );
            let err = HashaError::Unauthorized("missing or wrong backend secret".to_owned());
            return Box::pin(async move { Ok(req.error_response(err).map_into_right_body()) });
        }

        debug!("backend secret accepted on {}", req.path());
        let service = self.service.clone();
        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
