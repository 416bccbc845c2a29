use std::{
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
    time::Instant,
};

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures::{
    Future,
    future::{Ready, ok},
};
use tracing::{info, warn};

/// One log line per request: method, peer, path, status and elapsed time.
#[derive(Clone)]
pub(crate) struct LogAllRequests;

impl<S, B> Transform<S, ServiceRequest> for LogAllRequests
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = LogAllRequestsMiddleware<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(LogAllRequestsMiddleware {
            service: Rc::new(service),
        })
    }
}

pub(crate) struct LogAllRequestsMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LogAllRequestsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().clone();
        let path = req.path().to_owned();
        let peer = req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_owned)
            .unwrap_or_default();
        let service = self.service.clone();
        let started = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = started.elapsed();
            match &res {
                Ok(res) => info!("[{method}] {peer} {path} => {} in {elapsed:?}", res.status()),
                Err(err) => warn!("[{method}] {peer} {path} => internal error in {elapsed:?}: {err}"),
            }
            res
        })
    }
}
