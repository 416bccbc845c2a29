#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    net::{SocketAddr, TcpListener},
    sync::{Arc, Once},
    time::Duration,
};

use actix_cors::Cors;
use actix_http::Request;
use actix_web::{
    App, HttpResponse, HttpServer,
    body::MessageBody,
    dev::{Service, ServerHandle, ServiceResponse},
    http::StatusCode,
    test, web,
};
use hasha_auth::{
    CognitoPool, JwksFetcher, KeySetSource, SigningKeySet, TokenVerifier, TracingEvents,
    testutil::{
        StaticKeySetSource, TEST_CLIENT_ID, TEST_POOL_ID, TEST_REGION, TestKeyPair,
        mint_id_token,
    },
};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    middlewares::LogAllRequests,
    routes,
    start_server::{ApiServices, configure_api},
    store::MockResourceStore,
};

/// The `kid` under which the test key set publishes the first test key
pub(crate) const TEST_KID: &str = "hasha-test-key";

pub(crate) const BACKEND_SECRET: &str = "backend-s3cr3t";

static LOG_INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
pub(crate) fn log_init(rust_log: Option<&str>) {
    LOG_INIT.call_once(|| {
        let filter = EnvFilter::new(rust_log.unwrap_or("warn"));
        // another subscriber may already be installed
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer().compact())
            .try_init();
    });
}

/// The API, verifying tokens against the test key set and talking to `store`.
pub(crate) async fn test_app(
    store: MockResourceStore,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test_app_with_keys(Arc::new(StaticKeySetSource::with_first_key(TEST_KID)), store).await
}

pub(crate) async fn test_app_with_keys(
    keys: Arc<dyn KeySetSource>,
    store: MockResourceStore,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    log_init(option_env!("RUST_LOG"));

    let pool = CognitoPool::new(TEST_REGION, TEST_POOL_ID);
    let services = ApiServices {
        verifier: Arc::new(TokenVerifier::new(
            &pool,
            TEST_CLIENT_ID,
            keys,
            TracingEvents::shared("hasha_auth"),
        )),
        store: Arc::new(store),
        backend_secret: Arc::from(BACKEND_SECRET),
    };

    let app = App::new()
        .configure(|cfg| configure_api(cfg, &services))
        .default_service(web::to(routes::not_found))
        .wrap(LogAllRequests)
        .wrap(Cors::permissive());

    test::init_service(app).await
}

/// A real JWKS client for the pool served at `address`.
pub(crate) fn jwks_client(address: SocketAddr, timeout: Duration) -> Arc<dyn KeySetSource> {
    let pool =
        CognitoPool::new(TEST_REGION, TEST_POOL_ID).with_endpoint(&format!("http://{address}"));
    Arc::new(
        JwksFetcher::new(&pool, timeout, TracingEvents::shared("hasha_auth"))
            .expect("cannot build the JWKS client"),
    )
}

/// A real JWKS client pointed at a port nobody listens on.
pub(crate) fn unreachable_keys() -> Arc<dyn KeySetSource> {
    let address = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    jwks_client(address, Duration::from_millis(500))
}

/// Serve the test key set on a random local port, answering only after `delay`.
pub(crate) fn serve_slow_jwks(delay: Duration) -> (SocketAddr, ServerHandle) {
    let server = HttpServer::new(move || {
        App::new().route(
            &format!("/{TEST_POOL_ID}/.well-known/jwks.json"),
            web::get().to(move || async move {
                actix_web::rt::time::sleep(delay).await;
                HttpResponse::Ok().json(SigningKeySet::new(vec![
                    TestKeyPair::first().jwk(TEST_KID),
                ]))
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let address = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (address, handle)
}

/// A valid ID token of the test subject
pub(crate) fn id_token() -> String {
    mint_id_token(&TestKeyPair::first(), TEST_KID)
}

pub(crate) fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Call the app and read the response body as JSON (`Null` when empty).
pub(crate) async fn call_json<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    if body.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&body).expect("the body is not JSON"))
}
