use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    web::{self, Data, JsonConfig},
};
use hasha_auth::{JwksFetcher, TokenVerifier, TracingEvents, with_optional_cache};
use tracing::{debug, info};

use crate::{
    config::ServerParams,
    error::HashaError,
    middlewares::{BackendSecretAuth, JwtAuth, LogAllRequests},
    result::{HResult, HResultHelper},
    routes::{self, recipes, users},
    store::{ResourceStore, SupabaseStore},
};

/// Largest JSON body accepted by the API
const MAX_JSON_PAYLOAD: usize = 1_000_000;

/// What the HTTP workers share.
#[derive(Clone)]
pub(crate) struct ApiServices {
    pub(crate) verifier: Arc<TokenVerifier>,
    pub(crate) store: Arc<dyn ResourceStore>,
    pub(crate) backend_secret: Arc<str>,
}

/// Register the routes of the API and their guards.
pub(crate) fn configure_api(cfg: &mut web::ServiceConfig, services: &ApiServices) {
    cfg.app_data(Data::from(services.store.clone()))
        .app_data(
            JsonConfig::default()
                .limit(MAX_JSON_PAYLOAD)
                .error_handler(|err, _req| HashaError::InvalidRequest(err.to_string()).into()),
        )
        .service(routes::root)
        .service(
            web::scope("/users")
                .service(
                    web::resource("/")
                        .route(web::get().to(users::list_users))
                        .wrap(JwtAuth::new(services.verifier.clone())),
                )
                .service(
                    web::resource("/create-user")
                        .route(web::post().to(users::create_user))
                        .wrap(BackendSecretAuth::new(&services.backend_secret)),
                ),
        )
        .service(
            web::scope("/recipes")
                .wrap(JwtAuth::new(services.verifier.clone()))
                .service(recipes::list_recipes)
                .service(recipes::create_recipe)
                .service(recipes::delete_recipe),
        );
}

/// Creates the `HttpServer` bound to the configured address.
///
/// The server does not run until the returned future is polled.
pub fn prepare_server(
    params: &ServerParams,
    verifier: Arc<TokenVerifier>,
    store: Arc<dyn ResourceStore>,
) -> HResult<actix_web::dev::Server> {
    let services = ApiServices {
        verifier,
        store,
        backend_secret: Arc::from(params.backend_secret.as_str()),
    };

    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .configure(|cfg| configure_api(cfg, &services))
            .default_service(web::to(routes::not_found))
            .wrap(LogAllRequests)
            .wrap(Cors::permissive())
    })
    .bind((params.hostname.as_str(), params.port))?
    .run();

    Ok(server)
}

/// Start the server and run it until it is stopped.
///
/// # Errors
///
/// Fails when the address cannot be bound or the HTTP clients cannot be built.
pub async fn start_server(params: ServerParams) -> HResult<()> {
    debug!("{params:#?}");

    let events = TracingEvents::shared("hasha_auth");
    let fetcher = JwksFetcher::new(
        &params.cognito.pool,
        params.cognito.jwks_fetch_timeout,
        events.clone(),
    )
    .context("cannot build the JWKS client")?;
    info!("ID tokens verified against the keys at {}", fetcher.jwks_uri());
    let keys = with_optional_cache(
        Arc::new(fetcher),
        params.cognito.jwks_cache_ttl,
        events.clone(),
    );
    let verifier = Arc::new(TokenVerifier::new(
        &params.cognito.pool,
        &params.cognito.client_id,
        keys,
        events,
    ));

    let store: Arc<dyn ResourceStore> = Arc::new(SupabaseStore::new(&params.baas)?);

    let server = prepare_server(&params, verifier, store)?;
    info!("Starting the HTTP server on {}", params.server_url());
    server.await?;
    Ok(())
}
