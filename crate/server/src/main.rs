use dotenvy::dotenv;
use hasha_server::{
    config::{ClapConfig, ServerParams},
    result::HResult,
    start_server::start_server,
    telemetry::initialize_telemetry,
};
use tracing::{debug, info, span};

/// The main entrypoint of the program.
///
/// The configuration comes from the TOML file named by `HASHA_CONF` when it is set,
/// otherwise from the command line and the environment (including a `.env` file).
#[actix_web::main]
async fn main() -> HResult<()> {
    // Load variable from a .env file
    dotenv().ok();

    let clap_config = ClapConfig::load()?;

    initialize_telemetry(&clap_config.logging)?;

    let span = span!(tracing::Level::INFO, "start");
    let guard = span.enter();

    info!("hasha {}", env!("CARGO_PKG_VERSION"));
    debug!("Command line / file config: {clap_config:#?}");

    let server_params = ServerParams::try_from(clap_config)?;

    // Drop the span guard before the server runs
    drop(guard);

    start_server(server_params).await
}
