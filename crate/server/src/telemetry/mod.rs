use tracing::{info, span};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{config::LoggingConfig, result::HResult};

/// Filter applied when neither `RUST_LOG` nor `--rust-log` is set
pub const DEFAULT_LOG_FILTER: &str = "info,hasha_server=info,hasha_auth=info,actix_web=info";

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    match &config.rust_log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    }
}

/// Initialize the telemetry system
///
/// # Arguments
///
/// * `config` - The logging section of the server configuration
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn initialize_telemetry(config: &LoggingConfig) -> HResult<()> {
    if config.quiet {
        return Ok(());
    }
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_ansi(true)
                .compact(),
        )
        .try_init()?;

    // the first event must be emitted inside a span to be displayed
    let span = span!(tracing::Level::INFO, "start");
    let _guard = span.enter();
    info!("Telemetry initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::{DEFAULT_LOG_FILTER, env_filter};
    use crate::config::LoggingConfig;

    #[test]
    fn test_rust_log_override() {
        let config = LoggingConfig {
            rust_log: Some("debug,hyper=warn".to_owned()),
            quiet: false,
        };
        assert_eq!(
            env_filter(&config).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_LOG_FILTER.parse::<tracing_subscriber::EnvFilter>().is_ok());
    }
}
