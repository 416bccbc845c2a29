mod baas_config;
mod clap_config;
mod cognito_config;
mod http_config;
mod logging;

pub use baas_config::BaasConfig;
pub use clap_config::{ClapConfig, HASHA_CONF_ENV};
pub use cognito_config::CognitoConfig;
pub use http_config::{DEFAULT_PORT, HttpConfig};
pub use logging::LoggingConfig;
