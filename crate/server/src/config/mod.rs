mod command_line;
mod params;

pub use command_line::{
    BaasConfig, ClapConfig, CognitoConfig, DEFAULT_PORT, HASHA_CONF_ENV, HttpConfig,
    LoggingConfig,
};
pub use params::{BaasParams, CognitoParams, ServerParams};
