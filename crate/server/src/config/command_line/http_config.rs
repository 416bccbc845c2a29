use std::fmt::Display;

use clap::Args;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 80;

#[derive(Args, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// The server port
    #[clap(long, env = "HASHA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The server hostname
    #[clap(long, env = "HASHA_HOSTNAME", default_value = "0.0.0.0")]
    pub hostname: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            hostname: "0.0.0.0".to_owned(),
        }
    }
}

impl Display for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}:{}", self.hostname, self.port)
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", &self))
    }
}
