use clap::Args;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Args, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// An alternative to setting the `RUST_LOG` environment variable.
    /// Setting this variable will override the `RUST_LOG` environment variable
    #[clap(long, env("HASHA_RUST_LOG"), verbatim_doc_comment)]
    pub rust_log: Option<String>,

    /// Do not log to stdout
    #[clap(long, env("HASHA_LOG_QUIET"), default_value = "false")]
    pub quiet: bool,
}
