use std::path::Path;

use clap::Parser;
use serde::{Deserialize, Serialize};

use super::{BaasConfig, CognitoConfig, HttpConfig, LoggingConfig};
use crate::result::{HResult, HResultHelper};

/// When set, the configuration is read from this TOML file instead of the command line
pub const HASHA_CONF_ENV: &str = "HASHA_CONF";

#[derive(Parser, Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[clap(version, about, long_about = None)]
#[serde(default)]
pub struct ClapConfig {
    #[clap(flatten)]
    pub http: HttpConfig,

    #[clap(flatten)]
    pub cognito: CognitoConfig,

    #[clap(flatten)]
    pub baas: BaasConfig,

    #[clap(flatten)]
    pub logging: LoggingConfig,
}

impl ClapConfig {
    /// Read the configuration from the file named by `HASHA_CONF`,
    /// or from the command line arguments and the environment when it is not set.
    pub fn load() -> HResult<Self> {
        match std::env::var_os(HASHA_CONF_ENV) {
            Some(path) => Self::from_toml_file(Path::new(&path)),
            None => Ok(Self::parse()),
        }
    }

    pub fn from_toml_file(path: &Path) -> HResult<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read the configuration file {}", path.display()))?;
        Ok(toml::from_str(&content)?)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use hasha_auth::DEFAULT_FETCH_TIMEOUT;

    use super::ClapConfig;
    use crate::config::{BaasConfig, CognitoConfig, DEFAULT_PORT, HttpConfig, LoggingConfig};

    #[test]
    fn test_toml() {
        let toml_string = r#"
[http]
port = 8080
hostname = "127.0.0.1"

[cognito]
region = "eu-west-3"
user_pool_id = "eu-west-3_Xy12AbCdE"
app_client_id = "4f8s1dq2hsm0a0pq1clg3qrk7v"
jwks_cache_ttl = 300

[baas]
proj_url = "https://abcdefgh.supabase.co"
anon_key = "[anon key]"
service_role = "[service role]"
backend_secret = "[backend secret]"

[logging]
rust_log = "debug"
"#;
        let config: ClapConfig = toml::from_str(toml_string).unwrap();
        assert_eq!(
            config,
            ClapConfig {
                http: HttpConfig {
                    port: 8080,
                    hostname: "127.0.0.1".to_owned(),
                },
                cognito: CognitoConfig {
                    region: Some("eu-west-3".to_owned()),
                    user_pool_id: Some("eu-west-3_Xy12AbCdE".to_owned()),
                    app_client_id: Some("4f8s1dq2hsm0a0pq1clg3qrk7v".to_owned()),
                    endpoint: None,
                    jwks_fetch_timeout: 10,
                    jwks_cache_ttl: 300,
                },
                baas: BaasConfig {
                    proj_url: Some("https://abcdefgh.supabase.co".to_owned()),
                    anon_key: Some("[anon key]".to_owned()),
                    service_role: Some("[service role]".to_owned()),
                    backend_secret: Some("[backend secret]".to_owned()),
                },
                logging: LoggingConfig {
                    rust_log: Some("debug".to_owned()),
                    quiet: false,
                },
            }
        );
        assert_eq!(
            toml::from_str::<ClapConfig>(&toml::to_string(&config).unwrap()).unwrap(),
            config
        );
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ClapConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClapConfig::default());
        assert_eq!(config.http.port, DEFAULT_PORT);
        assert_eq!(config.http.hostname, "0.0.0.0");
        assert_eq!(
            config.cognito.jwks_fetch_timeout,
            DEFAULT_FETCH_TIMEOUT.as_secs()
        );
        assert_eq!(config.cognito.jwks_cache_ttl, 0);

        let parsed = ClapConfig::try_parse_from(["hasha"]).unwrap();
        assert_eq!(
            parsed.cognito.jwks_fetch_timeout,
            DEFAULT_FETCH_TIMEOUT.as_secs()
        );
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9000\n\n[cognito]\nregion = \"us-east-1\"").unwrap();
        let config = ClapConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.cognito.region.as_deref(), Some("us-east-1"));

        let missing = file.path().with_extension("missing");
        assert!(ClapConfig::from_toml_file(&missing).is_err());

        let mut invalid = tempfile::NamedTempFile::new().unwrap();
        writeln!(invalid, "[http]\nport = \"not a port\"").unwrap();
        assert!(ClapConfig::from_toml_file(invalid.path()).is_err());
    }

    #[test]
    fn test_command_line() {
        let config = ClapConfig::try_parse_from([
            "hasha",
            "--port",
            "8443",
            "--region",
            "eu-west-3",
            "--user-pool-id",
            "eu-west-3_Xy12AbCdE",
            "--app-client-id",
            "client",
            "--jwks-cache-ttl",
            "60",
            "--proj-url",
            "https://abcdefgh.supabase.co",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(config.http.port, 8443);
        assert_eq!(config.cognito.region.as_deref(), Some("eu-west-3"));
        assert_eq!(config.cognito.user_pool_id.as_deref(), Some("eu-west-3_Xy12AbCdE"));
        assert_eq!(config.cognito.app_client_id.as_deref(), Some("client"));
        assert_eq!(config.cognito.jwks_cache_ttl, 60);
        assert_eq!(
            config.baas.proj_url.as_deref(),
            Some("https://abcdefgh.supabase.co")
        );
        assert!(config.logging.quiet);

        assert!(ClapConfig::try_parse_from(["hasha", "--port", "not-a-port"]).is_err());
    }
}
