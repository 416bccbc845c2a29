use clap::Args;
use hasha_auth::DEFAULT_FETCH_TIMEOUT;
use serde::{Deserialize, Serialize};

/// The Cognito user pool whose ID tokens are accepted.
#[derive(Debug, Args, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CognitoConfig {
    /// The AWS region hosting the user pool, for instance `eu-west-3`
    #[clap(long, env = "REGION")]
    pub region: Option<String>,

    /// The user pool identifier, for instance `eu-west-3_Xy12AbCdE`
    #[clap(long, env = "COGNITO_USER_POOL_ID")]
    pub user_pool_id: Option<String>,

    /// The app client identifier. ID tokens must carry it as their audience
    #[clap(long, env = "COGNITO_APP_CLIENT_ID")]
    pub app_client_id: Option<String>,

    /// Override the identity provider endpoint.
    ///
    /// Defaults to `https://cognito-idp.<region>.amazonaws.com`.
    /// The token issuer and the JWKS URL are both derived from it.
    #[clap(long, env = "HASHA_COGNITO_ENDPOINT", verbatim_doc_comment)]
    pub endpoint: Option<String>,

    /// Timeout of a JWKS download, in seconds. Must not be 0
    #[clap(
        long,
        env = "HASHA_JWKS_FETCH_TIMEOUT",
        default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs()
    )]
    pub jwks_fetch_timeout: u64,

    /// Keep the downloaded JWKS this many seconds.
    /// 0 disables the cache: the keys are downloaded for every verification
    #[clap(
        long,
        env = "HASHA_JWKS_CACHE_TTL",
        default_value_t = 0,
        verbatim_doc_comment
    )]
    pub jwks_cache_ttl: u64,
}

impl Default for CognitoConfig {
    fn default() -> Self {
        Self {
            region: None,
            user_pool_id: None,
            app_client_id: None,
            endpoint: None,
            jwks_fetch_timeout: DEFAULT_FETCH_TIMEOUT.as_secs(),
            jwks_cache_ttl: 0,
        }
    }
}
