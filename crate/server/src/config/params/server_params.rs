use std::{fmt, time::Duration};

use hasha_auth::CognitoPool;
use url::Url;

use crate::{config::ClapConfig, hasha_bail, hasha_ensure, result::HResult};

/// The Cognito pool and app client whose ID tokens are accepted.
#[derive(Debug, Clone)]
pub struct CognitoParams {
    pub pool: CognitoPool,
    pub client_id: String,
    pub jwks_fetch_timeout: Duration,
    /// Zero when the key set is fetched for every verification
    pub jwks_cache_ttl: Duration,
}

#[derive(Clone)]
pub struct BaasParams {
    pub project_url: Url,
    pub anon_key: String,
    pub service_role_key: String,
}

impl fmt::Debug for BaasParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaasParams")
            .field("project_url", &self.project_url.as_str())
            .field("anon_key", &"****")
            .field("service_role_key", &"****")
            .finish()
    }
}

/// This structure is the context used by the server
/// while it is running. There is a singleton instance
/// shared between all threads.
#[derive(Clone)]
pub struct ServerParams {
    pub hostname: String,

    pub port: u16,

    pub cognito: CognitoParams,

    pub baas: BaasParams,

    /// The bearer secret expected on `/users/create-user`
    pub backend_secret: String,
}

impl ServerParams {
    /// The `http://host:port` the server listens on
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }
}

fn required(value: Option<String>, name: &str) -> HResult<String> {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        hasha_bail!("missing configuration value: {name}")
    };
    Ok(value.trim().to_owned())
}

impl TryFrom<ClapConfig> for ServerParams {
    type Error = crate::error::HashaError;

    fn try_from(conf: ClapConfig) -> HResult<Self> {
        let region = required(conf.cognito.region, "REGION")?;
        let pool_id = required(conf.cognito.user_pool_id, "COGNITO_USER_POOL_ID")?;
        let mut pool = CognitoPool::new(&region, &pool_id);
        if let Some(endpoint) = conf.cognito.endpoint {
            // only validated: the pool keeps the text as given, minus any trailing slash
            Url::parse(&endpoint)?;
            pool = pool.with_endpoint(&endpoint);
        }
        hasha_ensure!(
            conf.cognito.jwks_fetch_timeout > 0,
            "HASHA_JWKS_FETCH_TIMEOUT must be at least 1 second"
        );
        let cognito = CognitoParams {
            pool,
            client_id: required(conf.cognito.app_client_id, "COGNITO_APP_CLIENT_ID")?,
            jwks_fetch_timeout: Duration::from_secs(conf.cognito.jwks_fetch_timeout),
            jwks_cache_ttl: Duration::from_secs(conf.cognito.jwks_cache_ttl),
        };

        let baas = BaasParams {
            project_url: Url::parse(&required(conf.baas.proj_url, "PROJ_URL")?)?,
            anon_key: required(conf.baas.anon_key, "ANON_KEY")?,
            service_role_key: required(conf.baas.service_role, "SERVICE_ROLE")?,
        };

        Ok(Self {
            hostname: conf.http.hostname,
            port: conf.http.port,
            cognito,
            baas,
            backend_secret: required(conf.baas.backend_secret, "BACKEND_SECRET")?,
        })
    }
}

impl fmt::Debug for ServerParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("")
            .field("server_url", &self.server_url())
            .field("issuer", &self.cognito.pool.issuer())
            .field("jwks_uri", &self.cognito.pool.jwks_uri())
            .field("client_id", &self.cognito.client_id)
            .field("jwks_fetch_timeout", &self.cognito.jwks_fetch_timeout)
            .field("jwks_cache_ttl", &self.cognito.jwks_cache_ttl)
            .field("baas", &self.baas)
            .field("backend_secret", &"****")
            .finish()
    }
}
