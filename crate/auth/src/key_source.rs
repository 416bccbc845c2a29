//! Retrieval of the provider's signing keys.
//!
//! [`JwksFetcher`] downloads the JWKS of a Cognito user pool on every call. It never retries:
//! a transport failure or a timeout is reported as [`AuthError::KeyFetch`] and the caller decides
//! what to do with it.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::AuthError,
    events::{AuthEvent, AuthEvents, SharedEvents},
    jwks::{SigningKey, SigningKeySet},
    result::AuthResult,
};

/// Default timeout of a JWKS download
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Coordinates of a Cognito user pool.
///
/// Both the token issuer and the JWKS URL derive from the provider endpoint,
/// `https://cognito-idp.<region>.amazonaws.com` unless overridden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CognitoPool {
    region: String,
    pool_id: String,
    endpoint: String,
}

impl CognitoPool {
    #[must_use]
    pub fn new(region: &str, pool_id: &str) -> Self {
        Self {
            region: region.to_owned(),
            pool_id: pool_id.to_owned(),
            endpoint: format!("https://cognito-idp.{region}.amazonaws.com"),
        }
    }

    /// Same pool, served by another provider endpoint (a mirror, or a local server in tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        endpoint.trim_end_matches('/').clone_into(&mut self.endpoint);
        self
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    /// The `iss` claim of the tokens issued by this pool.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("{}/{}", self.endpoint, self.pool_id)
    }

    #[must_use]
    pub fn jwks_uri(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer())
    }
}

/// Anything able to hand out the current key set of the provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch_key_set(&self) -> AuthResult<Arc<SigningKeySet>>;
}

/// Fetch the key set from `source` and look for `kid` in it.
///
/// An absent key is not an error: errors are reserved to transport and format failures.
pub async fn find_by_key_id(
    source: &dyn KeySetSource,
    kid: &str,
    events: &dyn AuthEvents,
) -> AuthResult<Option<SigningKey>> {
    let key_set = source.fetch_key_set().await?;
    let key = key_set.find(kid).cloned();
    events.record(if key.is_some() {
        AuthEvent::KeyFound {
            kid: kid.to_owned(),
        }
    } else {
        AuthEvent::KeyMissing {
            kid: kid.to_owned(),
        }
    });
    Ok(key)
}

/// Downloads the JWKS of a user pool over HTTPS, once per call.
#[derive(Clone)]
pub struct JwksFetcher {
    client: Client,
    jwks_uri: String,
    events: SharedEvents,
}

impl JwksFetcher {
    pub fn new(pool: &CognitoPool, timeout: Duration, events: SharedEvents) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeyFetch(format!("cannot build the HTTP client: {e}")))?;
        Ok(Self {
            client,
            jwks_uri: pool.jwks_uri(),
            events,
        })
    }

    #[must_use]
    pub fn jwks_uri(&self) -> &str {
        &self.jwks_uri
    }

    async fn download(&self) -> AuthResult<SigningKeySet> {
        let response = self
            .client
            .get(&self.jwks_uri)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        let document = serde_json::from_slice::<Value>(&body).map_err(|e| {
            AuthError::MalformedKeySet(format!("Invalid JSON in JWKS response: {e}"))
        })?;
        SigningKeySet::from_json(&document, self.events.as_ref())
    }
}

impl std::fmt::Debug for JwksFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksFetcher")
            .field("jwks_uri", &self.jwks_uri)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeySetSource for JwksFetcher {
    async fn fetch_key_set(&self) -> AuthResult<Arc<SigningKeySet>> {
        match self.download().await {
            Ok(key_set) => {
                self.events.record(AuthEvent::KeySetFetched {
                    uri: self.jwks_uri.clone(),
                    keys: key_set.len(),
                });
                Ok(Arc::new(key_set))
            }
            Err(e) => {
                self.events.record(AuthEvent::KeySetFetchFailed {
                    uri: self.jwks_uri.clone(),
                    detail: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
